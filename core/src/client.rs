//! Caller-facing facade: one transport, one config, callback delivery.
//!
//! # Design
//! `PetsClient` wires the catalog client and the upload pipeline to a
//! transport and to the fixed `ClientConfig`. Results reach the UI either
//! through a `PetsDelegate` (called exactly once per operation, on the
//! calling thread) or through a single-shot closure for uploads run on
//! their own thread. The UI layer decides whether to offer a retry; the
//! client never retries on its own.

use std::sync::Arc;
use std::thread::JoinHandle;

use image::DynamicImage;
use tracing::{debug, warn};

use crate::catalog::PetCatalogClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::HttpTransport;
use crate::types::{PetRecord, UploadResult};
use crate::upload::ImageUploadPipeline;

/// Notifications delivered to the UI layer.
pub trait PetsDelegate {
    fn on_catalog_loaded(&self, pets: Vec<PetRecord>);
    fn on_catalog_load_failed(&self, error: ApiError);
    fn on_upload_complete(&self, result: UploadResult);
}

/// Device-side persistence of a saved image (e.g. the photo library).
/// Its outcome never changes the upload result.
pub trait LocalImageStore: Send + Sync {
    fn save(&self, image: &DynamicImage) -> Result<(), String>;
}

pub struct PetsClient<T> {
    config: ClientConfig,
    catalog: PetCatalogClient,
    pipeline: ImageUploadPipeline,
    transport: T,
    store: Option<Box<dyn LocalImageStore>>,
}

impl<T: HttpTransport> PetsClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self {
            catalog: PetCatalogClient::new(&config.pets_url),
            pipeline: ImageUploadPipeline::new(&config.upload_target_url),
            config,
            transport,
            store: None,
        }
    }

    pub fn with_local_store(mut self, store: impl LocalImageStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn catalog(&self) -> &PetCatalogClient {
        &self.catalog
    }

    pub fn pipeline(&self) -> &ImageUploadPipeline {
        &self.pipeline
    }

    pub fn fetch_all(&self) -> Result<Vec<PetRecord>, ApiError> {
        self.catalog.fetch_all(&self.transport)
    }

    pub fn fetch_image(&self, pet: &PetRecord) -> Result<Vec<u8>, ApiError> {
        self.catalog.fetch_image(&self.transport, pet)
    }

    /// Upload with the configured app id.
    pub fn upload(&self, image: &DynamicImage, original_url: &str) -> UploadResult {
        if let Some(store) = &self.store {
            match store.save(image) {
                Ok(()) => debug!("image saved locally"),
                Err(e) => warn!(error = %e, "local image save failed"),
            }
        }
        self.pipeline
            .upload(&self.transport, image, self.config.app_id(), original_url)
    }

    pub fn load_catalog(&self, delegate: &dyn PetsDelegate) {
        match self.fetch_all() {
            Ok(pets) => delegate.on_catalog_loaded(pets),
            Err(e) => delegate.on_catalog_load_failed(e),
        }
    }

    pub fn save_image(&self, image: &DynamicImage, original_url: &str, delegate: &dyn PetsDelegate) {
        delegate.on_upload_complete(self.upload(image, original_url));
    }
}

impl<T: HttpTransport + 'static> PetsClient<T> {
    /// Run one upload on its own thread. `on_complete` runs exactly once,
    /// on that thread, with the result of this call only.
    pub fn spawn_upload<F>(
        self: &Arc<Self>,
        image: DynamicImage,
        original_url: String,
        on_complete: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(UploadResult) + Send + 'static,
    {
        let client = Arc::clone(self);
        std::thread::spawn(move || {
            let result = client.upload(&image, &original_url);
            on_complete(result);
        })
    }
}
