//! Two-step image upload: resolve a one-time target, then POST multipart.
//!
//! # Design
//! `ImageUploadPipeline` keeps only the upload-target endpoint. Every call
//! builds its own boundary and body, so concurrent uploads share nothing
//! mutable. The target is resolved before any JPEG encoding or framing
//! happens, and a fresh target is fetched on every `upload()`; a retry is
//! just another `upload()` call.

use image::DynamicImage;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::jpeg::encode_jpeg;
use crate::multipart;
use crate::types::{UploadRequest, UploadResult, UploadTarget};

#[derive(Debug, Clone)]
pub struct ImageUploadPipeline {
    upload_target_url: String,
}

impl ImageUploadPipeline {
    pub fn new(upload_target_url: &str) -> Self {
        Self {
            upload_target_url: upload_target_url.to_string(),
        }
    }

    pub fn build_resolve_target(&self) -> HttpRequest {
        HttpRequest::get(self.upload_target_url.as_str())
    }

    /// Extract the string field `url` from the target response.
    pub fn parse_resolve_target(&self, response: HttpResponse) -> Result<UploadTarget, ApiError> {
        if !response.is_success() {
            return Err(ApiError::TargetResolution(format!(
                "HTTP {}",
                response.status
            )));
        }
        let json: serde_json::Value = serde_json::from_slice(&response.body)
            .map_err(|e| ApiError::TargetResolution(e.to_string()))?;
        let raw = json
            .get("url")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| {
                ApiError::TargetResolution("response has no string `url` field".to_string())
            })?;

        // Validated only; the server's string is posted to unchanged.
        let parsed = Url::parse(raw).map_err(|_| ApiError::InvalidTargetUrl(raw.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidTargetUrl(raw.to_string()));
        }
        Ok(UploadTarget {
            url: raw.to_string(),
        })
    }

    pub fn resolve_upload_target<T: HttpTransport>(
        &self,
        transport: &T,
    ) -> Result<UploadTarget, ApiError> {
        debug!(url = %self.upload_target_url, "resolving upload target");
        let response = transport
            .execute(self.build_resolve_target())
            .map_err(|e| ApiError::TargetResolution(e.to_string()))?;
        self.parse_resolve_target(response)
    }

    /// Build the multipart POST. Each call draws a new boundary.
    pub fn build_post_multipart(&self, target: &UploadTarget, request: &UploadRequest) -> HttpRequest {
        let boundary = multipart::new_boundary();
        let body = multipart::encode(
            &boundary,
            &request.app_id,
            &request.original_url,
            &request.image_bytes,
        );
        debug!(target = %target.url, bytes = body.len(), "built multipart body");
        HttpRequest {
            method: HttpMethod::Post,
            url: target.url.clone(),
            headers: vec![(
                "content-type".to_string(),
                multipart::content_type(&boundary),
            )],
            body: Some(body),
        }
    }

    /// Only an exact 200 counts as accepted.
    pub fn parse_post_multipart(&self, response: HttpResponse) -> Result<(), ApiError> {
        if response.status == 200 {
            return Ok(());
        }
        Err(ApiError::UploadRejected {
            status: response.status,
            body: response.body_text(),
        })
    }

    pub fn post_multipart<T: HttpTransport>(
        &self,
        transport: &T,
        target: &UploadTarget,
        request: &UploadRequest,
    ) -> Result<(), ApiError> {
        let response = transport.execute(self.build_post_multipart(target, request))?;
        self.parse_post_multipart(response)
    }

    /// Resolve a fresh target, encode `image` as JPEG and POST it. Never
    /// retries; every failure ends up in `UploadResult::Failure`.
    pub fn upload<T: HttpTransport>(
        &self,
        transport: &T,
        image: &DynamicImage,
        app_id: &str,
        original_url: &str,
    ) -> UploadResult {
        let result = self.try_upload(transport, image, app_id, original_url);
        match &result {
            Ok(()) => info!(original = original_url, "image uploaded"),
            Err(e) => warn!(original = original_url, error = %e, "image upload failed"),
        }
        result.into()
    }

    fn try_upload<T: HttpTransport>(
        &self,
        transport: &T,
        image: &DynamicImage,
        app_id: &str,
        original_url: &str,
    ) -> Result<(), ApiError> {
        let target = self.resolve_upload_target(transport)?;
        let request = UploadRequest {
            app_id: app_id.to_string(),
            original_url: original_url.to_string(),
            image_bytes: encode_jpeg(image)?,
        };
        self.post_multipart(transport, &target, &request)
    }
}
