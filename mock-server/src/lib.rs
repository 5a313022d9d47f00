use std::{collections::HashSet, io::Cursor, sync::Arc};

use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use image::{codecs::jpeg::JpegEncoder, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};
use uuid::Uuid;

pub use axum::http::StatusCode;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pet {
    pub title: String,
    pub description: String,
    pub url: String,
    pub created: String,
}

/// What the server saw for one accepted multipart POST.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReceivedUpload {
    pub token: Uuid,
    pub part_names: Vec<String>,
    pub app_id: String,
    pub original: String,
    pub file_name: Option<String>,
    pub file_content_type: Option<String>,
    pub file_len: usize,
}

#[derive(Clone, Debug)]
pub struct MockOptions {
    pub pets: Vec<Pet>,
    /// Status returned for a well-formed upload.
    pub upload_status: StatusCode,
    /// Leave `url` out of the upload-target response.
    pub omit_target_url: bool,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            pets: seed_pets(),
            upload_status: StatusCode::OK,
            omit_target_url: false,
        }
    }
}

/// Image URLs starting with `/` are served by this server and get the
/// request's host prepended when listed.
pub fn seed_pets() -> Vec<Pet> {
    [
        ("Rex", "Friendly dog", "/images/rex.jpg", "2024-01-01"),
        ("Whiskers", "Sleepy cat who loves boxes", "/images/whiskers.jpg", "2024-01-02"),
        ("Bubbles", "Goldfish with opinions", "/images/bubbles.jpg", "2024-01-03"),
    ]
    .into_iter()
    .map(|(title, description, url, created)| Pet {
        title: title.to_string(),
        description: description.to_string(),
        url: url.to_string(),
        created: created.to_string(),
    })
    .collect()
}

struct AppState {
    options: MockOptions,
    issued: RwLock<HashSet<Uuid>>,
    received: RwLock<Vec<ReceivedUpload>>,
}

type Shared = Arc<AppState>;

pub fn app() -> Router {
    app_with(MockOptions::default())
}

pub fn app_with(options: MockOptions) -> Router {
    let state: Shared = Arc::new(AppState {
        options,
        issued: RwLock::new(HashSet::new()),
        received: RwLock::new(Vec::new()),
    });
    Router::new()
        .route("/pets", get(list_pets))
        .route("/upload", get(issue_target))
        .route("/upload/{token}", post(receive_upload))
        .route("/uploads", get(list_uploads))
        .route("/images/{name}", get(pet_image))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, MockOptions::default()).await
}

pub async fn run_with(listener: TcpListener, options: MockOptions) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(options)).await
}

fn host(headers: &HeaderMap) -> &str {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost")
}

async fn list_pets(State(state): State<Shared>, headers: HeaderMap) -> Json<Vec<Pet>> {
    let host = host(&headers);
    let pets = state
        .options
        .pets
        .iter()
        .cloned()
        .map(|mut pet| {
            if pet.url.starts_with('/') {
                pet.url = format!("http://{host}{}", pet.url);
            }
            pet
        })
        .collect();
    Json(pets)
}

async fn issue_target(State(state): State<Shared>, headers: HeaderMap) -> Json<serde_json::Value> {
    let token = Uuid::new_v4();
    state.issued.write().await.insert(token);
    info!(%token, "issued upload target");
    if state.options.omit_target_url {
        return Json(serde_json::json!({ "token": token }));
    }
    Json(serde_json::json!({
        "url": format!("http://{}/upload/{token}", host(&headers)),
    }))
}

async fn receive_upload(
    State(state): State<Shared>,
    Path(token): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<StatusCode, (StatusCode, String)> {
    if !state.issued.write().await.remove(&token) {
        warn!(%token, "upload to unknown or used target");
        return Err((StatusCode::NOT_FOUND, "unknown upload target".to_string()));
    }

    let bad_request = |msg: String| (StatusCode::BAD_REQUEST, msg);
    let mut upload = ReceivedUpload {
        token,
        part_names: Vec::new(),
        app_id: String::new(),
        original: String::new(),
        file_name: None,
        file_content_type: None,
        file_len: 0,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        upload.part_names.push(name.clone());
        match name.as_str() {
            "appid" => upload.app_id = field.text().await.map_err(|e| bad_request(e.to_string()))?,
            "original" => {
                upload.original = field.text().await.map_err(|e| bad_request(e.to_string()))?
            }
            "file" => {
                upload.file_name = field.file_name().map(str::to_string);
                upload.file_content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| bad_request(e.to_string()))?;
                if !bytes.starts_with(&[0xff, 0xd8]) {
                    return Err(bad_request("file is not a JPEG".to_string()));
                }
                upload.file_len = bytes.len();
            }
            _ => {}
        }
    }

    if upload.part_names != ["appid", "original", "file"] {
        return Err(bad_request(format!(
            "unexpected parts: {:?}",
            upload.part_names
        )));
    }
    if upload.file_content_type.as_deref() != Some("image/jpeg") {
        return Err(bad_request("file part must be image/jpeg".to_string()));
    }

    info!(%token, app_id = %upload.app_id, bytes = upload.file_len, "received upload");
    state.received.write().await.push(upload);
    Ok(state.options.upload_status)
}

async fn list_uploads(State(state): State<Shared>) -> Json<Vec<ReceivedUpload>> {
    Json(state.received.read().await.clone())
}

async fn pet_image(Path(name): Path<String>) -> Response {
    if !name.ends_with(".jpg") {
        return StatusCode::NOT_FOUND.into_response();
    }
    match placeholder_jpeg(&name) {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Small solid-color JPEG whose color depends on the name.
fn placeholder_jpeg(name: &str) -> Result<Vec<u8>, image::ImageError> {
    let seed = name.bytes().fold(0u8, |acc, b| acc.wrapping_mul(31).wrapping_add(b));
    let img = RgbImage::from_pixel(16, 16, Rgb([seed, seed.wrapping_add(85), seed.wrapping_add(170)]));
    let mut out = Cursor::new(Vec::new());
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut out, 80))?;
    Ok(out.into_inner())
}
