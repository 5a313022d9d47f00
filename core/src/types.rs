//! Domain types for the pets API.
//!
//! # Design
//! `PetRecord` uses Rust field names and renames on the wire (`url`,
//! `created`). The mock server defines its own copy of the wire schema;
//! integration tests catch drift between the two crates.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// A single pet as listed by the catalog endpoint. Every field is required;
/// a record missing one fails the whole decode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PetRecord {
    pub title: String,
    pub description: String,
    #[serde(rename = "url")]
    pub image_url: String,
    #[serde(rename = "created")]
    pub created_at: String,
}

/// One-time destination for the next upload. Never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub url: String,
}

/// Everything that goes into one multipart body.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub app_id: String,
    pub original_url: String,
    /// JPEG-encoded image data.
    pub image_bytes: Vec<u8>,
}

/// Outcome of a single `upload()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadResult {
    Success,
    Failure(String),
}

impl UploadResult {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadResult::Success)
    }
}

impl From<Result<(), ApiError>> for UploadResult {
    fn from(result: Result<(), ApiError>) -> Self {
        match result {
            Ok(()) => UploadResult::Success,
            Err(e) => UploadResult::Failure(e.to_string()),
        }
    }
}
