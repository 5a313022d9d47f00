//! Error types for the pets client.
//!
//! # Design
//! A single `ApiError` covers both public operations. Each variant maps to
//! one failure class the caller reacts to differently: the catalog screen
//! offers a retry on `Transport`/`Decode`, the upload flow shows the
//! error's description. `kind()` gives a payload-free tag for the FFI layer.

use crate::http::TransportError;

/// Errors returned by the catalog client and the upload pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No usable response: connection failure, or a non-2xx status on a GET
    /// whose body we would otherwise decode.
    #[error("transport failure: {0}")]
    Transport(String),

    /// A body arrived but does not match the expected schema.
    #[error("decode failure: {0}")]
    Decode(String),

    /// The upload-target step failed (transport, status, or missing `url`).
    #[error("could not resolve upload target: {0}")]
    TargetResolution(String),

    /// The server-issued target is not a valid absolute URL.
    #[error("invalid URL: {0}")]
    InvalidTargetUrl(String),

    /// The multipart POST got a response other than 200.
    #[error("upload rejected with HTTP {status}: {body}")]
    UploadRejected { status: u16, body: String },

    /// The input image could not be decoded or re-encoded as JPEG.
    #[error("image encoding failed: {0}")]
    ImageEncoding(String),
}

/// Payload-free discriminant of `ApiError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    Decode,
    TargetResolution,
    InvalidTargetUrl,
    UploadRejected,
    ImageEncoding,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::Decode(_) => ErrorKind::Decode,
            ApiError::TargetResolution(_) => ErrorKind::TargetResolution,
            ApiError::InvalidTargetUrl(_) => ErrorKind::InvalidTargetUrl,
            ApiError::UploadRejected { .. } => ErrorKind::UploadRejected,
            ApiError::ImageEncoding(_) => ErrorKind::ImageEncoding,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ApiError::UploadRejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        ApiError::Transport(err.0)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<image::ImageError> for ApiError {
    fn from(err: image::ImageError) -> Self {
        ApiError::ImageEncoding(err.to_string())
    }
}
