//! multipart/form-data framing for the upload POST.
//!
//! Part order is fixed: `appid`, `original`, `file`. Lines are CRLF
//! terminated and the body ends with the closing delimiter plus CRLF.

use uuid::Uuid;

pub const JPEG_FILENAME: &str = "image.jpg";

/// A fresh boundary per call.
pub fn new_boundary() -> String {
    format!("Boundary-{}", Uuid::new_v4())
}

pub fn content_type(boundary: &str) -> String {
    format!("multipart/form-data; boundary={boundary}")
}

/// Frame the three form parts.
pub fn encode(boundary: &str, app_id: &str, original_url: &str, jpeg: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(jpeg.len() + 512);

    text_part(&mut body, boundary, "appid", app_id);
    text_part(&mut body, boundary, "original", original_url);

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{JPEG_FILENAME}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
    body.extend_from_slice(jpeg);
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

fn text_part(body: &mut Vec<u8>, boundary: &str, name: &str, value: &str) {
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
    );
    body.extend_from_slice(value.as_bytes());
    body.extend_from_slice(b"\r\n");
}
