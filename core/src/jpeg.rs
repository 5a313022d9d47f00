//! JPEG encoding of the image being uploaded.

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

use crate::error::ApiError;

/// Quality on the encoder's 1-100 scale (0.75 of full quality).
pub const JPEG_QUALITY: u8 = 75;

/// Lossy, one-way. Alpha is dropped since JPEG has no alpha channel.
pub fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>, ApiError> {
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)?;
    Ok(out)
}

/// Decode whatever the host captured or fetched (JPEG or PNG).
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, ApiError> {
    Ok(image::load_from_memory(bytes)?)
}
