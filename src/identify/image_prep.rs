//! Data-URI handling for images sent to the vision model.
//!
//! Images are passed through untouched; only the MIME type is sniffed when a
//! data URI is built from raw file bytes.

use base64::{engine::general_purpose::STANDARD, Engine};
use image::ImageFormat;
use tracing::info;

use crate::error::{Result, ScoutError};

/// Split a `data:<mime>;base64,<payload>` URI into `(mime, payload)`.
///
/// Expects a well-formed URI; the slices are taken between the first `:`
/// and first `;`, and after the first `,`.
pub fn split_data_uri(data_uri: &str) -> (&str, &str) {
    let mime_start = data_uri.find(':').map_or(0, |i| i + 1);
    let mime_end = data_uri.find(';').unwrap_or(data_uri.len()).max(mime_start);
    let payload_start = data_uri.find(',').map_or(0, |i| i + 1);
    (&data_uri[mime_start..mime_end], &data_uri[payload_start..])
}

/// Build a data URI from raw image bytes, detecting the format from content.
pub fn data_uri_from_bytes(bytes: &[u8]) -> Result<String> {
    let format = image::guess_format(bytes)
        .map_err(|e| ScoutError::Image(format!("Unrecognized image data: {}", e)))?;
    let mime = mime_for_format(format)
        .ok_or_else(|| ScoutError::Image(format!("Unsupported image format: {:?}", format)))?;

    info!("Encoding {} image ({} bytes)", mime, bytes.len());
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

/// MIME types the vision model accepts.
fn mime_for_format(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Png => Some("image/png"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::Bmp => Some("image/bmp"),
        ImageFormat::Tiff => Some("image/tiff"),
        _ => None,
    }
}
