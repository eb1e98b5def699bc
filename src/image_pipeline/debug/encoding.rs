use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose;
use image::{ImageFormat, RgbImage};

use crate::image_pipeline::common::error::{Result, RoiError};

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| RoiError::EncodeError(e.to_string()))?;
    Ok(bytes)
}

/// PNG bytes in standard base64 without line wrapping.
pub fn encode_png_base64(image: &RgbImage) -> Result<String> {
    Ok(general_purpose::STANDARD.encode(encode_png(image)?))
}

/// Lowercase name with every run of other characters collapsed to `_`.
pub fn sanitize_stage_name(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            sanitized.push(c);
        } else if !sanitized.ends_with('_') {
            sanitized.push('_');
        }
    }
    let trimmed = sanitized.trim_matches('_');
    if trimmed.is_empty() {
        "stage".to_string()
    } else {
        trimmed.to_string()
    }
}
