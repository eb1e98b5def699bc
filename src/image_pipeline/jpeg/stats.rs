use std::path::Path;

use image::RgbImage;
use tracing::debug;

use crate::image_pipeline::color::tone;
use crate::image_pipeline::common::error::{Result, RoiError};
use crate::image_pipeline::geometry::{map_rect, rotate_rect};
use crate::image_pipeline::request::NormalizedRoi;

/// Mean color of the JPEG ROI
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JpegStats {
    /// Encoded sRGB in [0, 1]
    pub srgb: [f64; 3],
    pub linear: [f64; 3],
    pub xyz: [f64; 3],
}

impl JpegStats {
    pub fn from_srgb(srgb: [f64; 3]) -> Self {
        let linear = srgb.map(tone::srgb_to_linear);
        Self {
            srgb,
            linear,
            xyz: tone::linear_srgb_to_xyz(linear),
        }
    }
}

pub fn compute_jpeg_stats(path: &Path, roi: &NormalizedRoi, orientation_degrees: i32) -> Result<JpegStats> {
    // The image crate has no region decoder, so the whole frame is decoded and then cropped.
    let image = image::open(path)
        .map_err(|e| RoiError::DecodeError(format!("{}: {}", path.display(), e)))?
        .to_rgb8();
    stats_from_image(&image, roi, orientation_degrees)
}

/// Averages the ROI of a decoded image after rotating it into the stored pixel orientation.
pub fn stats_from_image(image: &RgbImage, roi: &NormalizedRoi, orientation_degrees: i32) -> Result<JpegStats> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(RoiError::DecodeError("decoded JPEG is empty".to_string()));
    }

    let rect = map_rect(&rotate_rect(roi, orientation_degrees), width, height);
    let mut sum = [0u64; 3];
    for y in rect.top..rect.bottom {
        for x in rect.left..rect.right {
            let pixel = image.get_pixel(x, y);
            for (total, channel) in sum.iter_mut().zip(pixel.0) {
                *total += u64::from(channel);
            }
        }
    }

    let count = rect.area() as f64;
    let srgb = sum.map(|total| total as f64 / count / 255.0);
    debug!(?rect, ?srgb, "JPEG ROI average");
    Ok(JpegStats::from_srgb(srgb))
}
