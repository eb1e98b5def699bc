use tracing::debug;

use crate::image_pipeline::common::error::{Result, RoiError};
use crate::image_pipeline::debayer::CfaPattern;
use crate::image_pipeline::geometry::rect::PixelRect;
use crate::image_pipeline::metadata::CaptureMetadata;
use crate::image_pipeline::request::NormalizedRoi;

/// Rotates a normalized point by a multiple of 90 degrees. Other angles leave it unchanged.
pub fn rotate_point(x: f64, y: f64, degrees: i32) -> (f64, f64) {
    match degrees.rem_euclid(360) {
        90 => (1.0 - y, x),
        180 => (1.0 - x, 1.0 - y),
        270 => (y, 1.0 - x),
        _ => (x, y),
    }
}

/// Bounding box of the rotated corners.
pub fn rotate_rect(roi: &NormalizedRoi, degrees: i32) -> NormalizedRoi {
    let corners = [
        (roi.left, roi.top),
        (roi.right, roi.top),
        (roi.left, roi.bottom),
        (roi.right, roi.bottom),
    ]
    .map(|(x, y)| rotate_point(x, y, degrees));

    let fold = |select: fn(&(f64, f64)) -> f64, pick: fn(f64, f64) -> f64| {
        corners
            .iter()
            .map(select)
            .reduce(pick)
            .unwrap_or_default()
    };
    NormalizedRoi::new(
        fold(|p| p.0, f64::min),
        fold(|p| p.1, f64::min),
        fold(|p| p.0, f64::max),
        fold(|p| p.1, f64::max),
    )
}

/// Scales a normalized rectangle to a `width` x `height` grid.
///
/// Edges are clamped to [0, 1] and truncated; the result is always at least
/// one pixel wide and tall and lies inside the grid.
pub fn map_rect(roi: &NormalizedRoi, width: u32, height: u32) -> PixelRect {
    let (width, height) = (width.max(1), height.max(1));
    let scale = |value: f64, extent: u32| (value.clamp(0.0, 1.0) * f64::from(extent)) as u32;

    let left = scale(roi.left, width).min(width - 1);
    let right = scale(roi.right, width).clamp(left + 1, width);
    let top = scale(roi.top, height).min(height - 1);
    let bottom = scale(roi.bottom, height).clamp(top + 1, height);
    PixelRect::new(left, top, right, bottom)
}

/// RAW-space rectangle for `roi`, rotated by the capture orientation.
///
/// Fails when the capture has no usable RAW extent or the ROI collapses to a
/// single row or column.
pub fn resolve_raw_rect(
    roi: &NormalizedRoi,
    metadata: &CaptureMetadata,
    orientation_degrees: i32,
) -> Result<PixelRect> {
    let (raw_width, raw_height) = metadata.raw_extent();
    if raw_width <= 0 || raw_height <= 0 {
        return Err(RoiError::InvalidGeometry(format!(
            "RAW dimensions {}x{} are not positive",
            raw_width, raw_height
        )));
    }
    let to_extent = |value: i64| {
        u32::try_from(value)
            .map_err(|_| RoiError::InvalidGeometry(format!("RAW dimension {} is out of range", value)))
    };
    let (width, height) = (to_extent(raw_width)?, to_extent(raw_height)?);

    let rect = map_rect(&rotate_rect(roi, orientation_degrees), width, height);
    if rect.width() <= 1 || rect.height() <= 1 {
        return Err(RoiError::InvalidGeometry(format!(
            "RAW ROI {}x{} is too small to demosaic",
            rect.width(),
            rect.height()
        )));
    }

    debug!(?rect, orientation_degrees, "Resolved RAW rect");
    Ok(rect)
}

/// CFA layout seen by the crop, unless a pattern is forced.
pub fn effective_cfa(base: CfaPattern, rect: &PixelRect, forced: Option<CfaPattern>) -> CfaPattern {
    forced.unwrap_or_else(|| base.shifted(rect.left, rect.top))
}
