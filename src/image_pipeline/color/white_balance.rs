//! White-balance gain resolution

use tracing::debug;

use crate::image_pipeline::metadata::CaptureMetadata;

pub const UNITY_GAINS: [f64; 3] = [1.0, 1.0, 1.0];

/// Smallest neutral component inverted into a gain.
const MIN_NEUTRAL: f64 = 1e-6;

type GainTier = fn(&CaptureMetadata) -> Option<[f64; 3]>;

/// Checked in order; the first tier that yields gains wins.
const GAIN_TIERS: [(&str, GainTier); 3] = [
    ("asShotNeutral", as_shot_neutral_tier),
    ("colorCorrectionGains", color_correction_tier),
    ("wbGains", wb_tag_tier),
];

fn as_shot_neutral_tier(metadata: &CaptureMetadata) -> Option<[f64; 3]> {
    gains_from_as_shot_neutral(metadata.as_shot_neutral.as_deref()?)
}

fn color_correction_tier(metadata: &CaptureMetadata) -> Option<[f64; 3]> {
    gains_from_color_correction(metadata.color_correction_gains.as_deref()?)
}

fn wb_tag_tier(metadata: &CaptureMetadata) -> Option<[f64; 3]> {
    gains_from_wb_tag(metadata.wb_gains.as_deref()?)
}

/// Resolves `[r, g, b]` gains for the capture, or unity gains when `skip` is set.
pub fn resolve_white_balance(metadata: &CaptureMetadata, skip: bool) -> [f64; 3] {
    if skip {
        debug!("White balance skipped, using unity gains");
        return UNITY_GAINS;
    }
    for (source, tier) in GAIN_TIERS {
        if let Some(gains) = tier(metadata) {
            debug!(source, ?gains, "Resolved white balance gains");
            return gains;
        }
    }
    debug!("No white balance metadata, using unity gains");
    UNITY_GAINS
}

/// Reciprocal of the camera neutral.
pub fn gains_from_as_shot_neutral(neutral: &[f64]) -> Option<[f64; 3]> {
    let neutral: [f64; 3] = neutral.get(..3)?.try_into().ok()?;
    Some(neutral.map(|value| 1.0 / value.max(MIN_NEUTRAL)))
}

/// `[r, gEven, gOdd, b]` with the two greens averaged. A missing odd green reuses the even one.
pub fn gains_from_color_correction(gains: &[f64]) -> Option<[f64; 3]> {
    let r = *gains.first()?;
    let g_even = *gains.get(1)?;
    let g_odd = gains.get(2).copied().unwrap_or(g_even);
    let b = *gains.get(3)?;
    Some([r, (g_even + g_odd) / 2.0, b])
}

/// Generic gain tag: four values behave like the color-correction gains, three are used as-is.
pub fn gains_from_wb_tag(values: &[f64]) -> Option<[f64; 3]> {
    match values.len() {
        0..=2 => None,
        3 => Some([values[0], values[1], values[2]]),
        _ => gains_from_color_correction(values),
    }
}
