//! Dual-illuminant calibration interpolation by correlated color temperature
//!
//! Each calibration entry pairs an XYZ-to-camera color matrix with the CCT of
//! the illuminant it was measured under. The capture's as-shot neutral is
//! projected to a chromaticity, converted to a CCT estimate, and used to blend
//! the bracketing pair in inverse-CCT space. Because the blended matrix changes
//! the projected chromaticity, the estimate is refined for a bounded number of
//! iterations.

use tracing::debug;

use crate::image_pipeline::color::matrix::{self, IDENTITY, Mat3};
use crate::image_pipeline::metadata::CaptureMetadata;

pub const MAX_ITERATIONS: usize = 10;
pub const CONVERGENCE_EPSILON: f64 = 1e-6;

/// Chromaticity used when the neutral cannot be projected.
pub const FALLBACK_XY: (f64, f64) = (0.3127, 0.3290);

#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationEntry {
    pub index: usize,
    pub illuminant_name: &'static str,
    pub cct: f64,
    /// XYZ to camera
    pub color_matrix: Mat3,
    pub camera_calibration: Mat3,
}

/// Bracketing entries and the weight of `high` in the blend.
#[derive(Debug, Clone, Copy)]
pub struct CalibrationPair<'a> {
    pub low: &'a CalibrationEntry,
    pub high: &'a CalibrationEntry,
    pub weight: f64,
}

#[derive(Debug, Clone)]
pub struct Interpolation {
    pub cam_to_xyz: Mat3,
    pub cct: Option<f64>,
    pub weight: f64,
    pub iterations: usize,
}

/// Calibration entries with a color matrix and a reference illuminant of known CCT,
/// sorted by ascending CCT.
pub fn gather_calibration_entries(metadata: &CaptureMetadata) -> Vec<CalibrationEntry> {
    let mut entries: Vec<CalibrationEntry> = (1..=3)
        .filter_map(|index| {
            let color_matrix = metadata.color_matrix(index)?;
            let info = metadata.calibration_illuminant(index)?;
            Some(CalibrationEntry {
                index,
                illuminant_name: info.name,
                cct: info.cct?,
                color_matrix,
                camera_calibration: metadata.camera_calibration(index).unwrap_or(IDENTITY),
            })
        })
        .collect();
    entries.sort_by(|a, b| a.cct.total_cmp(&b.cct));
    entries
}

/// McCamy's cubic approximation. `None` near the singular line or for non-positive results.
pub fn xy_to_cct(x: f64, y: f64) -> Option<f64> {
    let denom = 0.1858 - y;
    if denom.abs() < 1e-9 {
        return None;
    }
    let n = (x - 0.3320) / denom;
    let cct = 449.0 * n.powi(3) + 3525.0 * n.powi(2) + 6823.3 * n + 5520.33;
    (cct > 0.0 && cct.is_finite()).then_some(cct)
}

/// Weight of the high-CCT entry, linear in reciprocal temperature and clamped to [0, 1].
pub fn interpolation_weight(cct: f64, low_cct: f64, high_cct: f64) -> f64 {
    if cct <= 0.0 {
        return 0.0;
    }
    let denom = (1.0 / high_cct) - (1.0 / low_cct);
    if denom.abs() < 1e-9 || !denom.is_finite() {
        return 0.0;
    }
    (((1.0 / cct) - (1.0 / low_cct)) / denom).clamp(0.0, 1.0)
}

/// Picks the pair bracketing `cct`. Estimates outside the calibrated range pin to
/// the nearest end with weight 0 or 1.
///
/// `entries` must be non-empty and sorted by CCT.
pub fn select_calibration_pair(entries: &[CalibrationEntry], cct: Option<f64>) -> CalibrationPair<'_> {
    let first = &entries[0];
    let last = &entries[entries.len() - 1];
    let Some(cct) = cct.filter(|_| entries.len() > 1) else {
        return CalibrationPair {
            low: first,
            high: first,
            weight: 0.0,
        };
    };
    if cct <= first.cct {
        return CalibrationPair {
            low: first,
            high: &entries[1],
            weight: 0.0,
        };
    }
    if cct >= last.cct {
        return CalibrationPair {
            low: &entries[entries.len() - 2],
            high: last,
            weight: 1.0,
        };
    }
    entries
        .windows(2)
        .find(|pair| pair[0].cct <= cct && cct <= pair[1].cct)
        .map(|pair| CalibrationPair {
            low: &pair[0],
            high: &pair[1],
            weight: interpolation_weight(cct, pair[0].cct, pair[1].cct),
        })
        .unwrap_or(CalibrationPair {
            low: &entries[entries.len() - 2],
            high: last,
            weight: 1.0,
        })
}

/// Inverse of `analog_balance · calibration · color_matrix`.
pub fn compose_camera_to_xyz(analog_balance: &Mat3, calibration: &Mat3, color_matrix: &Mat3) -> Option<Mat3> {
    let xyz_to_camera = matrix::multiply(analog_balance, &matrix::multiply(calibration, color_matrix));
    matrix::invert(&xyz_to_camera)
}

/// Chromaticity of the camera neutral under `color_matrix`, if it is physically plausible.
pub fn camera_neutral_to_xy(neutral: [f64; 3], color_matrix: &Mat3) -> Option<(f64, f64)> {
    let inverse = matrix::invert(color_matrix)?;
    let xyz = matrix::multiply_vector(&inverse, neutral);
    xyz_to_xy(xyz).filter(|(x, y)| *x > 0.0 && *y > 0.0)
}

fn xyz_to_xy(xyz: [f64; 3]) -> Option<(f64, f64)> {
    let sum: f64 = xyz.iter().sum();
    if sum.abs() < 1e-9 {
        return None;
    }
    let (x, y) = (xyz[0] / sum, xyz[1] / sum);
    (x.is_finite() && y.is_finite()).then_some((x, y))
}

fn blend_pair(pair: &CalibrationPair<'_>, analog_balance: &Mat3) -> Option<Mat3> {
    let color_matrix = matrix::lerp(&pair.low.color_matrix, &pair.high.color_matrix, pair.weight);
    let calibration = matrix::lerp(
        &pair.low.camera_calibration,
        &pair.high.camera_calibration,
        pair.weight,
    );
    compose_camera_to_xyz(analog_balance, &calibration, &color_matrix)
}

/// Iteratively blends the calibration entries to the capture's white point.
///
/// Returns `None` when a blended matrix is singular or the neutral projects to a
/// degenerate chromaticity. Without a neutral the fallback chromaticity drives a
/// single blend.
pub fn interpolate_color_matrix(
    entries: &[CalibrationEntry],
    analog_balance: &Mat3,
    neutral: Option<[f64; 3]>,
) -> Option<Interpolation> {
    if entries.is_empty() {
        return None;
    }

    let seed = neutral
        .and_then(|neutral| {
            entries
                .iter()
                .find_map(|entry| camera_neutral_to_xy(neutral, &entry.color_matrix))
        })
        .unwrap_or(FALLBACK_XY);

    let Some(neutral) = neutral else {
        let cct = xy_to_cct(seed.0, seed.1);
        let pair = select_calibration_pair(entries, cct);
        let cam_to_xyz = blend_pair(&pair, analog_balance)?;
        return Some(Interpolation {
            cam_to_xyz,
            cct,
            weight: pair.weight,
            iterations: 0,
        });
    };

    let mut xy = seed;
    let mut cct = xy_to_cct(xy.0, xy.1);
    let mut pair = select_calibration_pair(entries, cct);
    let mut iterations = 0;

    for _ in 0..MAX_ITERATIONS {
        cct = xy_to_cct(xy.0, xy.1);
        pair = select_calibration_pair(entries, cct);
        iterations += 1;

        let cam_to_xyz = blend_pair(&pair, analog_balance)?;
        let refined = xyz_to_xy(matrix::multiply_vector(&cam_to_xyz, neutral))?;
        let converged = (refined.0 - xy.0).abs() < CONVERGENCE_EPSILON
            && (refined.1 - xy.1).abs() < CONVERGENCE_EPSILON;
        xy = refined;
        if converged {
            break;
        }
    }

    debug!(
        ?cct,
        weight = pair.weight,
        low = pair.low.illuminant_name,
        high = pair.high.illuminant_name,
        iterations,
        "Interpolated color matrix"
    );

    let cam_to_xyz = blend_pair(&pair, analog_balance)?;
    Some(Interpolation {
        cam_to_xyz,
        cct,
        weight: pair.weight,
        iterations,
    })
}
