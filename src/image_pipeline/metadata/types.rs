//! Per-capture calibration metadata

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::image_pipeline::color::matrix::{self, Mat3};
use crate::image_pipeline::debayer::{CfaPattern, CfaValue};
use crate::image_pipeline::metadata::illuminant::{self, IlluminantInfo};

/// Calibration and layout metadata recorded alongside a RAW capture.
///
/// Field names follow the camelCase keys emitted by the capture side. Matrices
/// are row-major; entries with fewer than nine values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cfa_pattern: Option<CfaValue>,
    /// Black level per site, ordered R, Gr, Gb, B
    pub black_level_pattern: Vec<i64>,
    pub white_level: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_stride: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel_stride: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_array_width: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_array_height: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_width: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_height: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jpeg_width: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jpeg_height: Option<i64>,

    /// `[r, gEven, gOdd, b]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_correction_gains: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_correction_transform: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_shot_neutral: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wb_gains: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analog_balance: Option<Vec<f64>>,

    /// XYZ to camera matrices, falling back to `colorMatrix{i}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_color_transform1: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_color_transform2: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_color_transform3: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_matrix1: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_matrix2: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_matrix3: Option<Vec<f64>>,

    /// Falls back to `forwardMatrix{i}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_forward_matrix1: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_forward_matrix2: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_forward_matrix3: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_matrix1: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_matrix2: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_matrix3: Option<Vec<f64>>,

    /// Falls back to `cameraCalibration{i}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_calibration_transform1: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_calibration_transform2: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_calibration_transform3: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_calibration1: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_calibration2: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_calibration3: Option<Vec<f64>>,

    /// EXIF LightSource codes, tried as `calibrationIlluminant{i}`,
    /// `referenceIlluminant{i}` then `sensorReferenceIlluminant{i}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calibration_illuminant1: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calibration_illuminant2: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calibration_illuminant3: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_illuminant1: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_illuminant2: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_illuminant3: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_reference_illuminant1: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_reference_illuminant2: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_reference_illuminant3: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_space: Option<String>,
}

fn matrix_of(values: &Option<Vec<f64>>) -> Option<Mat3> {
    values.as_deref().and_then(matrix::from_slice)
}

/// First key holding at least nine values.
fn first_matrix(candidates: &[&Option<Vec<f64>>]) -> Option<Mat3> {
    candidates.iter().find_map(|values| matrix_of(values))
}

impl CaptureMetadata {
    /// Sensor CFA layout; unknown or missing codes fall back to RGGB.
    pub fn cfa(&self) -> CfaPattern {
        match &self.cfa_pattern {
            None => CfaPattern::default(),
            Some(value) => value.resolve().unwrap_or_else(|| {
                warn!(?value, "Unsupported CFA pattern, assuming RGGB");
                CfaPattern::default()
            }),
        }
    }

    /// Black levels for R, Gr, Gb, B, padding missing entries with the last one.
    pub fn black_levels(&self) -> [i64; 4] {
        let last = self.black_level_pattern.last().copied().unwrap_or(0);
        std::array::from_fn(|index| {
            self.black_level_pattern
                .get(index)
                .copied()
                .unwrap_or(last)
        })
    }

    pub fn white_level(&self) -> i64 {
        self.white_level.max(1)
    }

    /// RAW buffer extent, preferring the stream size over the active array.
    pub fn raw_extent(&self) -> (i64, i64) {
        let width = self.raw_width.or(self.active_array_width).unwrap_or(0);
        let height = self.raw_height.or(self.active_array_height).unwrap_or(0);
        (width, height)
    }

    pub fn as_shot_neutral(&self) -> Option<[f64; 3]> {
        let values = self.as_shot_neutral.as_deref()?;
        values.get(..3)?.try_into().ok()
    }

    pub fn color_correction_transform(&self) -> Option<Mat3> {
        matrix_of(&self.color_correction_transform)
    }

    /// XYZ to camera matrix for calibration illuminant `index` (1..=3).
    pub fn color_matrix(&self, index: usize) -> Option<Mat3> {
        match index {
            1 => first_matrix(&[&self.sensor_color_transform1, &self.color_matrix1]),
            2 => first_matrix(&[&self.sensor_color_transform2, &self.color_matrix2]),
            3 => first_matrix(&[&self.sensor_color_transform3, &self.color_matrix3]),
            _ => None,
        }
    }

    pub fn forward_matrix(&self, index: usize) -> Option<Mat3> {
        match index {
            1 => first_matrix(&[&self.sensor_forward_matrix1, &self.forward_matrix1]),
            2 => first_matrix(&[&self.sensor_forward_matrix2, &self.forward_matrix2]),
            3 => first_matrix(&[&self.sensor_forward_matrix3, &self.forward_matrix3]),
            _ => None,
        }
    }

    pub fn camera_calibration(&self, index: usize) -> Option<Mat3> {
        match index {
            1 => first_matrix(&[&self.sensor_calibration_transform1, &self.camera_calibration1]),
            2 => first_matrix(&[&self.sensor_calibration_transform2, &self.camera_calibration2]),
            3 => first_matrix(&[&self.sensor_calibration_transform3, &self.camera_calibration3]),
            _ => None,
        }
    }

    /// Reference illuminant for calibration `index` (1..=3): the first recorded
    /// code whose illuminant has a known CCT.
    pub fn calibration_illuminant(&self, index: usize) -> Option<&'static IlluminantInfo> {
        let codes = match index {
            1 => [
                self.calibration_illuminant1,
                self.reference_illuminant1,
                self.sensor_reference_illuminant1,
            ],
            2 => [
                self.calibration_illuminant2,
                self.reference_illuminant2,
                self.sensor_reference_illuminant2,
            ],
            3 => [
                self.calibration_illuminant3,
                self.reference_illuminant3,
                self.sensor_reference_illuminant3,
            ],
            _ => return None,
        };
        codes
            .into_iter()
            .flatten()
            .filter_map(illuminant::lookup)
            .find(|info| info.cct.is_some())
    }

    /// Diagonal analog balance; identity when absent.
    pub fn analog_balance(&self) -> Mat3 {
        let values = self.analog_balance.as_deref().unwrap_or(&[]);
        matrix::diagonal(std::array::from_fn(|index| {
            values.get(index).copied().unwrap_or(1.0)
        }))
    }
}
