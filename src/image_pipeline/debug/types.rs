//! Debug bundle types

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::image_pipeline::color::matrix;
use crate::image_pipeline::debayer::CfaValue;
use crate::image_pipeline::metadata::CaptureMetadata;
use crate::image_pipeline::stages::CameraMetadata;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhiteBalanceRecord {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub g_even: f64,
    pub g_odd: f64,
}

/// Contents of `metadata.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugMetadata {
    pub width: u32,
    pub height: u32,
    pub white_level: i64,
    pub black_level: [i64; 4],
    /// Gains the pipeline applied
    pub wb_gains: WhiteBalanceRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_shot_neutral: Option<Vec<f64>>,
    /// Camera RGB to XYZ, row-major rows
    pub ccm: [[f64; 3]; 3],
    pub color_space: String,
    /// CFA of the ROI buffer in `input.raw`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cfa_pattern: Option<CfaValue>,
    #[serde(default)]
    pub color_matrix_source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f64>,
    /// Color correction was skipped for this run
    #[serde(default)]
    pub bypass_ccm: bool,
}

impl DebugMetadata {
    pub fn new(
        width: u32,
        height: u32,
        camera: &CameraMetadata,
        capture: &CaptureMetadata,
        color_space: String,
    ) -> Self {
        let [r, g, b] = camera.white_balance_gains;
        let correction = capture.color_correction_gains.as_deref().unwrap_or(&[]);
        let g_even = correction.get(1).copied().unwrap_or(g);
        let g_odd = correction.get(2).copied().unwrap_or(g_even);

        Self {
            width,
            height,
            white_level: camera.levels.white,
            black_level: camera.levels.black,
            wb_gains: WhiteBalanceRecord {
                r,
                g,
                b,
                g_even,
                g_odd,
            },
            as_shot_neutral: capture.as_shot_neutral.clone(),
            ccm: matrix::to_rows(&camera.cam_to_xyz),
            color_space,
            cfa_pattern: Some(camera.cfa.into()),
            color_matrix_source: camera.color_matrix_source.clone(),
            gamma: Some(camera.gamma),
            bypass_ccm: false,
        }
    }
}

/// Everything a [`DebugWriter`](crate::image_pipeline::debug::DebugWriter) persists for one request
pub struct DebugBundle<'a> {
    pub metadata: DebugMetadata,
    pub raw: &'a [u16],
    pub stages: &'a [(String, RgbImage)],
}
