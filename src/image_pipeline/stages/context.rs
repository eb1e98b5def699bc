//! State threaded through the pipeline stages

use image::RgbImage;

use crate::image_pipeline::color::Mat3;
use crate::image_pipeline::debayer::{CfaPattern, ChannelAverages, SensorLevels};

/// Calibration resolved for one request
#[derive(Debug, Clone, PartialEq)]
pub struct CameraMetadata {
    /// CFA layout of the ROI itself, after the crop phase shift
    pub cfa: CfaPattern,
    pub levels: SensorLevels,
    pub cam_to_xyz: Mat3,
    pub xyz_to_cam: Mat3,
    pub color_matrix_source: String,
    pub white_balance_gains: [f64; 3],
    pub skip_white_balance: bool,
    pub gamma: f64,
}

#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub raw: Vec<u16>,
    pub width: u32,
    pub height: u32,
    pub metadata: CameraMetadata,
    pub camera_sample: Option<ChannelAverages>,
    pub balanced_sample: Option<ChannelAverages>,
    pub xyz_sample: Option<[f64; 3]>,
    pub linear_rgb: Option<[f64; 3]>,
    pub srgb_sample: Option<[f64; 3]>,
}

impl PipelineContext {
    pub fn new(raw: Vec<u16>, width: u32, height: u32, metadata: CameraMetadata) -> Self {
        Self {
            raw,
            width,
            height,
            metadata,
            camera_sample: None,
            balanced_sample: None,
            xyz_sample: None,
            linear_rgb: None,
            srgb_sample: None,
        }
    }
}

/// Colorimetry extracted from a finished pipeline run
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub camera_rgb: ChannelAverages,
    pub balanced_rgb: ChannelAverages,
    pub xyz: [f64; 3],
    pub white_balance_gains: [f64; 3],
    pub cam_to_xyz: Mat3,
    pub xyz_to_cam: Mat3,
    pub color_matrix_source: String,
    pub preview: RgbImage,
    pub snapshots: Vec<(String, RgbImage)>,
}

impl PipelineResult {
    pub fn from_context(
        context: &PipelineContext,
        preview: RgbImage,
        snapshots: Vec<(String, RgbImage)>,
    ) -> Self {
        let camera_rgb = context.camera_sample.unwrap_or_default();
        let metadata = &context.metadata;
        Self {
            camera_rgb,
            balanced_rgb: context.balanced_sample.unwrap_or(camera_rgb),
            xyz: context.xyz_sample.unwrap_or_default().map(|v| v.max(0.0)),
            white_balance_gains: metadata.white_balance_gains,
            cam_to_xyz: metadata.cam_to_xyz,
            xyz_to_cam: metadata.xyz_to_cam,
            color_matrix_source: metadata.color_matrix_source.clone(),
            preview,
            snapshots,
        }
    }
}
