//! Request types

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::image_pipeline::color::matrix::{self, Mat3};
use crate::image_pipeline::common::error::{Result, RoiError};
use crate::image_pipeline::debayer::{CfaPattern, CfaValue};
use crate::image_pipeline::metadata::CaptureMetadata;

/// ROI in upright preview coordinates, each edge in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizedRoi {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Default for NormalizedRoi {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            right: 1.0,
            bottom: 1.0,
        }
    }
}

impl NormalizedRoi {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// Which of the RAW and JPEG paths a request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingMode {
    Raw,
    Jpeg,
    #[default]
    Both,
}

impl ProcessingMode {
    /// Case-insensitive; anything unrecognized runs both paths.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "raw" => ProcessingMode::Raw,
            "jpeg" => ProcessingMode::Jpeg,
            _ => ProcessingMode::Both,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProcessingMode::Raw => "RAW",
            ProcessingMode::Jpeg => "JPEG",
            ProcessingMode::Both => "BOTH",
        }
    }

    pub fn includes_raw(self) -> bool {
        matches!(self, ProcessingMode::Raw | ProcessingMode::Both)
    }

    pub fn includes_jpeg(self) -> bool {
        matches!(self, ProcessingMode::Jpeg | ProcessingMode::Both)
    }
}

impl Serialize for ProcessingMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProcessingMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(value
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .map(ProcessingMode::parse)
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DebugConfig {
    /// Record a snapshot after every stage and write the debug bundle.
    pub dump_intermediate_images: bool,
    /// Skip the color-correction stage.
    #[serde(rename = "bypassCCM")]
    pub bypass_ccm: bool,
}

/// One ROI measurement request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoiRequest {
    pub mode: ProcessingMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_roi: Option<NormalizedRoi>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CaptureMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_buffer_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jpeg_path: Option<PathBuf>,
    pub skip_white_balance: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_cfa_pattern: Option<CfaValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_cam_to_xyz: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f64>,
    pub debug_config: DebugConfig,
    /// Overrides the orientation read from the JPEG's EXIF data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation_degrees: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_space: Option<String>,
}

impl RoiRequest {
    pub fn normalized_roi(&self) -> Result<NormalizedRoi> {
        self.normalized_roi
            .ok_or(RoiError::MissingField("normalizedRoi"))
    }

    pub fn metadata(&self) -> Result<&CaptureMetadata> {
        self.metadata.as_ref().ok_or(RoiError::MissingField("metadata"))
    }

    pub fn raw_buffer_path(&self) -> Result<&Path> {
        self.raw_buffer_path
            .as_deref()
            .ok_or(RoiError::MissingField("rawBufferPath"))
    }

    pub fn jpeg_path(&self) -> Result<&Path> {
        self.jpeg_path
            .as_deref()
            .ok_or(RoiError::MissingField("jpegPath"))
    }

    /// Explicit CFA override. Unrecognized values are ignored.
    pub fn forced_cfa(&self) -> Option<CfaPattern> {
        let value = self.force_cfa_pattern.as_ref()?;
        let pattern = value.resolve();
        if pattern.is_none() {
            warn!(?value, "Ignoring unsupported forceCfaPattern");
        }
        pattern
    }

    pub fn custom_cam_to_xyz(&self) -> Option<Mat3> {
        let values = self.custom_cam_to_xyz.as_deref()?;
        let custom = matrix::from_slice(values);
        if custom.is_none() {
            warn!(len = values.len(), "Ignoring customCamToXyz with fewer than nine values");
        }
        custom
    }
}
