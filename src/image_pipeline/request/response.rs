//! Response types

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::image_pipeline::geometry::PixelRect;

/// Result of one ROI request.
///
/// RAW fields are empty when the RAW path did not run; JPEG fields are `null`
/// when the JPEG path did not run or could not decode the image.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiResponse {
    pub xyz: Vec<f64>,
    /// White-balanced camera RGB
    pub linear_rgb: Vec<f64>,
    /// Camera RGB before white balance
    pub raw_rgb: Vec<f64>,
    pub white_balance_gains: Vec<f64>,
    pub jpeg_srgb: Option<Vec<f64>>,
    pub jpeg_linear_rgb: Option<Vec<f64>>,
    pub jpeg_xyz: Option<Vec<f64>>,
    pub cam_to_xyz_matrix: Vec<f64>,
    pub xyz_to_cam_matrix: Vec<f64>,
    pub color_matrix_source: String,
    #[serde(serialize_with = "rect_or_empty")]
    pub raw_rect: Option<PixelRect>,
    pub debug: DebugPayload,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_rect: Option<PixelRect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_package_path: Option<String>,
    /// Base64 PNG of the last stage output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_image: Option<String>,
    /// Base64 PNG per stage, in execution order
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "ordered_map")]
    pub stages: Vec<(String, String)>,
}

impl DebugPayload {
    pub fn stage(&self, name: &str) -> Option<&str> {
        self.stages
            .iter()
            .find(|(stage, _)| stage == name)
            .map(|(_, data)| data.as_str())
    }
}

fn rect_or_empty<S: Serializer>(rect: &Option<PixelRect>, serializer: S) -> Result<S::Ok, S::Error> {
    match rect {
        Some(rect) => rect.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

fn ordered_map<S: Serializer>(entries: &[(String, String)], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (key, value) in entries {
        map.serialize_entry(key, value)?;
    }
    map.end()
}
