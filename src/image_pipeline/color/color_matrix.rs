//! Camera RGB to XYZ matrix resolution

use tracing::{debug, warn};

use crate::image_pipeline::color::cct;
use crate::image_pipeline::color::matrix::{self, IDENTITY, Mat3};
use crate::image_pipeline::metadata::CaptureMetadata;

/// Generic camera-to-XYZ matrix used when a capture carries no calibration.
pub const DEFAULT_CAM_TO_XYZ: Mat3 = [
    0.45454840, 0.10688300, 0.07675672, //
    0.07543547, 0.41522814, 0.08160625, //
    0.06060502, 0.15949116, 0.73257329,
];

/// Precomputed inverse of [`DEFAULT_CAM_TO_XYZ`].
pub const DEFAULT_XYZ_TO_CAM: Mat3 = [
    2.31151874, -0.52441404, -0.18377565, //
    -0.39944759, 2.60659054, -0.24851274, //
    -0.10426435, -0.52410596, 1.43435930,
];

/// Transforms within this distance of identity carry no calibration.
const IDENTITY_TOLERANCE: f64 = 1e-3;

pub struct MatrixInputs<'a> {
    pub metadata: &'a CaptureMetadata,
    pub custom: Option<Mat3>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatrixCandidate {
    pub matrix: Mat3,
    pub known_inverse: Option<Mat3>,
    pub source: String,
}

impl MatrixCandidate {
    fn new(matrix: Mat3, source: impl Into<String>) -> Self {
        Self {
            matrix,
            known_inverse: None,
            source: source.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorMatrixResolution {
    pub cam_to_xyz: Mat3,
    pub xyz_to_cam: Mat3,
    pub source: String,
}

type MatrixTier = fn(&MatrixInputs<'_>) -> Option<MatrixCandidate>;

const MATRIX_TIERS: [MatrixTier; 5] = [
    custom_tier,
    calibration_tier,
    forward_matrix_tier,
    color_correction_tier,
    default_tier,
];

fn custom_tier(inputs: &MatrixInputs<'_>) -> Option<MatrixCandidate> {
    inputs
        .custom
        .map(|matrix| MatrixCandidate::new(matrix, "customCamToXyz"))
}

fn calibration_tier(inputs: &MatrixInputs<'_>) -> Option<MatrixCandidate> {
    let entries = cct::gather_calibration_entries(inputs.metadata);
    let analog_balance = inputs.metadata.analog_balance();

    if entries.len() >= 2 {
        match cct::interpolate_color_matrix(
            &entries,
            &analog_balance,
            inputs.metadata.as_shot_neutral(),
        ) {
            Some(interpolation) => {
                return Some(MatrixCandidate::new(
                    interpolation.cam_to_xyz,
                    "colorMatrix_interpolated",
                ));
            }
            None => warn!("Color matrix interpolation failed, using first calibration entry"),
        }
    }

    let entry = entries.first()?;
    let composed =
        cct::compose_camera_to_xyz(&analog_balance, &entry.camera_calibration, &entry.color_matrix);
    if composed.is_none() {
        warn!(index = entry.index, "Calibration color matrix is singular");
    }
    composed.map(|matrix| MatrixCandidate::new(matrix, format!("colorMatrix{}", entry.index)))
}

fn forward_matrix_tier(inputs: &MatrixInputs<'_>) -> Option<MatrixCandidate> {
    match (
        inputs.metadata.forward_matrix(1),
        inputs.metadata.forward_matrix(2),
    ) {
        (Some(first), Some(second)) => Some(MatrixCandidate::new(
            matrix::lerp(&first, &second, 0.5),
            "forwardMatrix_blend",
        )),
        (Some(first), None) => Some(MatrixCandidate::new(first, "forwardMatrix1")),
        (None, Some(second)) => Some(MatrixCandidate::new(second, "forwardMatrix2")),
        (None, None) => None,
    }
}

fn color_correction_tier(inputs: &MatrixInputs<'_>) -> Option<MatrixCandidate> {
    inputs
        .metadata
        .color_correction_transform()
        .filter(|transform| !matrix::is_identity(transform, IDENTITY_TOLERANCE))
        .map(|transform| MatrixCandidate::new(transform, "colorCorrectionTransform"))
}

fn default_tier(_: &MatrixInputs<'_>) -> Option<MatrixCandidate> {
    Some(MatrixCandidate {
        matrix: DEFAULT_CAM_TO_XYZ,
        known_inverse: Some(DEFAULT_XYZ_TO_CAM),
        source: "default_static".to_string(),
    })
}

/// Walks the matrix tiers and pairs the winner with its inverse.
pub fn resolve_color_matrix(inputs: &MatrixInputs<'_>) -> ColorMatrixResolution {
    let candidate = MATRIX_TIERS
        .iter()
        .find_map(|tier| tier(inputs))
        .unwrap_or_else(|| MatrixCandidate {
            matrix: DEFAULT_CAM_TO_XYZ,
            known_inverse: Some(DEFAULT_XYZ_TO_CAM),
            source: "default_static".to_string(),
        });

    let xyz_to_cam = matrix::invert(&candidate.matrix)
        .or(candidate.known_inverse)
        .unwrap_or_else(|| {
            warn!(source = %candidate.source, "Camera matrix is singular, using identity inverse");
            IDENTITY
        });

    debug!(source = %candidate.source, "Resolved color matrix");
    ColorMatrixResolution {
        cam_to_xyz: candidate.matrix,
        xyz_to_cam,
        source: candidate.source,
    }
}
