//! Offline replay of a debug bundle
//!
//! Rebuilds the pipeline context from `metadata.json` and `input.raw` and runs
//! the stages again, so a bundle captured on device can be checked against the
//! numbers it reported.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use serde::Serialize;
use tracing::{info, instrument, warn};
use zip::ZipArchive;

use crate::image_pipeline::color::matrix::{self, IDENTITY};
use crate::image_pipeline::color::tone::DEFAULT_GAMMA;
use crate::image_pipeline::common::error::{Result, RoiError};
use crate::image_pipeline::debayer::{CfaPattern, ChannelAverages, SensorLevels};
use crate::image_pipeline::debug::types::DebugMetadata;
use crate::image_pipeline::raw::decode_le_u16;
use crate::image_pipeline::request::DebugConfig;
use crate::image_pipeline::stages::{CameraMetadata, PipelineContext, PipelineExecutor};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub width: u32,
    pub height: u32,
    pub cfa_pattern: &'static str,
    pub color_matrix_source: String,
    pub camera_rgb: ChannelAverages,
    pub balanced_rgb: ChannelAverages,
    pub xyz: [f64; 3],
    pub srgb: Option<[f64; 3]>,
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, file_name: &str) -> Result<Vec<u8>> {
    let suffix = format!("/{}", file_name);
    let entry_name = archive
        .file_names()
        .find(|name| *name == file_name || name.ends_with(&suffix))
        .map(str::to_string)
        .ok_or_else(|| RoiError::InvalidBundle(format!("missing {}", file_name)))?;
    let mut entry = archive.by_name(&entry_name)?;
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Rebuilds the recorded calibration.
pub fn camera_metadata_from_bundle(metadata: &DebugMetadata) -> CameraMetadata {
    let cfa = metadata
        .cfa_pattern
        .as_ref()
        .and_then(|value| value.resolve())
        .unwrap_or_else(|| {
            warn!("Bundle has no usable cfaPattern, assuming RGGB");
            CfaPattern::default()
        });
    let cam_to_xyz = matrix::from_rows(&metadata.ccm);
    let wb = metadata.wb_gains;

    CameraMetadata {
        cfa,
        levels: SensorLevels::new(metadata.black_level, metadata.white_level),
        cam_to_xyz,
        xyz_to_cam: matrix::invert(&cam_to_xyz).unwrap_or(IDENTITY),
        color_matrix_source: metadata.color_matrix_source.clone(),
        white_balance_gains: [wb.r, wb.g, wb.b],
        skip_white_balance: false,
        gamma: metadata.gamma.unwrap_or(DEFAULT_GAMMA),
    }
}

/// Reruns the pipeline over the bundle's ROI buffer.
#[instrument(skip_all, fields(bundle = %path.display()))]
pub fn replay_bundle(path: &Path) -> Result<ReplayReport> {
    let file = File::open(path)
        .map_err(|e| RoiError::InputReadError(format!("{}: {}", path.display(), e)))?;
    let mut archive = ZipArchive::new(file)?;

    let metadata: DebugMetadata = serde_json::from_slice(&read_entry(&mut archive, "metadata.json")?)?;
    let raw = decode_le_u16(&read_entry(&mut archive, "input.raw")?);

    let expected = metadata.width as usize * metadata.height as usize;
    if raw.len() != expected {
        return Err(RoiError::InvalidBundle(format!(
            "input.raw holds {} samples, expected {}x{}",
            raw.len(),
            metadata.width,
            metadata.height
        )));
    }

    let camera = camera_metadata_from_bundle(&metadata);
    let cfa_pattern = camera.cfa.name();
    let context = PipelineContext::new(raw, metadata.width, metadata.height, camera);
    let debug = DebugConfig {
        dump_intermediate_images: false,
        bypass_ccm: metadata.bypass_ccm,
    };
    let run = PipelineExecutor::standard(debug).execute(context);
    let srgb = run.context.srgb_sample;
    let result = run.into_result();

    info!(xyz = ?result.xyz, "Replayed debug bundle");
    Ok(ReplayReport {
        width: metadata.width,
        height: metadata.height,
        cfa_pattern,
        color_matrix_source: result.color_matrix_source,
        camera_rgb: result.camera_rgb,
        balanced_rgb: result.balanced_rgb,
        xyz: result.xyz,
        srgb,
    })
}
