//! RAW buffer types

use std::fs;
use std::path::{Path, PathBuf};

use crate::image_pipeline::common::error::{Result, RoiError};
use crate::image_pipeline::metadata::CaptureMetadata;

/// Byte strides of a RAW16 buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrideLayout {
    pub row_stride: usize,
    pub pixel_stride: usize,
}

impl StrideLayout {
    /// Tightly packed 16-bit samples.
    pub fn packed(width: usize) -> Self {
        Self {
            row_stride: width * 2,
            pixel_stride: 2,
        }
    }

    pub fn from_metadata(metadata: &CaptureMetadata) -> Result<Self> {
        let row_stride = metadata.row_stride.unwrap_or(-1);
        let pixel_stride = metadata.pixel_stride.unwrap_or(-1);
        match (usize::try_from(row_stride), usize::try_from(pixel_stride)) {
            (Ok(row), Ok(pixel)) if row > 0 && pixel > 0 => Ok(Self {
                row_stride: row,
                pixel_stride: pixel,
            }),
            _ => Err(RoiError::MissingStrideMetadata {
                row_stride,
                pixel_stride,
            }),
        }
    }
}

/// A RAW container decoded into a packed RAW16 buffer plus its metadata
#[derive(Debug, Clone)]
pub struct ImportedCapture {
    pub width: usize,
    pub height: usize,
    pub samples: Vec<u16>,
    pub metadata: CaptureMetadata,
}

impl ImportedCapture {
    /// Writes `<stem>.raw` and `<stem>.json` into `dir`, returning both paths.
    pub fn write_to(&self, dir: &Path, stem: &str) -> Result<(PathBuf, PathBuf)> {
        fs::create_dir_all(dir)
            .map_err(|e| RoiError::OutputWriteError(format!("{}: {}", dir.display(), e)))?;

        let raw_path = dir.join(format!("{}.raw", stem));
        fs::write(&raw_path, encode_le_u16(&self.samples))
            .map_err(|e| RoiError::OutputWriteError(format!("{}: {}", raw_path.display(), e)))?;

        let metadata_path = dir.join(format!("{}.json", stem));
        fs::write(&metadata_path, serde_json::to_vec_pretty(&self.metadata)?)
            .map_err(|e| RoiError::OutputWriteError(format!("{}: {}", metadata_path.display(), e)))?;

        Ok((raw_path, metadata_path))
    }
}

pub fn encode_le_u16(samples: &[u16]) -> Vec<u8> {
    samples.iter().flat_map(|sample| sample.to_le_bytes()).collect()
}

/// Trailing odd bytes are dropped.
pub fn decode_le_u16(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}
