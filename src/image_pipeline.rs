//! Image processing pipeline module
//!
//! This module turns a RAW Bayer region of interest into calibrated color
//! values, with separate modules for geometry, RAW reading, demosaicing,
//! colorimetry, stage execution, JPEG reference stats, debug artifacts and
//! request orchestration.

pub mod color;
pub mod common;
pub mod conversions;
pub mod debayer;
pub mod debug;
pub mod geometry;
pub mod jpeg;
pub mod metadata;
pub mod raw;
pub mod request;
pub mod stages;

pub use common::{Result, RoiError};

pub use metadata::CaptureMetadata;

pub use request::{
    DebugConfig, NormalizedRoi, ProcessingMode, ProcessorConfig, ProcessorConfigBuilder,
    RoiRequest, RoiResponse,
};

pub use raw::{CaptureImporter, MmapRawReader, RawBufferReader, RawLoaderImporter};

pub use debug::{DebugWriter, ReplayReport, ZipBundleWriter, replay_bundle};

pub use conversions::RoiProcessor;
