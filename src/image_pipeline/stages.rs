//! Pipeline stages module
//!
//! The ROI pipeline runs Demosaic, WhiteBalance, ColorCorrection and Gamma in a
//! fixed order. Each stage consumes the context and the previous stage's image
//! and hands both on.

pub mod context;
pub mod executor;
pub mod stage;


pub use context::{CameraMetadata, PipelineContext, PipelineResult};
pub use executor::{PipelineExecutor, PipelineRun};
pub use stage::{
    ColorCorrectionStage, DemosaicStage, GammaStage, PipelineStage, StageKind, WhiteBalanceStage,
};
