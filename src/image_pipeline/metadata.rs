//! Capture metadata module
//!
//! Read-only calibration and layout metadata supplied with each capture.

pub mod illuminant;
pub mod types;


pub use illuminant::IlluminantInfo;
pub use types::CaptureMetadata;
