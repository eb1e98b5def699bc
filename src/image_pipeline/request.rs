//! Processing request and response types
//!
//! Requests arrive as camelCase JSON from the capture side; responses are
//! serialized back in the same shape.

pub mod config;
pub mod response;
pub mod types;

#[cfg(test)]
mod tests;

pub use config::{ProcessorConfig, ProcessorConfigBuilder};
pub use response::{DebugPayload, RoiResponse};
pub use types::{DebugConfig, NormalizedRoi, ProcessingMode, RoiRequest};
