//! Debayering module for reconstructing RGB from a Bayer ROI

pub mod cfa;
pub mod cpu_debayer;
pub mod types;


pub use cfa::{BayerChannel, CfaPattern, CfaValue};
pub use cpu_debayer::CpuDebayer;
pub use types::{ChannelAverages, DemosaicOutput, SensorLevels};
