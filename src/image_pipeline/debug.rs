//! Debug artifact module
//!
//! Encodes stage snapshots for the response, writes zipped debug bundles
//! (`metadata.json`, `input.raw`, one PNG per stage) and replays them offline.

pub mod encoding;
pub mod replay;
pub mod types;
pub mod writer;


pub use encoding::{encode_png, encode_png_base64, sanitize_stage_name};
pub use replay::{ReplayReport, replay_bundle};
pub use types::{DebugBundle, DebugMetadata, WhiteBalanceRecord};
pub use writer::{DebugWriter, ZipBundleWriter};
