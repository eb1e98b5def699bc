//! RAW buffer module
//!
//! Reads ROI samples out of strided RAW16 sensor dumps and imports RAW
//! containers into that layout.

mod mmap_reader;
mod rawloader_reader;
mod reader;
pub mod types;


pub use mmap_reader::MmapRawReader;
pub use rawloader_reader::RawLoaderImporter;
pub use reader::{CaptureImporter, RawBufferReader, extract_roi};
pub use types::{ImportedCapture, StrideLayout, decode_le_u16, encode_le_u16};
