//! JPEG reference module
//!
//! Reads the companion JPEG's EXIF orientation and averages the ROI of the
//! decoded image as an independent colorimetric reference.

pub mod orientation;
pub mod stats;


pub use orientation::{orientation_degrees_from_tag, read_orientation_degrees};
pub use stats::{JpegStats, compute_jpeg_stats, stats_from_image};
