//! ROI geometry module
//!
//! Maps an upright normalized ROI into RAW or JPEG pixel space and tracks the
//! CFA phase of the resulting crop.

pub mod mapping;
pub mod rect;


pub use mapping::{effective_cfa, map_rect, resolve_raw_rect, rotate_point, rotate_rect};
pub use rect::PixelRect;
