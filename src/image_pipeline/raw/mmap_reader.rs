use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use tracing::{debug, warn};

use crate::image_pipeline::common::error::{Result, RoiError};
use crate::image_pipeline::geometry::PixelRect;
use crate::image_pipeline::raw::reader::{RawBufferReader, extract_roi};
use crate::image_pipeline::raw::types::StrideLayout;

/// Reads ROI samples through a read-only memory map of the RAW dump.
#[derive(Debug, Default, Clone, Copy)]
pub struct MmapRawReader;

impl MmapRawReader {
    pub fn new() -> Self {
        Self
    }
}

impl RawBufferReader for MmapRawReader {
    fn read_roi(&self, path: &Path, rect: &PixelRect, layout: StrideLayout) -> Result<Vec<u16>> {
        let file = File::open(path)
            .map_err(|e| RoiError::InputReadError(format!("{}: {}", path.display(), e)))?;
        let len = file.metadata()?.len();

        if len == 0 {
            warn!(path = %path.display(), "RAW buffer is empty, ROI reads as zeros");
            return Ok(vec![0; rect.area()]);
        }

        // The capture side writes the dump once before handing it over.
        let mmap = unsafe { Mmap::map(&file)? };
        debug!(
            path = %path.display(),
            bytes = len,
            row_stride = layout.row_stride,
            pixel_stride = layout.pixel_stride,
            "Mapped RAW buffer"
        );
        Ok(extract_roi(&mmap, rect, layout))
    }
}
