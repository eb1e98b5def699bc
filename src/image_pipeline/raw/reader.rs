use std::path::Path;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::geometry::PixelRect;
use crate::image_pipeline::raw::types::{ImportedCapture, StrideLayout};

pub trait RawBufferReader {
    /// Reads the samples of `rect` out of a strided little-endian RAW16 buffer.
    ///
    /// Samples past the end of a truncated buffer read as zero.
    ///
    /// # Arguments
    ///
    /// * `path` - RAW16 buffer on disk
    /// * `rect` - Region to read, in sensor pixels
    /// * `layout` - Row and pixel strides of the buffer, in bytes
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<u16>)` - Dense row-major samples, `rect.width() * rect.height()` long
    /// * `Err(RoiError)` - The buffer could not be opened or mapped
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    ///
    /// use rawroi_rs::image_pipeline::geometry::PixelRect;
    /// use rawroi_rs::image_pipeline::raw::StrideLayout;
    /// use rawroi_rs::image_pipeline::{MmapRawReader, RawBufferReader};
    ///
    /// let layout = StrideLayout { row_stride: 8064, pixel_stride: 2 };
    /// let rect = PixelRect::new(100, 200, 164, 248);
    /// let samples = MmapRawReader.read_roi(Path::new("frame.raw"), &rect, layout).unwrap();
    /// assert_eq!(samples.len(), 64 * 48);
    /// ```
    fn read_roi(&self, path: &Path, rect: &PixelRect, layout: StrideLayout) -> Result<Vec<u16>>;
}

pub trait CaptureImporter {
    /// Decodes a RAW container into a RAW16 frame plus the metadata a request needs.
    ///
    /// # Arguments
    ///
    /// * `data` - Raw bytes of the RAW or DNG file
    ///
    /// # Returns
    ///
    /// * `Ok(ImportedCapture)` - Samples, dimensions and capture metadata
    /// * `Err(RoiError)` - The container could not be decoded
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    ///
    /// use rawroi_rs::image_pipeline::{CaptureImporter, RawLoaderImporter};
    ///
    /// let data = std::fs::read("capture.dng").unwrap();
    /// let capture = RawLoaderImporter.import(&data).unwrap();
    /// capture.write_to(Path::new("out"), "capture").unwrap();
    /// ```
    fn import(&self, data: &[u8]) -> Result<ImportedCapture>;
}

/// Gathers the little-endian samples of `rect` from a strided buffer.
///
/// Samples whose two bytes do not lie entirely inside `bytes` read as zero.
pub fn extract_roi(bytes: &[u8], rect: &PixelRect, layout: StrideLayout) -> Vec<u16> {
    let width = rect.width() as usize;
    let height = rect.height() as usize;
    let mut samples = vec![0u16; width * height];

    for y in 0..height {
        let row_base = (rect.top as usize + y).checked_mul(layout.row_stride);
        for x in 0..width {
            let offset = row_base.and_then(|base| {
                (rect.left as usize + x)
                    .checked_mul(layout.pixel_stride)
                    .and_then(|column| base.checked_add(column))
            });
            if let Some(pair) = offset.and_then(|offset| bytes.get(offset..offset.checked_add(2)?)) {
                samples[y * width + x] = u16::from_le_bytes([pair[0], pair[1]]);
            }
        }
    }
    samples
}
