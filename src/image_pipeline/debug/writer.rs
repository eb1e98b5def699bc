use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::image_pipeline::common::error::{Result, RoiError};
use crate::image_pipeline::debug::encoding::{encode_png, sanitize_stage_name};
use crate::image_pipeline::debug::types::DebugBundle;
use crate::image_pipeline::raw::encode_le_u16;

pub trait DebugWriter {
    /// Persists a debug bundle for one request.
    ///
    /// # Arguments
    ///
    /// * `root` - Directory receiving the bundle
    /// * `bundle` - Metadata, ROI samples and stage snapshots to persist
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Path of the written package
    /// * `Err(RoiError)` - A file or the archive could not be written
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    ///
    /// use rawroi_rs::image_pipeline::debug::{DebugBundle, DebugMetadata};
    /// use rawroi_rs::image_pipeline::{DebugWriter, ZipBundleWriter};
    ///
    /// # fn write(metadata: DebugMetadata, raw: &[u16]) {
    /// let bundle = DebugBundle { metadata, raw, stages: &[] };
    /// let zip = ZipBundleWriter::new().write_bundle(Path::new("/tmp/debug"), &bundle).unwrap();
    /// println!("bundle written to {}", zip.display());
    /// # }
    /// ```
    fn write_bundle(&self, root: &Path, bundle: &DebugBundle<'_>) -> Result<PathBuf>;
}

/// Writes `debug_capture_<millis>/` next to a `debug_capture_<millis>.zip` of it.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipBundleWriter;

impl ZipBundleWriter {
    pub fn new() -> Self {
        Self
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|e| RoiError::OutputWriteError(format!("{}: {}", path.display(), e)))
}

impl DebugWriter for ZipBundleWriter {
    fn write_bundle(&self, root: &Path, bundle: &DebugBundle<'_>) -> Result<PathBuf> {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        let name = format!("debug_capture_{}", millis);
        let capture_dir = root.join(&name);
        fs::create_dir_all(&capture_dir)
            .map_err(|e| RoiError::OutputWriteError(format!("{}: {}", capture_dir.display(), e)))?;

        let mut files: Vec<(String, Vec<u8>)> = vec![
            (
                "metadata.json".to_string(),
                serde_json::to_vec_pretty(&bundle.metadata)?,
            ),
            ("input.raw".to_string(), encode_le_u16(bundle.raw)),
        ];
        for (index, (stage, image)) in bundle.stages.iter().enumerate() {
            let file_name = format!("stage_{:02}_{}.png", index, sanitize_stage_name(stage));
            files.push((file_name, encode_png(image)?));
        }

        for (file_name, bytes) in &files {
            write_file(&capture_dir.join(file_name), bytes)?;
        }
        debug!(dir = %capture_dir.display(), files = files.len(), "Wrote debug capture");

        let zip_path = root.join(format!("{}.zip", name));
        let file = File::create(&zip_path)
            .map_err(|e| RoiError::OutputWriteError(format!("{}: {}", zip_path.display(), e)))?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (file_name, bytes) in &files {
            zip.start_file(format!("{}/{}", name, file_name), options)?;
            zip.write_all(bytes)?;
        }
        zip.finish()?;

        info!(path = %zip_path.display(), "Debug bundle written");
        Ok(zip_path)
    }
}
