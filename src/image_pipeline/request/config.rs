//! Processor configuration

use std::path::{Path, PathBuf};

use crate::image_pipeline::color::tone::DEFAULT_GAMMA;

/// Configuration shared by every request a processor handles
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorConfig {
    /// Directory receiving debug bundles; defaults to the RAW buffer's directory
    pub debug_root: Option<PathBuf>,
    /// Gamma used when a request does not carry one
    pub default_gamma: f64,
    /// Color space label written to debug metadata when neither the request nor the capture names one
    pub color_space: String,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            debug_root: None,
            default_gamma: DEFAULT_GAMMA,
            color_space: "sRGB".to_string(),
        }
    }
}

impl ProcessorConfig {
    pub fn builder() -> ProcessorConfigBuilder {
        ProcessorConfigBuilder::default()
    }

    /// Debug bundle root for a capture whose RAW buffer lives at `raw_path`.
    pub fn debug_root_for(&self, raw_path: Option<&Path>) -> PathBuf {
        if let Some(root) = &self.debug_root {
            return root.clone();
        }
        raw_path
            .and_then(Path::parent)
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(std::env::temp_dir)
    }
}

/// Builder for ProcessorConfig
#[derive(Default)]
pub struct ProcessorConfigBuilder {
    debug_root: Option<PathBuf>,
    default_gamma: Option<f64>,
    color_space: Option<String>,
}

impl ProcessorConfigBuilder {
    pub fn debug_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.debug_root = Some(root.into());
        self
    }

    pub fn default_gamma(mut self, gamma: f64) -> Self {
        self.default_gamma = Some(gamma);
        self
    }

    pub fn color_space(mut self, name: impl Into<String>) -> Self {
        self.color_space = Some(name.into());
        self
    }

    pub fn build(self) -> ProcessorConfig {
        let default = ProcessorConfig::default();
        ProcessorConfig {
            debug_root: self.debug_root.or(default.debug_root),
            default_gamma: self.default_gamma.unwrap_or(default.default_gamma),
            color_space: self.color_space.unwrap_or(default.color_space),
        }
    }
}
