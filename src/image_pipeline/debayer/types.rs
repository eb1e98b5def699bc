//! Types for debayering operations

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::image_pipeline::debayer::cfa::BayerChannel;

/// Mean normalized value of each Bayer site over the ROI
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelAverages {
    pub red: f64,
    pub green_r: f64,
    pub green_b: f64,
    pub blue: f64,
}

impl ChannelAverages {
    pub fn new(red: f64, green_r: f64, green_b: f64, blue: f64) -> Self {
        Self {
            red,
            green_r,
            green_b,
            blue,
        }
    }

    pub fn green_average(&self) -> f64 {
        (self.green_r + self.green_b) / 2.0
    }

    /// Reduces to `[red, mean green, blue]`.
    pub fn to_rgb(&self) -> [f64; 3] {
        [self.red, self.green_average(), self.blue]
    }

    /// Scales each site; both greens share the green gain.
    pub fn with_gains(&self, gains: [f64; 3]) -> Self {
        Self {
            red: self.red * gains[0],
            green_r: self.green_r * gains[1],
            green_b: self.green_b * gains[1],
            blue: self.blue * gains[2],
        }
    }
}

/// Per-site black levels and the sensor white level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorLevels {
    pub black: [i64; 4],
    pub white: i64,
}

impl SensorLevels {
    pub fn new(black: [i64; 4], white: i64) -> Self {
        Self {
            black,
            white: white.max(1),
        }
    }

    /// Black-subtracted sample scaled by the usable range of its site.
    #[inline]
    pub fn normalize(&self, sample: u16, channel: BayerChannel) -> f64 {
        let black = self.black[channel.index()];
        let corrected = i64::from(sample).saturating_sub(black).max(0);
        let range = self.white.saturating_sub(black).max(1);
        corrected as f64 / range as f64
    }
}

/// Output of the ROI demosaic
#[derive(Debug, Clone)]
pub struct DemosaicOutput {
    /// Per-site averages used for colorimetry
    pub averages: ChannelAverages,
    /// Interpolated preview raster, for visual inspection only
    pub raster: RgbImage,
}
