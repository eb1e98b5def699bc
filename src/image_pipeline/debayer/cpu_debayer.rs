use image::RgbImage;
use tracing::debug;

use crate::image_pipeline::color::tone::to_rgb8;
use crate::image_pipeline::debayer::cfa::{BayerChannel, CfaPattern};
use crate::image_pipeline::debayer::types::{ChannelAverages, DemosaicOutput, SensorLevels};

/// 3x3 neighborhood, center first.
const NEIGHBOR_OFFSETS: [(isize, isize); 9] = [
    (0, 0),
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

#[derive(Debug, Default, Clone, Copy)]
struct ChannelAccumulator {
    sum: f64,
    count: u64,
}

impl ChannelAccumulator {
    fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Neighborhood-averaging demosaic over a small ROI.
///
/// Produces the per-site channel averages used for colorimetry together with a
/// per-pixel RGB raster. Neighbors outside the ROI are skipped rather than padded.
pub struct CpuDebayer;

impl CpuDebayer {
    pub fn new() -> Self {
        Self
    }

    pub fn process(
        &self,
        samples: &[u16],
        width: usize,
        height: usize,
        pattern: CfaPattern,
        levels: &SensorLevels,
    ) -> DemosaicOutput {
        debug!(
            width,
            height,
            cfa = pattern.name(),
            white = levels.white,
            "Demosaicing ROI"
        );

        let (normalized, averages) = self.normalize(samples, width, height, pattern, levels);

        let mut raster = RgbImage::new(width as u32, height as u32);
        for y in 0..height {
            for x in 0..width {
                let rgb = self.interpolate(&normalized, width, height, x, y, pattern);
                raster.put_pixel(x as u32, y as u32, to_rgb8(rgb));
            }
        }

        debug!(
            red = averages.red,
            green_r = averages.green_r,
            green_b = averages.green_b,
            blue = averages.blue,
            "Channel averages"
        );

        DemosaicOutput { averages, raster }
    }

    /// Normalizes every sample and accumulates the per-site means.
    pub fn normalize(
        &self,
        samples: &[u16],
        width: usize,
        height: usize,
        pattern: CfaPattern,
        levels: &SensorLevels,
    ) -> (Vec<f64>, ChannelAverages) {
        let mut normalized = vec![0.0; width * height];
        let mut accumulators = [ChannelAccumulator::default(); 4];

        for y in 0..height {
            for x in 0..width {
                let index = y * width + x;
                let channel = pattern.channel_at(x, y);
                let sample = samples.get(index).copied().unwrap_or(0);
                let value = levels.normalize(sample, channel);
                normalized[index] = value;
                let accumulator = &mut accumulators[channel.index()];
                accumulator.sum += value;
                accumulator.count += 1;
            }
        }

        let averages = ChannelAverages::new(
            accumulators[BayerChannel::Red.index()].average(),
            accumulators[BayerChannel::GreenR.index()].average(),
            accumulators[BayerChannel::GreenB.index()].average(),
            accumulators[BayerChannel::Blue.index()].average(),
        );
        (normalized, averages)
    }

    fn interpolate(
        &self,
        normalized: &[f64],
        width: usize,
        height: usize,
        x: usize,
        y: usize,
        pattern: CfaPattern,
    ) -> [f64; 3] {
        let center = normalized[y * width + x];
        let channel = pattern.channel_at(x, y);

        let red = if channel == BayerChannel::Red {
            center
        } else {
            sample_neighbors(normalized, width, height, x, y, |c| {
                pattern_matches(pattern, c, BayerChannel::Red)
            })
        };
        let green = if channel.is_green() {
            center
        } else {
            sample_neighbors(normalized, width, height, x, y, |c| {
                pattern.channel_at(c.0, c.1).is_green()
            })
        };
        let blue = if channel == BayerChannel::Blue {
            center
        } else {
            sample_neighbors(normalized, width, height, x, y, |c| {
                pattern_matches(pattern, c, BayerChannel::Blue)
            })
        };

        [red, green, blue]
    }
}

impl Default for CpuDebayer {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn pattern_matches(pattern: CfaPattern, site: (usize, usize), target: BayerChannel) -> bool {
    pattern.channel_at(site.0, site.1) == target
}

/// Mean of the in-bounds neighbors accepted by `accept`, or the center value if none are.
fn sample_neighbors<F>(
    normalized: &[f64],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    accept: F,
) -> f64
where
    F: Fn((usize, usize)) -> bool,
{
    let mut sum = 0.0;
    let mut count = 0usize;
    for (dx, dy) in NEIGHBOR_OFFSETS {
        let (Some(nx), Some(ny)) = (x.checked_add_signed(dx), y.checked_add_signed(dy)) else {
            continue;
        };
        if nx >= width || ny >= height {
            continue;
        }
        if accept((nx, ny)) {
            sum += normalized[ny * width + nx];
            count += 1;
        }
    }
    if count == 0 {
        normalized[y * width + x]
    } else {
        sum / count as f64
    }
}
