use image::RgbImage;
use tracing::{debug, instrument};

use crate::image_pipeline::color::{matrix, tone};
use crate::image_pipeline::debayer::CpuDebayer;
use crate::image_pipeline::stages::context::PipelineContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Demosaic,
    WhiteBalance,
    ColorCorrection,
    Gamma,
}

impl StageKind {
    pub fn name(self) -> &'static str {
        match self {
            StageKind::Demosaic => "DemosaicStage",
            StageKind::WhiteBalance => "WhiteBalanceStage",
            StageKind::ColorCorrection => "ColorCorrectionStage",
            StageKind::Gamma => "GammaStage",
        }
    }
}

pub trait PipelineStage {
    fn kind(&self) -> StageKind;

    /// Consumes the context and the previous stage's image, returning both updated.
    fn process(&self, context: PipelineContext, input: RgbImage) -> (PipelineContext, RgbImage);
}

/// Normalizes and demosaics the ROI, producing the camera-RGB channel averages.
#[derive(Default)]
pub struct DemosaicStage {
    debayer: CpuDebayer,
}

impl PipelineStage for DemosaicStage {
    fn kind(&self) -> StageKind {
        StageKind::Demosaic
    }

    #[instrument(name = "demosaic", skip_all, fields(width = context.width, height = context.height))]
    fn process(&self, mut context: PipelineContext, input: RgbImage) -> (PipelineContext, RgbImage) {
        if context.width == 0 || context.height == 0 {
            return (context, input);
        }
        let output = self.debayer.process(
            &context.raw,
            context.width as usize,
            context.height as usize,
            context.metadata.cfa,
            &context.metadata.levels,
        );
        context.camera_sample = Some(output.averages);
        context.balanced_sample = Some(output.averages);
        (context, output.raster)
    }
}

#[derive(Default)]
pub struct WhiteBalanceStage;

impl PipelineStage for WhiteBalanceStage {
    fn kind(&self) -> StageKind {
        StageKind::WhiteBalance
    }

    fn process(&self, mut context: PipelineContext, input: RgbImage) -> (PipelineContext, RgbImage) {
        let Some(sample) = context.balanced_sample.or(context.camera_sample) else {
            return (context, input);
        };
        let corrected = if context.metadata.skip_white_balance {
            sample
        } else {
            sample.with_gains(context.metadata.white_balance_gains)
        };
        debug!(gains = ?context.metadata.white_balance_gains, rgb = ?corrected.to_rgb(), "White balanced");
        context.balanced_sample = Some(corrected);
        let image = tone::solid_image(context.width, context.height, corrected.to_rgb());
        (context, image)
    }
}

/// Maps balanced camera RGB to XYZ and linear sRGB.
#[derive(Default)]
pub struct ColorCorrectionStage;

impl PipelineStage for ColorCorrectionStage {
    fn kind(&self) -> StageKind {
        StageKind::ColorCorrection
    }

    fn process(&self, mut context: PipelineContext, input: RgbImage) -> (PipelineContext, RgbImage) {
        let Some(sample) = context.balanced_sample else {
            return (context, input);
        };
        let xyz = matrix::multiply_vector(&context.metadata.cam_to_xyz, sample.to_rgb())
            .map(|v| v.max(0.0));
        let linear = tone::xyz_to_linear_srgb(xyz);
        debug!(?xyz, ?linear, source = %context.metadata.color_matrix_source, "Color corrected");
        context.xyz_sample = Some(xyz);
        context.linear_rgb = Some(linear);
        let image = tone::solid_image(context.width, context.height, linear);
        (context, image)
    }
}

/// Preview tone curve over linear sRGB, or balanced camera RGB when color correction was bypassed.
#[derive(Default)]
pub struct GammaStage;

impl PipelineStage for GammaStage {
    fn kind(&self) -> StageKind {
        StageKind::Gamma
    }

    fn process(&self, mut context: PipelineContext, input: RgbImage) -> (PipelineContext, RgbImage) {
        let Some(linear) = context
            .linear_rgb
            .or_else(|| context.balanced_sample.map(|sample| sample.to_rgb()))
        else {
            return (context, input);
        };
        let gamma = context.metadata.gamma;
        let encoded = linear.map(|v| tone::apply_gamma(v, gamma));
        context.srgb_sample = Some(encoded);
        let image = tone::solid_image(context.width, context.height, encoded);
        (context, image)
    }
}
