use image::RgbImage;
use tracing::{debug, info_span};

use crate::image_pipeline::request::DebugConfig;
use crate::image_pipeline::stages::context::{PipelineContext, PipelineResult};
use crate::image_pipeline::stages::stage::{
    ColorCorrectionStage, DemosaicStage, GammaStage, PipelineStage, StageKind, WhiteBalanceStage,
};

/// Outcome of one executor run
pub struct PipelineRun {
    pub context: PipelineContext,
    pub image: RgbImage,
    /// `(stage name, output)` in execution order; empty unless snapshots were requested
    pub snapshots: Vec<(String, RgbImage)>,
}

impl PipelineRun {
    pub fn into_result(self) -> PipelineResult {
        PipelineResult::from_context(&self.context, self.image, self.snapshots)
    }
}

pub struct PipelineExecutor {
    stages: Vec<Box<dyn PipelineStage>>,
    debug: DebugConfig,
}

impl PipelineExecutor {
    pub fn new(stages: Vec<Box<dyn PipelineStage>>, debug: DebugConfig) -> Self {
        Self { stages, debug }
    }

    /// Demosaic, WhiteBalance, ColorCorrection, Gamma.
    pub fn standard(debug: DebugConfig) -> Self {
        Self::new(
            vec![
                Box::new(DemosaicStage::default()),
                Box::new(WhiteBalanceStage),
                Box::new(ColorCorrectionStage),
                Box::new(GammaStage),
            ],
            debug,
        )
    }

    fn skips(&self, kind: StageKind) -> bool {
        kind == StageKind::ColorCorrection && self.debug.bypass_ccm
    }

    pub fn execute(&self, context: PipelineContext) -> PipelineRun {
        let _span = info_span!("pipeline", width = context.width, height = context.height).entered();

        let mut image = RgbImage::new(context.width.max(1), context.height.max(1));
        let mut context = context;
        let mut snapshots = Vec::new();

        for stage in &self.stages {
            let kind = stage.kind();
            if self.skips(kind) {
                debug!(stage = kind.name(), "Stage bypassed");
                continue;
            }
            (context, image) = stage.process(context, image);
            if self.debug.dump_intermediate_images {
                snapshots.push((kind.name().to_string(), image.clone()));
            }
        }

        PipelineRun {
            context,
            image,
            snapshots,
        }
    }
}
