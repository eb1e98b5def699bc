use std::path::{Path, PathBuf};

use image::RgbImage;
use tracing::{info, instrument, warn};

use crate::image_pipeline::{
    color::{MatrixInputs, resolve_color_matrix, resolve_white_balance},
    common::error::Result,
    debayer::SensorLevels,
    debug::{DebugBundle, DebugMetadata, DebugWriter, ZipBundleWriter, encode_png_base64},
    geometry::{PixelRect, effective_cfa, resolve_raw_rect},
    jpeg::{JpegStats, compute_jpeg_stats, read_orientation_degrees},
    metadata::CaptureMetadata,
    raw::{MmapRawReader, RawBufferReader, StrideLayout},
    request::{DebugPayload, NormalizedRoi, ProcessorConfig, RoiRequest, RoiResponse},
    stages::{CameraMetadata, PipelineContext, PipelineExecutor, PipelineResult},
};

/// RAW path output before it is folded into the response
pub(super) struct RawOutcome {
    pub(super) rect: PixelRect,
    pub(super) result: PipelineResult,
    pub(super) debug_package_path: Option<PathBuf>,
}

pub struct RoiProcessor<R: RawBufferReader, W: DebugWriter> {
    reader: R,
    writer: W,
    config: ProcessorConfig,
}

impl RoiProcessor<MmapRawReader, ZipBundleWriter> {
    /// Processor reading memory-mapped buffers and writing zipped debug bundles.
    pub fn new(config: ProcessorConfig) -> Self {
        Self {
            reader: MmapRawReader,
            writer: ZipBundleWriter,
            config,
        }
    }
}

impl<R: RawBufferReader, W: DebugWriter> RoiProcessor<R, W> {
    /// Processor over caller-supplied reader and writer, e.g. in-memory fakes.
    pub fn with_custom(reader: R, writer: W, config: ProcessorConfig) -> Self {
        Self {
            reader,
            writer,
            config,
        }
    }

    fn resolve_camera_metadata(
        &self,
        request: &RoiRequest,
        metadata: &CaptureMetadata,
        rect: &PixelRect,
    ) -> CameraMetadata {
        let cfa = effective_cfa(metadata.cfa(), rect, request.forced_cfa());
        let white_balance_gains = resolve_white_balance(metadata, request.skip_white_balance);
        let matrices = resolve_color_matrix(&MatrixInputs {
            metadata,
            custom: request.custom_cam_to_xyz(),
        });
        info!(
            cfa = cfa.name(),
            source = %matrices.source,
            gains = ?white_balance_gains,
            "Resolved camera calibration"
        );

        CameraMetadata {
            cfa,
            levels: SensorLevels::new(metadata.black_levels(), metadata.white_level()),
            cam_to_xyz: matrices.cam_to_xyz,
            xyz_to_cam: matrices.xyz_to_cam,
            color_matrix_source: matrices.source,
            white_balance_gains,
            skip_white_balance: request.skip_white_balance,
            gamma: request.gamma.unwrap_or(self.config.default_gamma),
        }
    }

    fn color_space(&self, request: &RoiRequest, metadata: &CaptureMetadata) -> String {
        request
            .color_space
            .clone()
            .or_else(|| metadata.color_space.clone())
            .unwrap_or_else(|| self.config.color_space.clone())
    }

    #[instrument(skip_all)]
    fn process_raw(
        &self,
        request: &RoiRequest,
        roi: &NormalizedRoi,
        metadata: &CaptureMetadata,
        orientation_degrees: i32,
    ) -> Result<RawOutcome> {
        let raw_path = request.raw_buffer_path()?;
        let rect = resolve_raw_rect(roi, metadata, orientation_degrees)?;
        let layout = StrideLayout::from_metadata(metadata)?;

        let raw = {
            let _span = tracing::info_span!("read_roi", width = rect.width(), height = rect.height()).entered();
            self.reader.read_roi(raw_path, &rect, layout)?
        };

        let camera = self.resolve_camera_metadata(request, metadata, &rect);
        let debug_metadata = request.debug_config.dump_intermediate_images.then(|| DebugMetadata {
            bypass_ccm: request.debug_config.bypass_ccm,
            ..DebugMetadata::new(
                rect.width(),
                rect.height(),
                &camera,
                metadata,
                self.color_space(request, metadata),
            )
        });

        let run = {
            let _span = tracing::info_span!("run_stages").entered();
            let context = PipelineContext::new(raw, rect.width(), rect.height(), camera);
            PipelineExecutor::standard(request.debug_config).execute(context)
        };

        let debug_package_path = debug_metadata.and_then(|metadata| {
            let _span = tracing::info_span!("write_debug_bundle").entered();
            let bundle = DebugBundle {
                metadata,
                raw: &run.context.raw,
                stages: &run.snapshots,
            };
            let root = self.config.debug_root_for(Some(raw_path));
            self.writer
                .write_bundle(&root, &bundle)
                .inspect_err(|e| warn!(error = %e, root = %root.display(), "Failed to write debug bundle"))
                .ok()
        });

        Ok(RawOutcome {
            rect,
            result: run.into_result(),
            debug_package_path,
        })
    }

    fn process_jpeg(&self, path: &Path, roi: &NormalizedRoi, orientation_degrees: i32) -> Option<JpegStats> {
        let _span = tracing::info_span!("jpeg_stats", path = %path.display()).entered();
        compute_jpeg_stats(path, roi, orientation_degrees)
            .inspect_err(|e| warn!(error = %e, "JPEG stats unavailable"))
            .ok()
    }

    /// Measures the color of one region of interest.
    ///
    /// Required fields are checked before any reading. JPEG stats, debug bundles and
    /// debug PNGs degrade to absent output when they fail.
    ///
    /// # Arguments
    ///
    /// * `request` - ROI, capture metadata, input paths and processing options
    ///
    /// # Returns
    ///
    /// * `Ok(RoiResponse)` - RAW colorimetry and/or JPEG reference stats, per `request.mode`
    /// * `Err(RoiError)` - A required field is missing, the geometry or strides are
    ///   invalid, or the RAW buffer could not be read
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rawroi_rs::image_pipeline::{ProcessorConfig, RoiProcessor, RoiRequest};
    ///
    /// let body = std::fs::read_to_string("request.json").unwrap();
    /// let request: RoiRequest = serde_json::from_str(&body).unwrap();
    /// let response = RoiProcessor::new(ProcessorConfig::default()).process(&request).unwrap();
    /// println!("XYZ {:?} via {}", response.xyz, response.color_matrix_source);
    /// ```
    #[instrument(skip_all, fields(mode = request.mode.as_str()))]
    pub fn process(&self, request: &RoiRequest) -> Result<RoiResponse> {
        info!("Starting ROI processing");

        let roi = request.normalized_roi()?;
        let metadata = request.metadata()?;
        if request.mode.includes_raw() {
            request.raw_buffer_path()?;
        }
        let jpeg_path = if request.mode.includes_jpeg() {
            Some(request.jpeg_path()?)
        } else {
            None
        };
        let orientation_degrees = request.orientation_degrees.unwrap_or_else(|| {
            request
                .jpeg_path
                .as_deref()
                .map(read_orientation_degrees)
                .unwrap_or(0)
        });

        let raw = if request.mode.includes_raw() {
            Some(self.process_raw(request, &roi, metadata, orientation_degrees)?)
        } else {
            None
        };

        let jpeg = jpeg_path.and_then(|path| self.process_jpeg(path, &roi, orientation_degrees));

        let response = build_response(raw, jpeg);
        info!(xyz = ?response.xyz, source = %response.color_matrix_source, "ROI processing complete");
        Ok(response)
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }
}

fn encode_or_warn(name: &str, image: &RgbImage) -> Option<String> {
    encode_png_base64(image)
        .inspect_err(|e| warn!(error = %e, image = name, "Failed to encode debug PNG"))
        .ok()
}

pub(super) fn build_response(raw: Option<RawOutcome>, jpeg: Option<JpegStats>) -> RoiResponse {
    let mut response = RoiResponse {
        jpeg_srgb: jpeg.map(|stats| stats.srgb.to_vec()),
        jpeg_linear_rgb: jpeg.map(|stats| stats.linear.to_vec()),
        jpeg_xyz: jpeg.map(|stats| stats.xyz.to_vec()),
        ..Default::default()
    };

    let Some(RawOutcome {
        rect,
        result,
        debug_package_path,
    }) = raw
    else {
        return response;
    };

    let stages = result
        .snapshots
        .iter()
        .filter_map(|(name, image)| Some((name.clone(), encode_or_warn(name, image)?)))
        .collect();

    response.xyz = result.xyz.to_vec();
    response.linear_rgb = result.balanced_rgb.to_rgb().to_vec();
    response.raw_rgb = result.camera_rgb.to_rgb().to_vec();
    response.white_balance_gains = result.white_balance_gains.to_vec();
    response.cam_to_xyz_matrix = result.cam_to_xyz.to_vec();
    response.xyz_to_cam_matrix = result.xyz_to_cam.to_vec();
    response.color_matrix_source = result.color_matrix_source;
    response.raw_rect = Some(rect);
    response.debug = DebugPayload {
        raw_rect: Some(rect),
        debug_package_path: debug_package_path.map(|path| path.display().to_string()),
        final_image: encode_or_warn("final", &result.preview),
        stages,
    };
    response
}
