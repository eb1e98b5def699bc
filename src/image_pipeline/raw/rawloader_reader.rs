//! RAW container import using the rawloader library.
//!
//! Decodes any Bayer RAW format rawloader understands (DNG, ARW, CR2, NEF, ...)
//! into a tightly packed RAW16 buffer and the capture metadata the ROI pipeline
//! expects alongside it.

use std::io::Cursor;

use rawloader::RawImageData as RawloaderImageData;
use tracing::debug;

use crate::image_pipeline::common::error::{Result, RoiError};
use crate::image_pipeline::debayer::CfaPattern;
use crate::image_pipeline::metadata::{CaptureMetadata, illuminant};
use crate::image_pipeline::raw::reader::CaptureImporter;
use crate::image_pipeline::raw::types::{ImportedCapture, StrideLayout};

/// Importer backed by rawloader.
///
/// The sensor area is cropped to the camera's default crop, so ROI coordinates
/// line up with the rendered image. rawloader's XYZ to camera matrix is recorded
/// as the D65 calibration and its white balance coefficients as the as-shot neutral.
pub struct RawLoaderImporter;

impl CaptureImporter for RawLoaderImporter {
    fn import(&self, data: &[u8]) -> Result<ImportedCapture> {
        debug!("Decoding RAW container, {} bytes", data.len());

        let decoded = rawloader::decode(&mut Cursor::new(data))
            .map_err(|e| RoiError::DecodeError(e.to_string()))?;

        if decoded.cpp != 1 {
            return Err(RoiError::DecodeError(format!(
                "{} components per pixel, expected a Bayer mosaic",
                decoded.cpp
            )));
        }

        // Integer data is used as-is, float data (normalized 0.0-1.0) is scaled to the u16 range
        let full: Vec<u16> = match decoded.data {
            RawloaderImageData::Integer(ref values) => values.clone(),
            RawloaderImageData::Float(ref values) => values
                .iter()
                .map(|&v| (v.clamp(0.0, 1.0) * u16::MAX as f32) as u16)
                .collect(),
        };

        let [crop_top, crop_right, crop_bottom, crop_left] = decoded.crops;
        let width = decoded.width.saturating_sub(crop_left + crop_right);
        let height = decoded.height.saturating_sub(crop_top + crop_bottom);
        if width == 0 || height == 0 {
            return Err(RoiError::DecodeError(format!(
                "crop {:?} leaves no pixels in {}x{}",
                decoded.crops, decoded.width, decoded.height
            )));
        }

        let mut samples = Vec::with_capacity(width * height);
        for row in full
            .chunks_exact(decoded.width)
            .skip(crop_top)
            .take(height)
        {
            samples.extend_from_slice(&row[crop_left..crop_left + width]);
        }

        let tile: String = [(0, 0), (0, 1), (1, 0), (1, 1)]
            .into_iter()
            .map(|(row, col)| match decoded.cfa.color_at(row, col) {
                0 => 'R',
                1 => 'G',
                2 => 'B',
                _ => '?',
            })
            .collect();
        let sensor_cfa = CfaPattern::from_name(&tile).ok_or_else(|| {
            RoiError::DecodeError(format!("unsupported CFA layout {}", decoded.cfa.name))
        })?;
        let cfa = sensor_cfa.shifted(crop_left as u32, crop_top as u32);

        // rawloader indexes levels by color (R, G, B), the metadata by site (R, Gr, Gb, B).
        let black = decoded.blacklevels.map(i64::from);
        let black_levels = [black[0], black[1], black[1], black[2]];
        let white_level = decoded.whitelevels.iter().max().copied().unwrap_or(u16::MAX);
        let xyz_to_cam: Vec<f64> = decoded.xyz_to_cam[..3]
            .iter()
            .flatten()
            .map(|&v| f64::from(v))
            .collect();

        // wb_coeffs are multipliers; the neutral is their reciprocal relative to green.
        let wb = decoded.wb_coeffs;
        let as_shot_neutral = (wb[0] > 0.0 && wb[1] > 0.0 && wb[2] > 0.0).then(|| {
            let green = f64::from(wb[1]);
            vec![
                green / f64::from(wb[0]),
                1.0,
                green / f64::from(wb[2]),
            ]
        });

        debug!(
            make = %decoded.clean_make,
            model = %decoded.clean_model,
            width,
            height,
            cfa = cfa.name(),
            white_level,
            "Imported RAW container"
        );

        let layout = StrideLayout::packed(width);
        let metadata = CaptureMetadata {
            cfa_pattern: Some(cfa.into()),
            black_level_pattern: black_levels.to_vec(),
            white_level: i64::from(white_level),
            row_stride: Some(layout.row_stride as i64),
            pixel_stride: Some(layout.pixel_stride as i64),
            raw_width: Some(width as i64),
            raw_height: Some(height as i64),
            as_shot_neutral,
            sensor_color_transform1: Some(xyz_to_cam),
            reference_illuminant1: Some(illuminant::D65),
            ..Default::default()
        };

        Ok(ImportedCapture {
            width,
            height,
            samples,
            metadata,
        })
    }
}
