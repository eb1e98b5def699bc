use std::fs;
use std::path::Path;

use approx::assert_relative_eq;
use image::{Rgb, RgbImage};
use serde_json::json;
use tempfile::TempDir;

use rawroi_rs::image_pipeline::color::matrix;
use rawroi_rs::image_pipeline::{ProcessorConfig, RoiProcessor, RoiRequest, replay_bundle};

const WIDTH: usize = 16;
const HEIGHT: usize = 12;
const ROW_PADDING: usize = 8;

/// Writes an RGGB frame with padded rows, black level 64 and white level 1064.
fn write_raw_buffer(path: &Path) {
    let row_stride = WIDTH * 2 + ROW_PADDING;
    let mut bytes = vec![0u8; row_stride * HEIGHT];
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let sample: u16 = match (y & 1, x & 1) {
                (0, 0) => 564,
                (1, 1) => 264,
                _ => 464,
            };
            let offset = y * row_stride + x * 2;
            bytes[offset..offset + 2].copy_from_slice(&sample.to_le_bytes());
        }
    }
    fs::write(path, bytes).unwrap();
}

fn request(dir: &Path) -> RoiRequest {
    serde_json::from_value(json!({
        "mode": "both",
        "normalizedRoi": { "left": 0.3125, "top": 0.25, "right": 0.8125, "bottom": 0.75 },
        "rawBufferPath": dir.join("frame.raw"),
        "jpegPath": dir.join("frame.jpg"),
        "metadata": {
            "cfaPattern": 0,
            "blackLevelPattern": [64, 64, 64, 64],
            "whiteLevel": 1064,
            "rowStride": WIDTH * 2 + ROW_PADDING,
            "pixelStride": 2,
            "rawWidth": WIDTH,
            "rawHeight": HEIGHT,
            "asShotNeutral": [0.5, 1.0, 0.5],
        },
        "debugConfig": { "dumpIntermediateImages": true },
    }))
    .unwrap()
}

#[test]
fn test_constant_capture_end_to_end() {
    let dir = TempDir::new().unwrap();
    write_raw_buffer(&dir.path().join("frame.raw"));
    RgbImage::from_pixel(32, 24, Rgb([128, 128, 128]))
        .save(dir.path().join("frame.jpg"))
        .unwrap();

    let debug_root = dir.path().join("debug");
    let config = ProcessorConfig::builder().debug_root(&debug_root).build();
    let response = RoiProcessor::new(config).process(&request(dir.path())).unwrap();

    // Odd crop offsets turn RGGB into BGGR; the averages stay per channel.
    let expected_raw = [0.5, 0.4, 0.2];
    let expected_balanced = [1.0, 0.4, 0.4];
    for channel in 0..3 {
        assert_relative_eq!(response.raw_rgb[channel], expected_raw[channel], epsilon = 1e-12);
        assert_relative_eq!(response.linear_rgb[channel], expected_balanced[channel], epsilon = 1e-12);
    }
    assert_eq!(response.white_balance_gains, vec![2.0, 1.0, 2.0]);
    assert_eq!(response.color_matrix_source, "default_static");

    let cam_to_xyz = matrix::from_slice(&response.cam_to_xyz_matrix).unwrap();
    let xyz = matrix::multiply_vector(&cam_to_xyz, expected_balanced).map(|v| v.max(0.0));
    for channel in 0..3 {
        assert_relative_eq!(response.xyz[channel], xyz[channel], epsilon = 1e-12);
        assert!(response.xyz[channel] >= 0.0);
    }

    let jpeg = response.jpeg_srgb.clone().unwrap();
    for value in jpeg {
        assert_relative_eq!(value, 128.0 / 255.0, epsilon = 3.0 / 255.0);
    }

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(
        json["rawRect"],
        json!({ "left": 5, "top": 3, "right": 13, "bottom": 9 })
    );
    assert_eq!(json["debug"]["stages"].as_object().unwrap().len(), 4);
    assert!(json["debug"]["finalImage"].is_string());

    let bundle = response.debug.debug_package_path.clone().unwrap();
    assert!(Path::new(&bundle).starts_with(&debug_root));
    let report = replay_bundle(Path::new(&bundle)).unwrap();
    assert_eq!((report.width, report.height), (8, 6));
    assert_eq!(report.cfa_pattern, "BGGR");
    for channel in 0..3 {
        assert_relative_eq!(report.xyz[channel], response.xyz[channel], epsilon = 1e-9);
    }
}

#[test]
fn test_raw_only_request_reports_no_jpeg() {
    let dir = TempDir::new().unwrap();
    write_raw_buffer(&dir.path().join("frame.raw"));

    let mut request = request(dir.path());
    request.mode = rawroi_rs::image_pipeline::ProcessingMode::Raw;
    request.debug_config = Default::default();

    let response = RoiProcessor::new(ProcessorConfig::default())
        .process(&request)
        .unwrap();
    let json = serde_json::to_value(&response).unwrap();
    assert!(json["jpegSrgb"].is_null());
    assert!(json["debug"].get("stages").is_none());
    assert!(json["debug"].get("debugPackagePath").is_none());
    assert_eq!(json["linearRgb"].as_array().unwrap().len(), 3);
}

#[test]
fn test_truncated_buffer_reads_zeros() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("frame.raw"), b"").unwrap();

    let mut request = request(dir.path());
    request.mode = rawroi_rs::image_pipeline::ProcessingMode::Raw;
    request.debug_config = Default::default();

    let response = RoiProcessor::new(ProcessorConfig::default())
        .process(&request)
        .unwrap();
    assert_eq!(response.raw_rgb, vec![0.0, 0.0, 0.0]);
    assert_eq!(response.xyz, vec![0.0, 0.0, 0.0]);
}
