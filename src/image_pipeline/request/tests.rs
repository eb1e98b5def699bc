use std::path::{Path, PathBuf};

use serde_json::json;

use crate::image_pipeline::common::error::RoiError;
use crate::image_pipeline::debayer::CfaPattern;
use crate::image_pipeline::geometry::PixelRect;
use crate::image_pipeline::request::{
    DebugPayload, NormalizedRoi, ProcessingMode, ProcessorConfig, RoiRequest, RoiResponse,
};

#[test]
fn test_request_deserialization() {
    let request: RoiRequest = serde_json::from_value(json!({
        "mode": "Raw",
        "normalizedRoi": { "left": 0.25, "top": 0.5 },
        "metadata": { "whiteLevel": 1023, "rowStride": 200, "pixelStride": 2 },
        "rawBufferPath": "/captures/frame.raw",
        "skipWhiteBalance": true,
        "forceCfaPattern": "GRBG",
        "gamma": 1.8,
        "debugConfig": { "dumpIntermediateImages": true, "bypassCCM": true },
    }))
    .unwrap();

    assert_eq!(request.mode, ProcessingMode::Raw);
    assert_eq!(
        request.normalized_roi().unwrap(),
        NormalizedRoi::new(0.25, 0.5, 1.0, 1.0)
    );
    assert_eq!(request.metadata().unwrap().white_level(), 1023);
    assert_eq!(request.raw_buffer_path().unwrap(), Path::new("/captures/frame.raw"));
    assert!(request.skip_white_balance);
    assert_eq!(request.forced_cfa(), Some(CfaPattern::Grbg));
    assert_eq!(request.gamma, Some(1.8));
    assert!(request.debug_config.dump_intermediate_images);
    assert!(request.debug_config.bypass_ccm);
    assert!(request.jpeg_path.is_none());
}

#[test]
fn test_mode_parsing_is_lenient() {
    let parse = |value: serde_json::Value| {
        serde_json::from_value::<RoiRequest>(json!({ "mode": value }))
            .unwrap()
            .mode
    };
    assert_eq!(parse(json!("jpeg")), ProcessingMode::Jpeg);
    assert_eq!(parse(json!("BOTH")), ProcessingMode::Both);
    assert_eq!(parse(json!("thermal")), ProcessingMode::Both);
    assert_eq!(parse(json!(3)), ProcessingMode::Both);
    assert_eq!(parse(json!(null)), ProcessingMode::Both);

    let absent: RoiRequest = serde_json::from_value(json!({})).unwrap();
    assert_eq!(absent.mode, ProcessingMode::Both);
    assert!(ProcessingMode::Both.includes_raw() && ProcessingMode::Both.includes_jpeg());
    assert!(!ProcessingMode::Jpeg.includes_raw());
    assert!(!ProcessingMode::Raw.includes_jpeg());
}

#[test]
fn test_missing_required_fields() {
    let request = RoiRequest::default();
    assert!(matches!(
        request.normalized_roi(),
        Err(RoiError::MissingField("normalizedRoi"))
    ));
    assert!(matches!(request.metadata(), Err(RoiError::MissingField("metadata"))));
    assert!(matches!(
        request.raw_buffer_path(),
        Err(RoiError::MissingField("rawBufferPath"))
    ));
    assert!(matches!(request.jpeg_path(), Err(RoiError::MissingField("jpegPath"))));
}

#[test]
fn test_invalid_overrides_are_ignored() {
    let request = RoiRequest {
        force_cfa_pattern: Some(crate::image_pipeline::debayer::CfaValue::Code(9)),
        custom_cam_to_xyz: Some(vec![1.0, 0.0, 0.0]),
        ..Default::default()
    };
    assert_eq!(request.forced_cfa(), None);
    assert_eq!(request.custom_cam_to_xyz(), None);
}

#[test]
fn test_config_builder() {
    let config = ProcessorConfig::builder()
        .debug_root("/tmp/debug")
        .default_gamma(2.4)
        .build();
    assert_eq!(config.debug_root, Some(PathBuf::from("/tmp/debug")));
    assert_eq!(config.default_gamma, 2.4);
    assert_eq!(config.color_space, "sRGB");
    assert_eq!(
        config.debug_root_for(Some(Path::new("/captures/frame.raw"))),
        PathBuf::from("/tmp/debug")
    );
}

#[test]
fn test_debug_root_defaults_to_raw_directory() {
    let config = ProcessorConfig::default();
    assert_eq!(
        config.debug_root_for(Some(Path::new("/captures/frame.raw"))),
        PathBuf::from("/captures")
    );
    assert_eq!(config.debug_root_for(None), std::env::temp_dir());
    assert_eq!(
        config.debug_root_for(Some(Path::new("frame.raw"))),
        std::env::temp_dir()
    );
}

#[test]
fn test_response_serialization_shape() {
    let response = RoiResponse {
        color_matrix_source: String::new(),
        debug: DebugPayload {
            stages: vec![
                ("DemosaicStage".to_string(), "a".to_string()),
                ("GammaStage".to_string(), "b".to_string()),
            ],
            ..Default::default()
        },
        ..Default::default()
    };
    let value = serde_json::to_value(&response).unwrap();

    assert_eq!(value["xyz"], json!([]));
    assert_eq!(value["rawRect"], json!({}));
    assert_eq!(value["jpegSrgb"], json!(null));
    assert_eq!(value["colorMatrixSource"], json!(""));
    assert_eq!(value["debug"]["stages"]["GammaStage"], json!("b"));
    assert!(value["debug"].get("rawRect").is_none());
    assert_eq!(response.debug.stage("DemosaicStage"), Some("a"));

    let with_rect = RoiResponse {
        raw_rect: Some(PixelRect::new(1, 2, 3, 4)),
        ..Default::default()
    };
    let value = serde_json::to_value(&with_rect).unwrap();
    assert_eq!(
        value["rawRect"],
        json!({ "left": 1, "top": 2, "right": 3, "bottom": 4 })
    );
}
