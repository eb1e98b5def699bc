use approx::assert_relative_eq;

use crate::image_pipeline::color::cct::{self, CalibrationEntry};
use crate::image_pipeline::color::color_matrix::{DEFAULT_CAM_TO_XYZ, DEFAULT_XYZ_TO_CAM};
use crate::image_pipeline::color::matrix::{self, IDENTITY, Mat3};
use crate::image_pipeline::color::{MatrixInputs, resolve_color_matrix, resolve_white_balance, tone};
use crate::image_pipeline::metadata::CaptureMetadata;

fn assert_matrix_eq(actual: &Mat3, expected: &Mat3, epsilon: f64) {
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert_relative_eq!(*a, *e, epsilon = epsilon);
    }
}

fn entry(index: usize, cct: f64, color_matrix: Mat3) -> CalibrationEntry {
    CalibrationEntry {
        index,
        illuminant_name: "test",
        cct,
        color_matrix,
        camera_calibration: IDENTITY,
    }
}

#[test]
fn test_double_inversion_recovers_matrix() {
    let m: Mat3 = [2.0, 0.5, 0.1, 0.3, 1.5, 0.2, 0.05, 0.4, 1.2];
    let inverse = matrix::invert(&m).unwrap();
    assert_matrix_eq(&matrix::invert(&inverse).unwrap(), &m, 1e-6);
    assert_matrix_eq(&matrix::multiply(&m, &inverse), &IDENTITY, 1e-9);
}

#[test]
fn test_singular_matrix_has_no_inverse() {
    assert!(matrix::invert(&[0.0; 9]).is_none());
    assert!(matrix::invert(&[1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 1.0, 1.0]).is_none());
}

#[test]
fn test_default_matrix_pair_is_inverse() {
    assert_matrix_eq(
        &matrix::invert(&DEFAULT_CAM_TO_XYZ).unwrap(),
        &DEFAULT_XYZ_TO_CAM,
        1e-6,
    );
}

#[test]
fn test_lerp_clamps_weight() {
    let a = matrix::diagonal([1.0, 1.0, 1.0]);
    let b = matrix::diagonal([3.0, 3.0, 3.0]);
    assert_eq!(matrix::lerp(&a, &b, 0.5)[0], 2.0);
    assert_eq!(matrix::lerp(&a, &b, -1.0), a);
    assert_eq!(matrix::lerp(&a, &b, 2.0), b);
}

#[test]
fn test_mccamy_cct() {
    assert_relative_eq!(cct::xy_to_cct(0.3127, 0.3290).unwrap(), 6505.08, epsilon = 0.01);
    assert_relative_eq!(cct::xy_to_cct(0.4476, 0.4074).unwrap(), 2856.40, epsilon = 0.01);
    assert!(cct::xy_to_cct(0.3, 0.1858).is_none());
}

#[test]
fn test_interpolation_weight_bounds_and_monotonicity() {
    let (low, high) = (2856.0, 6504.0);
    assert_eq!(cct::interpolation_weight(low, low, high), 0.0);
    assert_relative_eq!(cct::interpolation_weight(high, low, high), 1.0, epsilon = 1e-12);
    assert_eq!(cct::interpolation_weight(2000.0, low, high), 0.0);
    assert_eq!(cct::interpolation_weight(9000.0, low, high), 1.0);
    assert_eq!(cct::interpolation_weight(-5.0, low, high), 0.0);
    assert_eq!(cct::interpolation_weight(4000.0, low, low), 0.0);

    let mut previous = 0.0;
    for step in 0..=20 {
        let cct = low + (high - low) * f64::from(step) / 20.0;
        let weight = cct::interpolation_weight(cct, low, high);
        assert!(weight >= previous, "weight decreased at {}", cct);
        previous = weight;
    }
}

#[test]
fn test_pair_selection_pins_outside_range() {
    let entries = vec![
        entry(1, 2856.0, IDENTITY),
        entry(2, 5003.0, IDENTITY),
        entry(3, 6504.0, IDENTITY),
    ];

    let below = cct::select_calibration_pair(&entries, Some(2000.0));
    assert_eq!((below.low.index, below.high.index, below.weight), (1, 2, 0.0));

    let above = cct::select_calibration_pair(&entries, Some(7500.0));
    assert_eq!((above.low.index, above.high.index, above.weight), (2, 3, 1.0));

    let inside = cct::select_calibration_pair(&entries, Some(5500.0));
    assert_eq!((inside.low.index, inside.high.index), (2, 3));
    assert!(inside.weight > 0.0 && inside.weight < 1.0);

    let unknown = cct::select_calibration_pair(&entries, None);
    assert_eq!((unknown.low.index, unknown.weight), (1, 0.0));
}

#[test]
fn test_interpolation_converges_between_entries() {
    let entries = vec![entry(1, 2856.0, IDENTITY), entry(2, 6504.0, IDENTITY)];
    // Chromaticity (0.3805, 0.3768) at Y = 1, roughly 4000 K.
    let neutral = [0.3805 / 0.3768, 1.0, (1.0 - 0.3805 - 0.3768) / 0.3768];

    let result = cct::interpolate_color_matrix(&entries, &IDENTITY, Some(neutral)).unwrap();

    assert_eq!(result.iterations, 1);
    assert_relative_eq!(result.cct.unwrap(), 4007.65, epsilon = 0.01);
    assert_relative_eq!(
        result.weight,
        cct::interpolation_weight(result.cct.unwrap(), 2856.0, 6504.0),
        epsilon = 1e-12
    );
    assert!(result.weight > 0.0 && result.weight < 1.0);
    assert_matrix_eq(&result.cam_to_xyz, &IDENTITY, 1e-12);
}

#[test]
fn test_interpolation_with_distinct_matrices_stays_bounded() {
    let entries = vec![
        entry(1, 2856.0, matrix::diagonal([0.6, 1.0, 1.8])),
        entry(2, 6504.0, matrix::diagonal([0.9, 1.0, 1.1])),
    ];
    let result =
        cct::interpolate_color_matrix(&entries, &IDENTITY, Some([0.5, 1.0, 0.7])).unwrap();
    assert!(result.iterations >= 1 && result.iterations <= cct::MAX_ITERATIONS);
    assert!((0.0..=1.0).contains(&result.weight));
    assert!(result.cam_to_xyz.iter().all(|v| v.is_finite()));
}

#[test]
fn test_gather_skips_unresolvable_illuminants() {
    let metadata = CaptureMetadata {
        sensor_color_transform1: Some(IDENTITY.to_vec()),
        reference_illuminant1: Some(0),
        sensor_color_transform2: Some(IDENTITY.to_vec()),
        reference_illuminant2: Some(21),
        sensor_color_transform3: Some(IDENTITY.to_vec()),
        reference_illuminant3: Some(17),
        ..Default::default()
    };
    let entries = cct::gather_calibration_entries(&metadata);
    let indices: Vec<usize> = entries.iter().map(|entry| entry.index).collect();
    assert_eq!(indices, vec![3, 2]);
}

#[test]
fn test_white_balance_from_color_correction_gains() {
    let metadata = CaptureMetadata {
        color_correction_gains: Some(vec![2.0, 1.0, 1.2, 1.5]),
        ..Default::default()
    };
    let gains = resolve_white_balance(&metadata, false);
    assert_relative_eq!(gains[0], 2.0);
    assert_relative_eq!(gains[1], 1.1);
    assert_relative_eq!(gains[2], 1.5);
}

#[test]
fn test_as_shot_neutral_takes_priority() {
    let metadata = CaptureMetadata {
        as_shot_neutral: Some(vec![0.5, 1.0, 0.25]),
        color_correction_gains: Some(vec![2.0, 1.0, 1.2, 1.5]),
        ..Default::default()
    };
    assert_eq!(resolve_white_balance(&metadata, false), [2.0, 1.0, 4.0]);
    assert_eq!(resolve_white_balance(&metadata, true), [1.0, 1.0, 1.0]);
}

#[test]
fn test_white_balance_fallbacks() {
    let zero_neutral = CaptureMetadata {
        as_shot_neutral: Some(vec![0.0, 1.0, 1.0]),
        ..Default::default()
    };
    assert_relative_eq!(resolve_white_balance(&zero_neutral, false)[0], 1e6);

    let tag = CaptureMetadata {
        wb_gains: Some(vec![1.8, 1.0, 1.4]),
        ..Default::default()
    };
    assert_eq!(resolve_white_balance(&tag, false), [1.8, 1.0, 1.4]);

    let short_gains = CaptureMetadata {
        color_correction_gains: Some(vec![2.0, 1.0, 1.0]),
        ..Default::default()
    };
    assert_eq!(resolve_white_balance(&short_gains, false), [1.0, 1.0, 1.0]);
}

#[test]
fn test_custom_matrix_wins() {
    let custom = matrix::diagonal([2.0, 2.0, 2.0]);
    let metadata = CaptureMetadata {
        sensor_forward_matrix1: Some(IDENTITY.to_vec()),
        ..Default::default()
    };
    let resolution = resolve_color_matrix(&MatrixInputs {
        metadata: &metadata,
        custom: Some(custom),
    });
    assert_eq!(resolution.source, "customCamToXyz");
    assert_eq!(resolution.cam_to_xyz, custom);
    assert_matrix_eq(&resolution.xyz_to_cam, &matrix::diagonal([0.5, 0.5, 0.5]), 1e-12);
}

#[test]
fn test_single_calibration_entry_is_composed() {
    let color_matrix = matrix::diagonal([0.5, 1.0, 2.0]);
    let metadata = CaptureMetadata {
        sensor_color_transform1: Some(color_matrix.to_vec()),
        reference_illuminant1: Some(21),
        ..Default::default()
    };
    let resolution = resolve_color_matrix(&MatrixInputs {
        metadata: &metadata,
        custom: None,
    });
    assert_eq!(resolution.source, "colorMatrix1");
    assert_matrix_eq(&resolution.cam_to_xyz, &matrix::diagonal([2.0, 1.0, 0.5]), 1e-12);
    assert_matrix_eq(&resolution.xyz_to_cam, &color_matrix, 1e-12);
}

#[test]
fn test_dual_calibration_is_interpolated() {
    let metadata = CaptureMetadata {
        sensor_color_transform1: Some(matrix::diagonal([0.6, 1.0, 1.8]).to_vec()),
        reference_illuminant1: Some(17),
        sensor_color_transform2: Some(matrix::diagonal([0.9, 1.0, 1.1]).to_vec()),
        reference_illuminant2: Some(21),
        as_shot_neutral: Some(vec![0.5, 1.0, 0.7]),
        ..Default::default()
    };
    let resolution = resolve_color_matrix(&MatrixInputs {
        metadata: &metadata,
        custom: None,
    });
    assert_eq!(resolution.source, "colorMatrix_interpolated");
    assert_matrix_eq(
        &matrix::multiply(&resolution.cam_to_xyz, &resolution.xyz_to_cam),
        &IDENTITY,
        1e-9,
    );
}

#[test]
fn test_singular_calibration_falls_through() {
    let metadata = CaptureMetadata {
        sensor_color_transform1: Some(vec![0.0; 9]),
        reference_illuminant1: Some(17),
        sensor_color_transform2: Some(vec![0.0; 9]),
        reference_illuminant2: Some(21),
        as_shot_neutral: Some(vec![0.5, 1.0, 0.7]),
        ..Default::default()
    };
    let resolution = resolve_color_matrix(&MatrixInputs {
        metadata: &metadata,
        custom: None,
    });
    assert_eq!(resolution.source, "default_static");
}

#[test]
fn test_forward_matrices_blend() {
    let metadata = CaptureMetadata {
        sensor_forward_matrix1: Some(matrix::diagonal([1.0, 1.0, 1.0]).to_vec()),
        sensor_forward_matrix2: Some(matrix::diagonal([3.0, 3.0, 3.0]).to_vec()),
        ..Default::default()
    };
    let resolution = resolve_color_matrix(&MatrixInputs {
        metadata: &metadata,
        custom: None,
    });
    assert_eq!(resolution.source, "forwardMatrix_blend");
    assert_eq!(resolution.cam_to_xyz, matrix::diagonal([2.0, 2.0, 2.0]));

    let second_only = CaptureMetadata {
        sensor_forward_matrix2: Some(IDENTITY.to_vec()),
        ..Default::default()
    };
    let resolution = resolve_color_matrix(&MatrixInputs {
        metadata: &second_only,
        custom: None,
    });
    assert_eq!(resolution.source, "forwardMatrix2");
}

#[test]
fn test_identity_color_correction_transform_is_skipped() {
    let near_identity = CaptureMetadata {
        color_correction_transform: Some(vec![1.0005, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.9995]),
        ..Default::default()
    };
    let resolution = resolve_color_matrix(&MatrixInputs {
        metadata: &near_identity,
        custom: None,
    });
    assert_eq!(resolution.source, "default_static");
    assert_eq!(resolution.cam_to_xyz, DEFAULT_CAM_TO_XYZ);

    let transform = CaptureMetadata {
        color_correction_transform: Some(matrix::diagonal([1.2, 0.9, 1.1]).to_vec()),
        ..Default::default()
    };
    let resolution = resolve_color_matrix(&MatrixInputs {
        metadata: &transform,
        custom: None,
    });
    assert_eq!(resolution.source, "colorCorrectionTransform");
}

#[test]
fn test_tone_curves() {
    assert_relative_eq!(tone::apply_gamma(0.25, 2.0), 0.5);
    assert_eq!(tone::apply_gamma(1.5, 2.2), 1.0);
    assert_eq!(tone::apply_gamma(0.3, 0.0), 0.3);
    assert_eq!(tone::apply_gamma(-0.3, -1.0), 0.0);
    assert_relative_eq!(tone::srgb_to_linear(0.04), 0.04 / 12.92);
    assert_relative_eq!(tone::srgb_to_linear(1.0), 1.0, epsilon = 1e-12);

    let white = tone::linear_srgb_to_xyz([1.0, 1.0, 1.0]);
    assert_relative_eq!(white[1], 1.0, epsilon = 1e-6);
    assert!(tone::xyz_to_linear_srgb([0.0, 1.0, 0.0]).iter().all(|v| *v >= 0.0));
}
