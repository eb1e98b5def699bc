//! Tone curves and the fixed XYZ / sRGB conversions

use image::{Rgb, RgbImage};

use crate::image_pipeline::color::matrix::{self, Mat3};

pub const DEFAULT_GAMMA: f64 = 2.2;

/// CIE XYZ (D65) to linear sRGB, as used by the preview path.
pub const XYZ_TO_LINEAR_SRGB: Mat3 = [
    3.2406, -1.5372, -0.4986, //
    -0.9689, 1.8758, 0.0415, //
    0.0557, -0.2040, 1.0570,
];

/// Linear sRGB to CIE XYZ (D65), as used by the JPEG reference path.
pub const LINEAR_SRGB_TO_XYZ: Mat3 = [
    0.4124564, 0.3575761, 0.1804375, //
    0.2126729, 0.7151522, 0.0721750, //
    0.0193339, 0.1191920, 0.9503041,
];

/// Linear sRGB with negative components clamped to zero.
pub fn xyz_to_linear_srgb(xyz: [f64; 3]) -> [f64; 3] {
    matrix::multiply_vector(&XYZ_TO_LINEAR_SRGB, xyz).map(|v| v.max(0.0))
}

pub fn linear_srgb_to_xyz(rgb: [f64; 3]) -> [f64; 3] {
    matrix::multiply_vector(&LINEAR_SRGB_TO_XYZ, rgb)
}

/// Pure power-law preview curve. Non-positive gamma only clamps.
pub fn apply_gamma(value: f64, gamma: f64) -> f64 {
    let clamped = value.clamp(0.0, 1.0);
    if gamma <= 0.0 {
        return clamped;
    }
    clamped.powf(1.0 / gamma)
}

/// Piecewise IEC 61966-2-1 decode.
pub fn srgb_to_linear(value: f64) -> f64 {
    if value <= 0.04045 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

pub fn to_rgb8(rgb: [f64; 3]) -> Rgb<u8> {
    Rgb(rgb.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8))
}

/// Image of the given size filled with one color. Zero dimensions are raised to one.
pub fn solid_image(width: u32, height: u32, rgb: [f64; 3]) -> RgbImage {
    RgbImage::from_pixel(width.max(1), height.max(1), to_rgb8(rgb))
}
