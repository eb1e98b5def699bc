//! Colorimetry module
//!
//! Matrix algebra, white-balance and camera-matrix resolution, and the tone
//! curves shared by the RAW and JPEG paths.

pub mod cct;
pub mod color_matrix;
pub mod matrix;
pub mod tone;
pub mod white_balance;

#[cfg(test)]
mod tests;

pub use color_matrix::{ColorMatrixResolution, MatrixInputs, resolve_color_matrix};
pub use matrix::Mat3;
pub use white_balance::resolve_white_balance;
