use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoiError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid ROI geometry: {0}")]
    InvalidGeometry(String),

    #[error("Missing RAW stride metadata: rowStride={row_stride}, pixelStride={pixel_stride}")]
    MissingStrideMetadata { row_stride: i64, pixel_stride: i64 },

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    #[error("Invalid debug bundle: {0}")]
    InvalidBundle(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RoiError>;
