//! Error types for roadtruth file formats and rasters

use std::path::PathBuf;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// roadtruth error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A token could not be read as the expected number
    #[error("Invalid token {token:?} on line {line}")]
    Parse {
        /// 1-based line of the offending token
        line: usize,
        /// Raw token text
        token: String,
    },

    /// File ended before a required field
    #[error("Unexpected end of file while reading {0}")]
    UnexpectedEof(&'static str),

    /// Image decode/encode error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Raster does not match the configured canvas
    #[error("Raster is {width}x{height}, canvas is {expected_width}x{expected_height}")]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        width: u32,
        height: u32,
    },

    /// Absolute coordinate maps outside the pixel range
    #[error("Coordinate ({x}, {y}) is out of range for the georeference")]
    CoordinateOutOfRange { x: i64, y: i64 },

    /// Pixel to millimeter scale must be positive
    #[error("Invalid georeference scale: {0}")]
    InvalidScale(i64),

    /// Canvas or detection raster missing
    #[error("Evaluator not ready: {0}")]
    NotConfigured(&'static str),

    /// Road set manifest could not be opened
    #[error("Cannot open road set {path:?}")]
    MissingRoadSet {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}
