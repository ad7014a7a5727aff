//! Error types for GeoTIFF I/O.

use flood_common::FloodError;
use thiserror::Error;

/// Errors that can occur while reading or writing GeoTIFFs.
#[derive(Error, Debug)]
pub enum GeoTiffError {
    /// Underlying file error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The TIFF structure could not be decoded.
    #[error("TIFF decoding error: {0}")]
    Decode(String),

    /// The TIFF could not be encoded.
    #[error("TIFF encoding error: {0}")]
    Encode(String),

    /// Neither tiepoint/scale nor a model transformation is present.
    #[error("missing georeferencing: {0}")]
    MissingGeoreference(String),

    /// The GeoKey directory names a CRS the pipeline cannot handle.
    #[error("unsupported CRS: {0}")]
    UnsupportedCrs(String),

    /// Pixel layout the reader does not support.
    #[error("unsupported pixel format: {0}")]
    UnsupportedFormat(String),

    /// Decoded sample count does not match the declared dimensions.
    #[error("invalid raster: {0}")]
    InvalidRaster(String),
}

impl From<tiff::TiffError> for GeoTiffError {
    fn from(err: tiff::TiffError) -> Self {
        GeoTiffError::Decode(err.to_string())
    }
}

impl From<GeoTiffError> for FloodError {
    fn from(err: GeoTiffError) -> Self {
        FloodError::RasterIo(err.to_string())
    }
}

/// Result type for GeoTIFF operations.
pub type Result<T> = std::result::Result<T, GeoTiffError>;
