//! Error types for the flood-risk pipeline.

use thiserror::Error;

/// Result type alias using FloodError.
pub type FloodResult<T> = Result<T, FloodError>;

/// Top-level error categories. Any of them aborts the run.
#[derive(Debug, Error)]
pub enum FloodError {
    // === Stage Errors ===
    #[error("Acquisition failed for {layer}: {message}")]
    Acquisition { layer: String, message: String },

    #[error("Alignment failed: {0}")]
    Alignment(String),

    #[error("Fusion failed: {0}")]
    Fusion(String),

    #[error("Rendering failed: {0}")]
    Render(String),

    // === Data Errors ===
    #[error("Raster I/O error: {0}")]
    RasterIo(String),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Invalid CRS: {0}")]
    Crs(String),

    // === Setup Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FloodError {
    /// Create an Acquisition error for a named layer.
    pub fn acquisition(layer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Acquisition {
            layer: layer.into(),
            message: message.into(),
        }
    }

    /// Short stage name used in log fields.
    pub fn stage(&self) -> &'static str {
        match self {
            FloodError::Acquisition { .. } => "acquisition",
            FloodError::Alignment(_) => "alignment",
            FloodError::Fusion(_) | FloodError::InvalidGrid(_) => "fusion",
            FloodError::Render(_) => "render",
            FloodError::RasterIo(_) | FloodError::Io(_) => "io",
            FloodError::Crs(_) => "crs",
            FloodError::Config(_) => "config",
        }
    }
}

impl From<crate::crs::CrsParseError> for FloodError {
    fn from(err: crate::crs::CrsParseError) -> Self {
        FloodError::Crs(err.to_string())
    }
}

impl From<serde_json::Error> for FloodError {
    fn from(err: serde_json::Error) -> Self {
        FloodError::Config(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        assert_eq!(FloodError::acquisition("NDWI", "timeout").stage(), "acquisition");
        assert_eq!(FloodError::Alignment("x".into()).stage(), "alignment");
        assert_eq!(FloodError::Render("x".into()).stage(), "render");
    }

    #[test]
    fn test_acquisition_message() {
        let err = FloodError::acquisition("DEM", "HTTP 503");
        assert_eq!(err.to_string(), "Acquisition failed for DEM: HTTP 503");
    }
}
