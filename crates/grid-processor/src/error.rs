//! Error types for grid processing.

use flood_common::FloodError;
use thiserror::Error;

/// Errors that can occur during alignment, normalization or fusion.
#[derive(Error, Debug)]
pub enum GridProcessorError {
    /// The source grid could not be resampled onto the target lattice.
    #[error("alignment error: {0}")]
    Alignment(String),

    /// A layer could not be mapped into [0, 1].
    #[error("normalization error: {0}")]
    Normalization(String),

    /// Inputs to fusion do not share one pixel lattice.
    #[error("grid shape mismatch: {left} vs {right}")]
    ShapeMismatch { left: String, right: String },

    /// Fusion weights are not a convex combination.
    #[error("invalid fusion weights: {0}")]
    InvalidWeights(String),

    /// Grid metadata is unusable.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),
}

impl GridProcessorError {
    /// Create an Alignment error.
    pub fn alignment(msg: impl Into<String>) -> Self {
        Self::Alignment(msg.into())
    }

    /// Create a Normalization error.
    pub fn normalization(msg: impl Into<String>) -> Self {
        Self::Normalization(msg.into())
    }

    /// Create a ShapeMismatch error from two (height, width) shapes.
    pub fn shape_mismatch(left: (usize, usize), right: (usize, usize)) -> Self {
        Self::ShapeMismatch {
            left: format!("{:?}", left),
            right: format!("{:?}", right),
        }
    }
}

impl From<FloodError> for GridProcessorError {
    fn from(err: FloodError) -> Self {
        Self::InvalidGrid(err.to_string())
    }
}

impl From<GridProcessorError> for FloodError {
    fn from(err: GridProcessorError) -> Self {
        match err {
            GridProcessorError::Alignment(msg) => FloodError::Alignment(msg),
            other => FloodError::Fusion(other.to_string()),
        }
    }
}

/// Result type for grid processor operations.
pub type Result<T> = std::result::Result<T, GridProcessorError>;
