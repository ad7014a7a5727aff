//! Error types for rendering.

use flood_common::FloodError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    /// PNG or HTML encoding failed.
    #[error("encoding error: {0}")]
    Encode(String),

    /// A layer has no pixels, or its buffer does not match its dimensions.
    #[error("empty or malformed layer: {0}")]
    EmptyLayer(String),
}

impl From<RenderError> for FloodError {
    fn from(err: RenderError) -> Self {
        FloodError::Render(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
