//! Flood-risk batch pipeline.
//!
//! Acquires a water index, an elevation model and a population grid for an
//! area of interest, fuses them into a weighted flood-risk index and renders
//! an interactive map.

pub mod acquisition;
pub mod config;
pub mod pipeline;

pub use acquisition::{EarthEngineSource, LocalDirectorySource, RasterSource};
pub use config::{LayerSpec, OutputLayout, PipelineConfig};
pub use pipeline::{Pipeline, PipelineReport};
