//! Common types shared across the flood-risk workspace.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod grid;
pub mod layer;

pub use bbox::{AreaOfInterest, BoundingBox};
pub use crs::CrsCode;
pub use error::{FloodError, FloodResult};
pub use grid::{GeoTransform, GridSpec, RasterGrid};
pub use layer::LayerKind;
