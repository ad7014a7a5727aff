//! Grid processing for the flood-risk composite.
//!
//! This crate turns raw, independently gridded input rasters into a single
//! risk grid:
//!
//! - **Alignment**: resample DEM and population onto the water-index lattice
//! - **Normalization**: map each layer into [0, 1]
//! - **Fusion**: weighted sum of the normalized layers
//!
//! # Architecture
//!
//! ```text
//! water (reference)   dem        population
//!      │               │              │
//!      │               ▼              ▼
//!      │         align_to_reference (bilinear, zero fill)
//!      │               │              │
//!      ▼               ▼              ▼
//!   (x+1)/2      1 - minmax        minmax
//!      │               │              │
//!      └──────► fuse(0.45, 0.35, 0.20) ◄──┘
//!                      │
//!                      ▼
//!                 risk grid
//! ```
//!
//! # Example
//!
//! ```ignore
//! use grid_processor::{align_to_reference, compute_flood_risk, AlignOptions, FusionWeights};
//!
//! let dem = align_to_reference(&dem_raw, &water.spec, &AlignOptions::default())?;
//! let pop = align_to_reference(&pop_raw, &water.spec, &AlignOptions::default())?;
//! let output = compute_flood_risk(&water, &dem, &pop, &FusionWeights::default())?;
//! ```

pub mod error;
pub mod fusion;
pub mod normalize;
pub mod projection;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{GridProcessorError, Result};
pub use fusion::{compute_flood_risk, fuse, FusionOutput, FusionWeights};
pub use normalize::{
    normalize_elevation, normalize_layer, normalize_min_max, normalize_population,
    normalize_water_index, NormalizedLayer, NORMALIZATION_EPSILON,
};
pub use projection::{align_to_reference, bilinear_interpolate, nearest_interpolate};
pub use types::{AlignOptions, InterpolationMethod, RiskSummary};
