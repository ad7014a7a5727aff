//! Per-layer normalization into [0, 1].
//!
//! The water index is bounded by construction, so it uses the fixed map
//! `(x + 1) / 2`. Elevation and population use their own observed range.
//! Elevation is inverted so low-lying cells score high. NaN cells stay NaN.

use flood_common::{LayerKind, RasterGrid};
use tracing::debug;

use crate::error::{GridProcessorError, Result};

/// Added to the min-max denominator so constant grids do not divide by zero.
pub const NORMALIZATION_EPSILON: f64 = 1e-6;

/// A layer after mapping into [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedLayer {
    pub kind: LayerKind,
    pub grid: RasterGrid,
}

fn map_grid(grid: &RasterGrid, f: impl Fn(f64) -> f64) -> RasterGrid {
    let mut spec = grid.spec.clone();
    spec.nodata = None;

    let data = grid
        .data
        .iter()
        .map(|&v| {
            if grid.is_valid(v) {
                f(v as f64).clamp(0.0, 1.0) as f32
            } else {
                f32::NAN
            }
        })
        .collect();

    RasterGrid { spec, data }
}

/// Water index: `clip((x + 1) / 2, 0, 1)`.
pub fn normalize_water_index(grid: &RasterGrid) -> RasterGrid {
    map_grid(grid, |x| (x + 1.0) / 2.0)
}

/// Min-max scaling with the epsilon-guarded denominator, clipped to [0, 1].
pub fn normalize_min_max(grid: &RasterGrid) -> Result<RasterGrid> {
    let (min, max) = grid
        .min_max()
        .ok_or_else(|| GridProcessorError::normalization("grid has no valid cells"))?;
    let (min, max) = (min as f64, max as f64);
    let denominator = max - min + NORMALIZATION_EPSILON;

    debug!(min, max, "Min-max normalizing grid");

    Ok(map_grid(grid, |x| (x - min) / denominator))
}

/// Elevation: min-max scaled then inverted so lower ground maps higher.
pub fn normalize_elevation(grid: &RasterGrid) -> Result<RasterGrid> {
    let mut scaled = normalize_min_max(grid)?;
    for v in scaled.data.iter_mut() {
        *v = (1.0 - *v).clamp(0.0, 1.0);
    }
    Ok(scaled)
}

/// Population: min-max scaled.
pub fn normalize_population(grid: &RasterGrid) -> Result<RasterGrid> {
    normalize_min_max(grid)
}

/// Normalize a raw input layer according to its kind.
pub fn normalize_layer(kind: LayerKind, grid: &RasterGrid) -> Result<NormalizedLayer> {
    let grid = match kind {
        LayerKind::Water => normalize_water_index(grid),
        LayerKind::Elevation => normalize_elevation(grid)?,
        LayerKind::Population => normalize_population(grid)?,
        LayerKind::Risk => {
            return Err(GridProcessorError::normalization(
                "the composite risk grid is already normalized",
            ))
        }
    };
    Ok(NormalizedLayer { kind, grid })
}
