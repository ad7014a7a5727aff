//! Weighted fusion of normalized layers into the composite risk grid.

use flood_common::{LayerKind, RasterGrid};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{GridProcessorError, Result};
use crate::normalize::{normalize_layer, NormalizedLayer};
use crate::types::RiskSummary;

/// Allowed distance of the weight sum from 1.0.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Per-layer weights of the composite index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    pub water: f64,
    pub elevation: f64,
    pub population: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            water: 0.45,
            elevation: 0.35,
            population: 0.20,
        }
    }
}

impl FusionWeights {
    pub fn sum(&self) -> f64 {
        self.water + self.elevation + self.population
    }

    /// Weights must be non-negative and sum to 1 so the composite stays in [0, 1].
    pub fn validate(&self) -> Result<()> {
        for (name, w) in [
            ("water", self.water),
            ("elevation", self.elevation),
            ("population", self.population),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(GridProcessorError::InvalidWeights(format!(
                    "{} weight must be a non-negative number, got {}",
                    name, w
                )));
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(GridProcessorError::InvalidWeights(format!(
                "weights must sum to 1.0, got {}",
                sum
            )));
        }
        Ok(())
    }
}

/// Combine three normalized grids cell by cell.
///
/// The result carries the water grid's metadata. All three inputs must sit on
/// the same pixel lattice.
pub fn fuse(
    water: &RasterGrid,
    elevation: &RasterGrid,
    population: &RasterGrid,
    weights: &FusionWeights,
) -> Result<RasterGrid> {
    weights.validate()?;

    for other in [elevation, population] {
        if !water.spec.same_lattice(&other.spec) {
            return Err(GridProcessorError::shape_mismatch(
                water.spec.shape(),
                other.spec.shape(),
            ));
        }
    }

    let data = water
        .data
        .iter()
        .zip(&elevation.data)
        .zip(&population.data)
        .map(|((&w, &e), &p)| {
            (weights.water * w as f64
                + weights.elevation * e as f64
                + weights.population * p as f64) as f32
        })
        .collect();

    let mut spec = water.spec.clone();
    spec.nodata = None;

    debug!(
        width = spec.width,
        height = spec.height,
        "Fused normalized layers"
    );

    Ok(RasterGrid { spec, data })
}

/// Normalized inputs and the composite they produced.
#[derive(Debug, Clone)]
pub struct FusionOutput {
    pub water: NormalizedLayer,
    pub elevation: NormalizedLayer,
    pub population: NormalizedLayer,
    pub risk: RasterGrid,
    pub summary: RiskSummary,
}

/// Normalize the raw water index and the aligned DEM and population grids,
/// then fuse them.
pub fn compute_flood_risk(
    water_raw: &RasterGrid,
    dem_aligned: &RasterGrid,
    pop_aligned: &RasterGrid,
    weights: &FusionWeights,
) -> Result<FusionOutput> {
    let water = normalize_layer(LayerKind::Water, water_raw)?;
    let elevation = normalize_layer(LayerKind::Elevation, dem_aligned)?;
    let population = normalize_layer(LayerKind::Population, pop_aligned)?;

    let risk = fuse(&water.grid, &elevation.grid, &population.grid, weights)?;
    let summary = RiskSummary::from_values(&risk.data);

    info!(
        min = summary.min,
        max = summary.max,
        mean = summary.mean,
        valid_cells = summary.valid_cells,
        total_cells = summary.total_cells,
        "Computed flood risk index"
    );

    Ok(FusionOutput {
        water,
        elevation,
        population,
        risk,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flood_common::{CrsCode, GeoTransform, GridSpec};

    fn spec(width: usize, height: usize) -> GridSpec {
        GridSpec::new(
            width,
            height,
            GeoTransform::from_origin(-61.8, 12.6, 0.1, 0.1),
            CrsCode::Epsg4326,
        )
    }

    #[test]
    fn test_default_weights() {
        let w = FusionWeights::default();
        assert!((w.sum() - 1.0).abs() < 1e-12);
        assert!(w.validate().is_ok());
    }

    #[test]
    fn test_invalid_weights() {
        let sum_off = FusionWeights {
            water: 0.5,
            elevation: 0.5,
            population: 0.5,
        };
        assert!(matches!(
            sum_off.validate(),
            Err(GridProcessorError::InvalidWeights(_))
        ));

        let negative = FusionWeights {
            water: 1.2,
            elevation: -0.2,
            population: 0.0,
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_fuse_extremes() {
        let ones = RasterGrid::filled(spec(3, 2), 1.0);
        let zeros = RasterGrid::filled(spec(3, 2), 0.0);
        let w = FusionWeights::default();

        let high = fuse(&ones, &ones, &ones, &w).unwrap();
        assert!(high.data.iter().all(|v| (*v - 1.0).abs() < 1e-6));

        let low = fuse(&zeros, &zeros, &zeros, &w).unwrap();
        assert!(low.data.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_fuse_weighted_sum() {
        let water = RasterGrid::filled(spec(2, 2), 1.0);
        let elevation = RasterGrid::filled(spec(2, 2), 0.0);
        let population = RasterGrid::filled(spec(2, 2), 0.5);

        let out = fuse(&water, &elevation, &population, &FusionWeights::default()).unwrap();
        assert!(out.data.iter().all(|v| (*v - 0.55).abs() < 1e-6));
        assert!(out.spec.same_lattice(&water.spec));
    }

    #[test]
    fn test_fuse_rejects_mismatched_lattice() {
        let a = RasterGrid::filled(spec(3, 3), 0.5);
        let b = RasterGrid::filled(spec(3, 4), 0.5);
        assert!(matches!(
            fuse(&a, &a, &b, &FusionWeights::default()),
            Err(GridProcessorError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_fuse_propagates_nan() {
        let water = RasterGrid::new(spec(2, 1), vec![f32::NAN, 1.0]).unwrap();
        let other = RasterGrid::filled(spec(2, 1), 1.0);
        let out = fuse(&water, &other, &other, &FusionWeights::default()).unwrap();
        assert!(out.data[0].is_nan());
        assert!((out.data[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_compute_flood_risk_summary() {
        let water = RasterGrid::filled(spec(4, 4), 0.0);
        let dem = RasterGrid::filled(spec(4, 4), 120.0);
        let pop = RasterGrid::filled(spec(4, 4), 35.0);

        // water 0.5, elevation 1.0, population 0.0
        let out = compute_flood_risk(&water, &dem, &pop, &FusionWeights::default()).unwrap();
        assert_eq!(out.water.kind, LayerKind::Water);
        assert_eq!(out.summary.valid_cells, 16);
        assert!((out.summary.mean - 0.575).abs() < 1e-6);
        assert!(out.risk.data.iter().all(|v| (*v - 0.575).abs() < 1e-6));
    }
}
