//! Common grid fixtures for flood-risk tests.
//!
//! Lattices over the default area of interest (Grenada, lon -61.8..-61.3,
//! lat 12.0..12.6) at the resolutions the input layers arrive in.

use flood_common::{CrsCode, GeoTransform, GridSpec};

/// Western edge of the default area.
pub const AOI_WEST: f64 = -61.8;
/// Northern edge of the default area.
pub const AOI_NORTH: f64 = 12.6;
/// AOI width in degrees.
pub const AOI_WIDTH_DEG: f64 = 0.5;
/// AOI height in degrees.
pub const AOI_HEIGHT_DEG: f64 = 0.6;

/// A north-up EPSG:4326 lattice covering the default area with
/// `width` x `height` pixels.
pub fn aoi_spec(width: usize, height: usize) -> GridSpec {
    GridSpec::new(
        width,
        height,
        GeoTransform::from_origin(
            AOI_WEST,
            AOI_NORTH,
            AOI_WIDTH_DEG / width as f64,
            AOI_HEIGHT_DEG / height as f64,
        ),
        CrsCode::Epsg4326,
    )
}

/// Reference lattice, like the water index at its coarse acquisition scale.
pub fn reference_spec() -> GridSpec {
    aoi_spec(10, 12)
}

/// Finer lattice, like the DEM.
pub fn fine_spec() -> GridSpec {
    aoi_spec(25, 30)
}

/// Coarser lattice, like the population grid.
pub fn coarse_spec() -> GridSpec {
    aoi_spec(5, 6)
}

/// A north-up lattice anchored at `(0, height * res)` with square pixels.
pub fn unit_spec(width: usize, height: usize, res: f64) -> GridSpec {
    GridSpec::new(
        width,
        height,
        GeoTransform::from_origin(0.0, height as f64 * res, res, res),
        CrsCode::Epsg4326,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aoi_spec_covers_area() {
        let bounds = reference_spec().bounds();
        assert!((bounds.min_x - AOI_WEST).abs() < 1e-9);
        assert!((bounds.max_y - AOI_NORTH).abs() < 1e-9);
        assert!((bounds.max_x + 61.3).abs() < 1e-9);
        assert!((bounds.min_y - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_fixture_resolutions_differ() {
        assert!(!reference_spec().same_lattice(&fine_spec()));
        assert!(!reference_spec().same_lattice(&coarse_spec()));
        assert_eq!(fine_spec().bounds(), reference_spec().bounds());
    }
}
