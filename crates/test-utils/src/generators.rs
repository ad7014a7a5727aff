//! Test data generators for synthetic rasters.
//!
//! These generators create predictable, verifiable patterns that can be
//! used across the test suite.

use flood_common::{GridSpec, RasterGrid};

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0); // col=1, row=0
/// assert_eq!(grid[10], 1.0);   // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Every cell set to `value`.
pub fn uniform_raster(spec: GridSpec, value: f32) -> RasterGrid {
    RasterGrid::filled(spec, value)
}

/// Values rise linearly from `start` in the first pixel to `end` in the last
/// pixel, in row-major order.
pub fn gradient_raster(spec: GridSpec, start: f32, end: f32) -> RasterGrid {
    let n = spec.len();
    let step = if n > 1 {
        (end - start) / (n - 1) as f32
    } else {
        0.0
    };
    let data = (0..n).map(|i| start + step * i as f32).collect();
    RasterGrid { spec, data }
}

/// Elevation-like surface: sea level along the western edge rising to
/// `peak` at the eastern edge.
pub fn elevation_raster(spec: GridSpec, peak: f32) -> RasterGrid {
    let width = spec.width;
    let denom = width.saturating_sub(1).max(1) as f32;
    let data = (0..spec.len())
        .map(|i| peak * (i % width) as f32 / denom)
        .collect();
    RasterGrid { spec, data }
}

/// Water-index-like surface in [-1, 1]: wet (positive) in the southern half,
/// dry (negative) in the northern half.
pub fn water_index_raster(spec: GridSpec) -> RasterGrid {
    let (width, height) = (spec.width, spec.height);
    let data = (0..spec.len())
        .map(|i| if (i / width) * 2 >= height { 0.6 } else { -0.4 })
        .collect();
    RasterGrid { spec, data }
}

/// A raster with NaN at the given (row, col) positions and `value` elsewhere.
pub fn raster_with_nans(spec: GridSpec, value: f32, nan_cells: &[(usize, usize)]) -> RasterGrid {
    let width = spec.width;
    let mut grid = RasterGrid::filled(spec, value);
    for &(row, col) in nan_cells {
        if let Some(v) = grid.data.get_mut(row * width + col) {
            *v = f32::NAN;
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::unit_spec;

    #[test]
    fn test_create_test_grid() {
        let grid = create_test_grid(3, 2);
        assert_eq!(grid, vec![0.0, 1000.0, 2000.0, 1.0, 1001.0, 2001.0]);
    }

    #[test]
    fn test_gradient_endpoints() {
        let grid = gradient_raster(unit_spec(4, 2, 1.0), 0.0, 7.0);
        assert_eq!(grid.data.first(), Some(&0.0));
        assert_eq!(grid.data.last(), Some(&7.0));
    }

    #[test]
    fn test_elevation_west_to_east() {
        let grid = elevation_raster(unit_spec(5, 2, 1.0), 100.0);
        assert_eq!(grid.get(0, 0), Some(0.0));
        assert_eq!(grid.get(1, 4), Some(100.0));
    }

    #[test]
    fn test_water_index_halves() {
        let grid = water_index_raster(unit_spec(2, 4, 1.0));
        assert_eq!(grid.get(0, 0), Some(-0.4));
        assert_eq!(grid.get(3, 1), Some(0.6));
    }

    #[test]
    fn test_raster_with_nans() {
        let grid = raster_with_nans(unit_spec(3, 3, 1.0), 1.0, &[(1, 1), (9, 9)]);
        assert!(grid.data[4].is_nan());
        assert_eq!(grid.valid_count(), 8);
    }
}
