//! Georeferenced raster grids.

use crate::{BoundingBox, CrsCode, FloodError, FloodResult};
use serde::{Deserialize, Serialize};

/// Tolerance used when comparing two geotransforms for lattice identity.
const TRANSFORM_TOLERANCE: f64 = 1e-9;

/// Affine pixel-to-world transform.
///
/// Uses the rasterio coefficient order:
///
/// ```text
/// x = a * col + b * row + c
/// y = d * col + e * row + f
/// ```
///
/// `(col, row)` are pixel-edge coordinates, so `(0, 0)` is the outer corner
/// of the first pixel and `(0.5, 0.5)` its center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl GeoTransform {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// North-up transform anchored at the upper-left corner.
    ///
    /// `x_res` and `y_res` are positive pixel sizes.
    pub fn from_origin(west: f64, north: f64, x_res: f64, y_res: f64) -> Self {
        Self::new(x_res, 0.0, west, 0.0, -y_res, north)
    }

    /// Map pixel coordinates to world coordinates.
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }

    /// World coordinates of a pixel center.
    pub fn pixel_center(&self, col: usize, row: usize) -> (f64, f64) {
        self.apply(col as f64 + 0.5, row as f64 + 0.5)
    }

    fn determinant(&self) -> f64 {
        self.a * self.e - self.b * self.d
    }

    /// Inverse transform (world to pixel).
    pub fn inverse(&self) -> FloodResult<GeoTransform> {
        let det = self.determinant();
        if det.abs() < f64::EPSILON || !det.is_finite() {
            return Err(FloodError::InvalidGrid(format!(
                "geotransform is not invertible (determinant {})",
                det
            )));
        }

        let ia = self.e / det;
        let ib = -self.b / det;
        let id = -self.d / det;
        let ie = self.a / det;

        Ok(GeoTransform {
            a: ia,
            b: ib,
            c: -(ia * self.c + ib * self.f),
            d: id,
            e: ie,
            f: -(id * self.c + ie * self.f),
        })
    }

    /// True when the grid has no rotation/shear and rows run north to south.
    pub fn is_north_up(&self) -> bool {
        self.b == 0.0 && self.d == 0.0 && self.a > 0.0 && self.e < 0.0
    }

    /// Pixel size as positive (x, y) extents.
    pub fn pixel_size(&self) -> (f64, f64) {
        (
            (self.a * self.a + self.d * self.d).sqrt(),
            (self.b * self.b + self.e * self.e).sqrt(),
        )
    }

    /// World-space envelope of a `width` x `height` raster.
    pub fn bounds(&self, width: usize, height: usize) -> BoundingBox {
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(width as f64, 0.0),
            self.apply(0.0, height as f64),
            self.apply(width as f64, height as f64),
        ];

        let mut bbox = BoundingBox::new(
            f64::INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
        );
        for (x, y) in corners {
            bbox.min_x = bbox.min_x.min(x);
            bbox.min_y = bbox.min_y.min(y);
            bbox.max_x = bbox.max_x.max(x);
            bbox.max_y = bbox.max_y.max(y);
        }
        bbox
    }

    fn approx_eq(&self, other: &GeoTransform) -> bool {
        let pairs = [
            (self.a, other.a),
            (self.b, other.b),
            (self.c, other.c),
            (self.d, other.d),
            (self.e, other.e),
            (self.f, other.f),
        ];
        pairs
            .iter()
            .all(|(x, y)| (x - y).abs() <= TRANSFORM_TOLERANCE)
    }
}

/// Raster metadata: the pixel lattice and how it maps onto the earth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
    /// Pixel-to-world affine transform
    pub transform: GeoTransform,
    /// Coordinate reference system of the world coordinates
    pub crs: CrsCode,
    /// Sentinel that marks missing cells, if the source declared one
    pub nodata: Option<f64>,
}

impl GridSpec {
    pub fn new(width: usize, height: usize, transform: GeoTransform, crs: CrsCode) -> Self {
        Self {
            width,
            height,
            transform,
            crs,
            nodata: None,
        }
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Check if grid is empty.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// (height, width), the array shape.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// World-space envelope.
    pub fn bounds(&self) -> BoundingBox {
        self.transform.bounds(self.width, self.height)
    }

    /// True when both specs describe the same pixel lattice.
    ///
    /// No-data declarations are not compared.
    pub fn same_lattice(&self, other: &GridSpec) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.crs == other.crs
            && self.transform.approx_eq(&other.transform)
    }
}

/// A single-band raster: metadata plus row-major samples, north row first.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterGrid {
    pub spec: GridSpec,
    pub data: Vec<f32>,
}

impl RasterGrid {
    /// Create a raster, checking that the sample count matches the lattice.
    pub fn new(spec: GridSpec, data: Vec<f32>) -> FloodResult<Self> {
        if data.len() != spec.len() {
            return Err(FloodError::InvalidGrid(format!(
                "expected {} samples for a {}x{} grid, got {}",
                spec.len(),
                spec.width,
                spec.height,
                data.len()
            )));
        }
        Ok(Self { spec, data })
    }

    /// A raster with every cell set to `value`.
    pub fn filled(spec: GridSpec, value: f32) -> Self {
        let data = vec![value; spec.len()];
        Self { spec, data }
    }

    pub fn width(&self) -> usize {
        self.spec.width
    }

    pub fn height(&self) -> usize {
        self.spec.height
    }

    /// Sample at (row, col), `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.spec.height || col >= self.spec.width {
            return None;
        }
        self.data.get(row * self.spec.width + col).copied()
    }

    /// True for cells that carry data (finite and not the no-data sentinel).
    pub fn is_valid(&self, value: f32) -> bool {
        value.is_finite()
            && self
                .spec
                .nodata
                .map_or(true, |nodata| (value as f64 - nodata).abs() > f64::EPSILON)
    }

    /// Minimum and maximum over valid cells, `None` if there are none.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let mut iter = self.data.iter().copied().filter(|v| self.is_valid(*v));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    /// Number of valid cells.
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| self.is_valid(**v)).count()
    }

    /// Replace no-data sentinels with NaN and drop the declaration.
    pub fn mask_nodata(mut self) -> Self {
        if let Some(nodata) = self.spec.nodata.take() {
            for v in self.data.iter_mut() {
                if (*v as f64 - nodata).abs() <= f64::EPSILON {
                    *v = f32::NAN;
                }
            }
        }
        self
    }
}
