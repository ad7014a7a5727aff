//! Point samplers used when aligning rasters.
//!
//! Coordinates are fractional pixel positions in the source grid where
//! integer values land on pixel centers: `(0.0, 0.0)` is the center of the
//! first pixel and `(-0.5, -0.5)` its outer corner. Positions past the edge
//! centers clamp to the edge pixels.

/// Clamp a (possibly negative) index into `0..len`.
#[inline]
fn clamp_index(i: i64, len: usize) -> usize {
    i.clamp(0, len as i64 - 1) as usize
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Value of the pixel whose center is closest to `(x, y)`.
pub fn nearest_interpolate(
    data: &[f32],
    width: usize,
    height: usize,
    x: f64,
    y: f64,
) -> f32 {
    if width == 0 || height == 0 || !x.is_finite() || !y.is_finite() {
        return f32::NAN;
    }

    let col = clamp_index(x.round() as i64, width);
    let row = clamp_index(y.round() as i64, height);

    data[row * width + col]
}

/// Weighted mean of the four pixel centers around `(x, y)`.
///
/// A NaN at any of the four corners makes the result NaN.
pub fn bilinear_interpolate(
    data: &[f32],
    width: usize,
    height: usize,
    x: f64,
    y: f64,
) -> f32 {
    if width == 0 || height == 0 || !x.is_finite() || !y.is_finite() {
        return f32::NAN;
    }

    let x_floor = x.floor();
    let y_floor = y.floor();

    let x0 = clamp_index(x_floor as i64, width);
    let y0 = clamp_index(y_floor as i64, height);
    let x1 = clamp_index(x_floor as i64 + 1, width);
    let y1 = clamp_index(y_floor as i64 + 1, height);

    let xf = (x - x_floor) as f32;
    let yf = (y - y_floor) as f32;

    let at = |col: usize, row: usize| data[row * width + col];
    let (nw, ne, sw, se) = (at(x0, y0), at(x1, y0), at(x0, y1), at(x1, y1));
    if [nw, ne, sw, se].iter().any(|v| v.is_nan()) {
        return f32::NAN;
    }

    lerp(lerp(nw, ne, xf), lerp(sw, se, xf), yf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_interpolate() {
        let data: Vec<f32> = vec![
            1.0, 2.0, 3.0,
            4.0, 5.0, 6.0,
            7.0, 8.0, 9.0,
        ];

        assert_eq!(nearest_interpolate(&data, 3, 3, 0.0, 0.0), 1.0);
        assert_eq!(nearest_interpolate(&data, 3, 3, 1.0, 1.0), 5.0);
        assert_eq!(nearest_interpolate(&data, 3, 3, 0.4, 0.4), 1.0);
        assert_eq!(nearest_interpolate(&data, 3, 3, 0.6, 0.6), 5.0);
        // Outer corner clamps to the edge pixel
        assert_eq!(nearest_interpolate(&data, 3, 3, -0.5, -0.5), 1.0);
    }

    #[test]
    fn test_bilinear_interpolate() {
        let data: Vec<f32> = vec![
            1.0, 2.0,
            3.0, 4.0,
        ];

        // On the pixel centers
        assert_eq!(bilinear_interpolate(&data, 2, 2, 0.0, 0.0), 1.0);
        assert_eq!(bilinear_interpolate(&data, 2, 2, 1.0, 0.0), 2.0);
        assert_eq!(bilinear_interpolate(&data, 2, 2, 0.0, 1.0), 3.0);
        assert_eq!(bilinear_interpolate(&data, 2, 2, 1.0, 1.0), 4.0);

        // Midway between all four
        let center = bilinear_interpolate(&data, 2, 2, 0.5, 0.5);
        assert!((center - 2.5).abs() < 0.001);
    }

    #[test]
    fn test_bilinear_clamps_at_edges() {
        let data: Vec<f32> = vec![
            1.0, 2.0,
            3.0, 4.0,
        ];

        // Half a pixel outside the first center replicates the edge
        assert_eq!(bilinear_interpolate(&data, 2, 2, -0.5, 0.0), 1.0);
        assert_eq!(bilinear_interpolate(&data, 2, 2, 1.5, 1.0), 4.0);
        let edge = bilinear_interpolate(&data, 2, 2, -0.25, 0.5);
        assert!((edge - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_bilinear_with_nan() {
        let data: Vec<f32> = vec![
            1.0, f32::NAN,
            3.0, 4.0,
        ];

        let result = bilinear_interpolate(&data, 2, 2, 0.5, 0.5);
        assert!(result.is_nan());
    }

    #[test]
    fn test_single_pixel_grid() {
        let data = vec![7.0f32];
        assert_eq!(bilinear_interpolate(&data, 1, 1, 0.3, -0.2), 7.0);
        assert_eq!(nearest_interpolate(&data, 1, 1, 0.3, -0.2), 7.0);
    }
}
