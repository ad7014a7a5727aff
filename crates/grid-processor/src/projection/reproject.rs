//! Alignment of a source raster onto a reference pixel lattice.
//!
//! Every destination pixel center is pushed through the destination affine
//! transform into world coordinates, converted into the source CRS, and
//! pulled back through the inverse source transform to a fractional source
//! pixel. The value there is interpolated from the source samples.

use flood_common::{GridSpec, RasterGrid};
use tracing::debug;

use super::{bilinear_interpolate, nearest_interpolate};
use crate::error::{GridProcessorError, Result};
use crate::types::{AlignOptions, InterpolationMethod};

/// Resample `source` onto the exact lattice of `target`.
///
/// The output always has `target`'s width, height, transform and CRS.
/// Destination pixels whose center maps outside the source raster receive
/// `opts.fill`. NaN and no-data source samples become NaN in the pixels that
/// touch them, and the output declares no no-data value.
///
/// # Errors
/// * The source or target grid is empty
/// * The source transform cannot be inverted
pub fn align_to_reference(
    source: &RasterGrid,
    target: &GridSpec,
    opts: &AlignOptions,
) -> Result<RasterGrid> {
    if source.spec.is_empty() {
        return Err(GridProcessorError::alignment("source grid is empty"));
    }
    if target.is_empty() {
        return Err(GridProcessorError::alignment("reference grid is empty"));
    }

    // Declared no-data cells become NaN so they propagate instead of blending
    let masked;
    let source = if source.spec.nodata.is_some() {
        masked = source.clone().mask_nodata();
        &masked
    } else {
        source
    };

    let src_width = source.width();
    let src_height = source.height();
    let src_inverse = source
        .spec
        .transform
        .inverse()
        .map_err(|e| GridProcessorError::alignment(e.to_string()))?;

    if source.spec.same_lattice(target) {
        debug!("Source already on reference lattice, copying");
        let mut spec = target.clone();
        spec.nodata = None;
        return Ok(RasterGrid {
            spec,
            data: source.data.clone(),
        });
    }

    let mut output = vec![opts.fill; target.len()];
    let mut covered = 0usize;

    for row in 0..target.height {
        for col in 0..target.width {
            let (x, y) = target.transform.pixel_center(col, row);
            let (sx, sy) = target.crs.transform_point(source.spec.crs, x, y);

            // Pixel-edge coordinates in the source raster
            let (u, v) = src_inverse.apply(sx, sy);
            if !(u >= 0.0 && u < src_width as f64 && v >= 0.0 && v < src_height as f64) {
                continue;
            }

            // Shift to pixel-center coordinates for sampling
            let (px, py) = (u - 0.5, v - 0.5);
            output[row * target.width + col] = match opts.method {
                InterpolationMethod::Bilinear => {
                    bilinear_interpolate(&source.data, src_width, src_height, px, py)
                }
                InterpolationMethod::Nearest => {
                    nearest_interpolate(&source.data, src_width, src_height, px, py)
                }
            };
            covered += 1;
        }
    }

    debug!(
        src_width,
        src_height,
        dst_width = target.width,
        dst_height = target.height,
        method = %opts.method,
        covered,
        filled = target.len() - covered,
        "Aligned raster to reference grid"
    );

    let mut spec = target.clone();
    spec.nodata = None;
    Ok(RasterGrid { spec, data: output })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flood_common::{CrsCode, GeoTransform};

    fn grid(width: usize, height: usize, res: f64, data: Vec<f32>) -> RasterGrid {
        let spec = GridSpec::new(
            width,
            height,
            GeoTransform::from_origin(0.0, height as f64 * res, res, res),
            CrsCode::Epsg4326,
        );
        RasterGrid::new(spec, data).unwrap()
    }

    #[test]
    fn test_identical_lattice_is_copy() {
        let src = grid(3, 2, 1.0, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let out = align_to_reference(&src, &src.spec, &AlignOptions::default()).unwrap();
        assert_eq!(out.data, src.data);
        assert!(out.spec.same_lattice(&src.spec));
    }

    #[test]
    fn test_downsample_by_two_averages_blocks() {
        // 4x4 source at 1.0, 2x2 target at 2.0 over the same extent:
        // each target center sits on the corner shared by four source pixels.
        let src = grid(4, 4, 1.0, (0..16).map(|i| i as f32).collect());
        let target = grid(2, 2, 2.0, vec![0.0; 4]).spec;

        let out = align_to_reference(&src, &target, &AlignOptions::default()).unwrap();
        assert_eq!(out.data.len(), 4);
        assert!((out.data[0] - 2.5).abs() < 1e-5);
        assert!((out.data[1] - 4.5).abs() < 1e-5);
        assert!((out.data[2] - 10.5).abs() < 1e-5);
        assert!((out.data[3] - 12.5).abs() < 1e-5);
    }

    #[test]
    fn test_uncovered_pixels_get_fill() {
        // Source covers x in [0, 2); target spans x in [0, 4)
        let src = grid(2, 2, 1.0, vec![5.0; 4]);
        let target = grid(4, 2, 1.0, vec![0.0; 8]).spec;

        let opts = AlignOptions {
            fill: -1.0,
            ..AlignOptions::default()
        };
        let out = align_to_reference(&src, &target, &opts).unwrap();
        assert_eq!(out.data, vec![5.0, 5.0, -1.0, -1.0, 5.0, 5.0, -1.0, -1.0]);
    }

    #[test]
    fn test_nearest_method() {
        let src = grid(2, 2, 1.0, vec![1.0, 2.0, 3.0, 4.0]);
        let target = grid(4, 4, 0.5, vec![0.0; 16]).spec;
        let opts = AlignOptions {
            method: InterpolationMethod::Nearest,
            ..AlignOptions::default()
        };

        let out = align_to_reference(&src, &target, &opts).unwrap();
        assert_eq!(out.data[0], 1.0);
        assert_eq!(out.data[3], 2.0);
        assert_eq!(out.data[12], 3.0);
        assert_eq!(out.data[15], 4.0);
    }

    #[test]
    fn test_nodata_on_identical_lattice_becomes_nan() {
        let mut src = grid(2, 2, 1.0, vec![10.0, 20.0, -9999.0, 40.0]);
        src.spec.nodata = Some(-9999.0);

        let out = align_to_reference(&src, &src.spec, &AlignOptions::default()).unwrap();
        assert_eq!(out.spec.nodata, None);
        assert_eq!(out.data[0], 10.0);
        assert!(out.data[2].is_nan());
        assert_eq!(out.data[3], 40.0);
    }

    #[test]
    fn test_nodata_is_not_blended() {
        let mut src = grid(2, 3, 1.0, vec![10.0, 20.0, 30.0, 40.0, -9999.0, 60.0]);
        src.spec.nodata = Some(-9999.0);
        // Half a pixel east: the east column falls outside the source
        let target = GridSpec::new(
            2,
            3,
            GeoTransform::from_origin(0.5, 3.0, 1.0, 1.0),
            CrsCode::Epsg4326,
        );

        let out = align_to_reference(&src, &target, &AlignOptions::default()).unwrap();
        assert_eq!(out.spec.nodata, None);
        assert!((out.data[0] - 15.0).abs() < 1e-5);
        assert!(out.data[2].is_nan());
        assert!(out.data[4].is_nan());
        for col1 in [out.data[1], out.data[3], out.data[5]] {
            assert_eq!(col1, 0.0);
        }
    }

    #[test]
    fn test_singular_source_transform_fails() {
        let spec = GridSpec::new(
            2,
            2,
            GeoTransform::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0),
            CrsCode::Epsg4326,
        );
        let src = RasterGrid::filled(spec, 1.0);
        let target = grid(2, 2, 1.0, vec![0.0; 4]).spec;
        assert!(matches!(
            align_to_reference(&src, &target, &AlignOptions::default()),
            Err(GridProcessorError::Alignment(_))
        ));
    }

    #[test]
    fn test_mercator_source_onto_geographic_target() {
        // Source in EPSG:3857 covering roughly the target area
        let (west, north) = CrsCode::Epsg4326.transform_point(CrsCode::Epsg3857, -62.0, 13.0);
        let (east, south) = CrsCode::Epsg4326.transform_point(CrsCode::Epsg3857, -61.0, 11.5);
        let src_spec = GridSpec::new(
            10,
            10,
            GeoTransform::from_origin(west, north, (east - west) / 10.0, (north - south) / 10.0),
            CrsCode::Epsg3857,
        );
        let src = RasterGrid::filled(src_spec, 42.0);

        let target = GridSpec::new(
            5,
            6,
            GeoTransform::from_origin(-61.8, 12.6, 0.1, 0.1),
            CrsCode::Epsg4326,
        );
        let out = align_to_reference(&src, &target, &AlignOptions::default()).unwrap();
        assert_eq!(out.spec.crs, CrsCode::Epsg4326);
        assert!(out.data.iter().all(|v| (*v - 42.0).abs() < 1e-4));
    }
}
