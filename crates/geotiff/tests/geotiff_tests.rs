//! Write/read tests for the GeoTIFF codec.

use std::io::Cursor;

use flood_common::{CrsCode, GeoTransform, GridSpec, RasterGrid};
use geotiff::{read_geotiff, read_geotiff_from, write_geotiff, write_geotiff_to, GeoTiffError};
use test_utils::fixtures::reference_spec;
use test_utils::{assert_approx_eq, create_test_grid, elevation_raster, TestOutputDir};

fn assert_same_transform(left: &GeoTransform, right: &GeoTransform) {
    assert_approx_eq!(left.a, right.a, 1e-12);
    assert_approx_eq!(left.b, right.b, 1e-12);
    assert_approx_eq!(left.c, right.c, 1e-9);
    assert_approx_eq!(left.d, right.d, 1e-12);
    assert_approx_eq!(left.e, right.e, 1e-12);
    assert_approx_eq!(left.f, right.f, 1e-9);
}

#[test]
fn test_file_preserves_data_and_georeference() {
    let dir = TestOutputDir::new();
    let path = dir.join("dem.tif");
    let grid = elevation_raster(reference_spec(), 840.0);

    write_geotiff(&path, &grid).unwrap();
    let read = read_geotiff(&path).unwrap();

    assert_eq!(read.spec.shape(), grid.spec.shape());
    assert_eq!(read.spec.crs, CrsCode::Epsg4326);
    assert_same_transform(&read.spec.transform, &grid.spec.transform);
    assert_eq!(read.data, grid.data);
}

#[test]
fn test_web_mercator_crs_survives() {
    let spec = GridSpec::new(
        3,
        2,
        GeoTransform::from_origin(-6_879_000.0, 1_413_000.0, 30.0, 30.0),
        CrsCode::Epsg3857,
    );
    let grid = RasterGrid::new(spec, create_test_grid(3, 2)).unwrap();

    let mut buf = Cursor::new(Vec::new());
    write_geotiff_to(&mut buf, &grid).unwrap();
    buf.set_position(0);
    let read = read_geotiff_from(buf).unwrap();

    assert_eq!(read.spec.crs, CrsCode::Epsg3857);
    assert_same_transform(&read.spec.transform, &grid.spec.transform);
    assert_eq!(read.data, grid.data);
}

#[test]
fn test_rotated_transform_uses_matrix() {
    let spec = GridSpec::new(
        2,
        2,
        GeoTransform::new(0.1, 0.02, -61.8, 0.01, -0.1, 12.6),
        CrsCode::Epsg4326,
    );
    let grid = RasterGrid::new(spec, vec![1.0, 2.0, 3.0, 4.0]).unwrap();

    let mut buf = Cursor::new(Vec::new());
    write_geotiff_to(&mut buf, &grid).unwrap();
    buf.set_position(0);
    let read = read_geotiff_from(buf).unwrap();

    assert_same_transform(&read.spec.transform, &grid.spec.transform);
    assert!(!read.spec.transform.is_north_up());
}

#[test]
fn test_nodata_cells_read_back_as_nan() {
    let mut spec = reference_spec();
    spec.nodata = Some(-9999.0);
    let mut data = vec![5.0f32; spec.len()];
    data[3] = -9999.0;
    let grid = RasterGrid::new(spec, data).unwrap();

    let mut buf = Cursor::new(Vec::new());
    write_geotiff_to(&mut buf, &grid).unwrap();
    buf.set_position(0);
    let read = read_geotiff_from(buf).unwrap();

    assert!(read.data[3].is_nan());
    assert_eq!(read.data[0], 5.0);
    assert_eq!(read.valid_count(), grid.spec.len() - 1);
    // Sentinels are gone, so the declaration is dropped with them
    assert_eq!(read.spec.nodata, None);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TestOutputDir::new();
    let err = read_geotiff(dir.join("absent.tif")).unwrap_err();
    assert!(matches!(err, GeoTiffError::Io(_)));
}

#[test]
fn test_not_a_tiff() {
    let err = read_geotiff_from(Cursor::new(b"<html>quota exceeded</html>".to_vec())).unwrap_err();
    assert!(matches!(err, GeoTiffError::Decode(_)));
}

#[test]
fn test_empty_grid_rejected() {
    let spec = GridSpec::new(0, 0, GeoTransform::from_origin(0.0, 0.0, 1.0, 1.0), CrsCode::Epsg4326);
    let grid = RasterGrid::new(spec, Vec::new()).unwrap();
    let mut buf = Cursor::new(Vec::new());
    assert!(matches!(
        write_geotiff_to(&mut buf, &grid),
        Err(GeoTiffError::InvalidRaster(_))
    ));
}
