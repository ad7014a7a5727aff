//! Single-band GeoTIFF I/O.
//!
//! Reads the first band of a GeoTIFF into a [`RasterGrid`] and writes
//! 32-bit float rasters back out, carrying the georeferencing that the
//! alignment stage depends on:
//!
//! - `ModelPixelScale` + `ModelTiepoint` for north-up grids
//! - `ModelTransformation` for rotated grids
//! - `GeoKeyDirectory` for the CRS (EPSG:4326 / EPSG:3857)
//! - the GDAL no-data ASCII tag
//!
//! [`RasterGrid`]: flood_common::RasterGrid

pub mod error;
pub mod keys;
pub mod read;
pub mod write;

pub use error::{GeoTiffError, Result};
pub use read::{read_geotiff, read_geotiff_from};
pub use write::{write_geotiff, write_geotiff_to};
