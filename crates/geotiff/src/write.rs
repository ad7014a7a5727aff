//! GeoTIFF encoding of float32 rasters.

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use flood_common::RasterGrid;
use tiff::encoder::{colortype, TiffEncoder};
use tracing::debug;

use crate::keys;
use crate::{GeoTiffError, Result};

/// Write a raster as a single-band 32-bit float GeoTIFF.
pub fn write_geotiff(path: impl AsRef<Path>, grid: &RasterGrid) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_geotiff_to(&mut writer, grid)?;
    writer.flush()?;

    debug!(
        path = %path.display(),
        width = grid.width(),
        height = grid.height(),
        "Wrote GeoTIFF"
    );

    Ok(())
}

/// Write a raster to any seekable writer.
pub fn write_geotiff_to<W: Write + Seek>(writer: W, grid: &RasterGrid) -> Result<()> {
    let spec = &grid.spec;
    if spec.is_empty() {
        return Err(GeoTiffError::InvalidRaster("cannot encode an empty grid".to_string()));
    }

    let mut encoder = TiffEncoder::new(writer).map_err(encode_err)?;
    let mut image = encoder
        .new_image::<colortype::Gray32Float>(spec.width as u32, spec.height as u32)
        .map_err(encode_err)?;

    let transform = &spec.transform;
    let directory = image.encoder();
    if transform.b == 0.0 && transform.d == 0.0 {
        let scale = [transform.a, -transform.e, 0.0];
        let tiepoint = [0.0, 0.0, 0.0, transform.c, transform.f, 0.0];
        directory
            .write_tag(keys::MODEL_PIXEL_SCALE, &scale[..])
            .map_err(encode_err)?;
        directory
            .write_tag(keys::MODEL_TIEPOINT, &tiepoint[..])
            .map_err(encode_err)?;
    } else {
        let matrix = keys::matrix_from_transform(transform);
        directory
            .write_tag(keys::MODEL_TRANSFORMATION, &matrix[..])
            .map_err(encode_err)?;
    }

    let geo_keys = keys::build_directory(spec.crs);
    directory
        .write_tag(keys::GEO_KEY_DIRECTORY, &geo_keys[..])
        .map_err(encode_err)?;

    if let Some(nodata) = spec.nodata {
        let text = nodata.to_string();
        directory
            .write_tag(keys::GDAL_NODATA, text.as_str())
            .map_err(encode_err)?;
    }

    image.write_data(&grid.data).map_err(encode_err)?;
    Ok(())
}

fn encode_err(err: tiff::TiffError) -> GeoTiffError {
    GeoTiffError::Encode(err.to_string())
}
