//! GeoTIFF decoding into a [`RasterGrid`].

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use flood_common::{GridSpec, RasterGrid};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::decoder::ifd::Value;
use tiff::ColorType;
use tracing::debug;

use crate::keys::{self, GeoKeys};
use crate::{GeoTiffError, Result};

/// Read band 1 of a GeoTIFF file.
///
/// The file handle is released before the function returns. No-data cells
/// (GDAL no-data tag) are replaced with NaN.
pub fn read_geotiff(path: impl AsRef<Path>) -> Result<RasterGrid> {
    let path = path.as_ref();
    let grid = {
        let file = File::open(path)?;
        read_geotiff_from(BufReader::new(file))?
    };

    debug!(
        path = %path.display(),
        width = grid.width(),
        height = grid.height(),
        crs = %grid.spec.crs,
        "Read GeoTIFF"
    );

    Ok(grid)
}

/// Read band 1 of a GeoTIFF from any seekable reader.
pub fn read_geotiff_from<R: Read + Seek>(reader: R) -> Result<RasterGrid> {
    let mut decoder = Decoder::new(reader)?;
    let (width, height) = decoder.dimensions()?;
    let (width, height) = (width as usize, height as usize);

    let samples = match decoder.colortype()? {
        ColorType::Gray(_) => 1,
        ColorType::GrayA(_) => 2,
        ColorType::RGB(_) => 3,
        ColorType::RGBA(_) | ColorType::CMYK(_) => 4,
        other => {
            return Err(GeoTiffError::UnsupportedFormat(format!("{:?}", other)));
        }
    };

    let transform = match (
        find_f64_vec(&mut decoder, keys::MODEL_PIXEL_SCALE)?,
        find_f64_vec(&mut decoder, keys::MODEL_TIEPOINT)?,
        find_f64_vec(&mut decoder, keys::MODEL_TRANSFORMATION)?,
    ) {
        (Some(scale), Some(tiepoint), _) => keys::transform_from_tiepoint(&scale, &tiepoint)?,
        (_, _, Some(matrix)) => keys::transform_from_matrix(&matrix)?,
        _ => {
            return Err(GeoTiffError::MissingGeoreference(
                "no ModelPixelScale/ModelTiepoint or ModelTransformation tag".to_string(),
            ))
        }
    };

    let geo_keys = match decoder.find_tag(keys::GEO_KEY_DIRECTORY)? {
        Some(value) => GeoKeys::parse(&value.into_u32_vec()?)?,
        None => GeoKeys::default(),
    };
    let crs = geo_keys.crs()?;

    // PixelIsPoint tiepoints refer to pixel centers
    let transform = if geo_keys.is_pixel_is_point() {
        let (x, y) = transform.apply(-0.5, -0.5);
        flood_common::GeoTransform { c: x, f: y, ..transform }
    } else {
        transform
    };

    let nodata = match decoder.find_tag(keys::GDAL_NODATA)? {
        Some(Value::Ascii(text)) => parse_nodata(&text),
        _ => None,
    };

    let interleaved = widen(decoder.read_image()?)?;
    let data: Vec<f32> = if samples == 1 {
        interleaved
    } else {
        interleaved.into_iter().step_by(samples).collect()
    };

    if data.len() != width * height {
        return Err(GeoTiffError::InvalidRaster(format!(
            "decoded {} samples for a {}x{} image",
            data.len(),
            width,
            height
        )));
    }

    let mut spec = GridSpec::new(width, height, transform, crs);
    spec.nodata = nodata;
    let grid = RasterGrid::new(spec, data)
        .map_err(|e| GeoTiffError::InvalidRaster(e.to_string()))?;

    Ok(grid.mask_nodata())
}

fn find_f64_vec<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    tag: tiff::tags::Tag,
) -> Result<Option<Vec<f64>>> {
    match decoder.find_tag(tag)? {
        Some(value) => Ok(Some(value.into_f64_vec()?)),
        None => Ok(None),
    }
}

fn parse_nodata(text: &str) -> Option<f64> {
    let trimmed = text.trim_matches(char::from(0)).trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "nan" | "-nan" => None,
        other => other.parse().ok(),
    }
}

/// Widen any supported sample type to f32.
fn widen(result: DecodingResult) -> Result<Vec<f32>> {
    let data = match result {
        DecodingResult::U8(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U16(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U32(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I8(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I16(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I32(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::F32(buf) => buf,
        DecodingResult::F64(buf) => buf.into_iter().map(|v| v as f32).collect(),
        _ => {
            return Err(GeoTiffError::UnsupportedFormat(
                "64-bit integer samples".to_string(),
            ))
        }
    };
    Ok(data)
}
