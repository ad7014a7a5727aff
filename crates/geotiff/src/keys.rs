//! GeoTIFF tag numbers and GeoKey directory handling.

use flood_common::{CrsCode, GeoTransform};
use tiff::tags::Tag;

use crate::{GeoTiffError, Result};

pub const MODEL_PIXEL_SCALE: Tag = Tag::ModelPixelScaleTag;
pub const MODEL_TIEPOINT: Tag = Tag::ModelTiepointTag;
pub const MODEL_TRANSFORMATION: Tag = Tag::ModelTransformationTag;
pub const GEO_KEY_DIRECTORY: Tag = Tag::GeoKeyDirectoryTag;
pub const GDAL_NODATA: Tag = Tag::GdalNodata;

const GT_MODEL_TYPE: u32 = 1024;
const GT_RASTER_TYPE: u32 = 1025;
const GEOGRAPHIC_TYPE: u32 = 2048;
const PROJECTED_CS_TYPE: u32 = 3072;

const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;
const RASTER_PIXEL_IS_POINT: u32 = 2;

/// Keys pulled out of a GeoKey directory.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeoKeys {
    pub model_type: Option<u32>,
    pub raster_type: Option<u32>,
    pub geographic_type: Option<u32>,
    pub projected_type: Option<u32>,
}

impl GeoKeys {
    /// Parse the SHORT array stored under `GeoKeyDirectoryTag`.
    ///
    /// Keys whose value lives in another tag (location != 0) are skipped.
    pub fn parse(directory: &[u32]) -> Result<Self> {
        if directory.len() < 4 {
            return Err(GeoTiffError::MissingGeoreference(
                "GeoKey directory header truncated".to_string(),
            ));
        }

        let count = directory[3] as usize;
        let mut keys = GeoKeys::default();

        for entry in directory[4..].chunks_exact(4).take(count) {
            let (key, location, value) = (entry[0], entry[1], entry[3]);
            if location != 0 {
                continue;
            }
            match key {
                GT_MODEL_TYPE => keys.model_type = Some(value),
                GT_RASTER_TYPE => keys.raster_type = Some(value),
                GEOGRAPHIC_TYPE => keys.geographic_type = Some(value),
                PROJECTED_CS_TYPE => keys.projected_type = Some(value),
                _ => {}
            }
        }

        Ok(keys)
    }

    /// Resolve the CRS, defaulting to EPSG:4326 when no code is declared.
    pub fn crs(&self) -> Result<CrsCode> {
        let declared = if self.model_type == Some(MODEL_TYPE_GEOGRAPHIC as u32) {
            self.geographic_type.or(self.projected_type)
        } else {
            self.projected_type.or(self.geographic_type)
        };
        let Some(code) = declared else {
            return Ok(CrsCode::Epsg4326);
        };

        CrsCode::from_epsg(code).map_err(|e| GeoTiffError::UnsupportedCrs(e.to_string()))
    }

    pub fn is_pixel_is_point(&self) -> bool {
        self.raster_type == Some(RASTER_PIXEL_IS_POINT)
    }
}

/// Build a GeoKey directory for a CRS, PixelIsArea.
pub fn build_directory(crs: CrsCode) -> Vec<u16> {
    let (model_type, crs_key) = if crs.is_geographic() {
        (MODEL_TYPE_GEOGRAPHIC, GEOGRAPHIC_TYPE)
    } else {
        (MODEL_TYPE_PROJECTED, PROJECTED_CS_TYPE)
    };

    vec![
        1, 1, 0, 3, // version, revision, minor revision, key count
        GT_MODEL_TYPE as u16, 0, 1, model_type,
        GT_RASTER_TYPE as u16, 0, 1, RASTER_PIXEL_IS_AREA,
        crs_key as u16, 0, 1, crs.epsg() as u16,
    ]
}

/// Transform from `ModelPixelScale` + `ModelTiepoint`.
pub fn transform_from_tiepoint(scale: &[f64], tiepoint: &[f64]) -> Result<GeoTransform> {
    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err(GeoTiffError::MissingGeoreference(format!(
            "pixel scale has {} values, tiepoint has {}",
            scale.len(),
            tiepoint.len()
        )));
    }

    let (sx, sy) = (scale[0], scale[1]);
    let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);

    Ok(GeoTransform::new(sx, 0.0, x - i * sx, 0.0, -sy, y + j * sy))
}

/// Transform from the 4x4 row-major `ModelTransformation` matrix.
pub fn transform_from_matrix(matrix: &[f64]) -> Result<GeoTransform> {
    if matrix.len() < 16 {
        return Err(GeoTiffError::MissingGeoreference(format!(
            "model transformation has {} values, expected 16",
            matrix.len()
        )));
    }

    Ok(GeoTransform::new(
        matrix[0], matrix[1], matrix[3], matrix[4], matrix[5], matrix[7],
    ))
}

/// 4x4 row-major matrix for a transform.
pub fn matrix_from_transform(t: &GeoTransform) -> [f64; 16] {
    [
        t.a, t.b, 0.0, t.c, //
        t.d, t.e, 0.0, t.f, //
        0.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_roundtrip_geographic() {
        let dir: Vec<u32> = build_directory(CrsCode::Epsg4326)
            .into_iter()
            .map(u32::from)
            .collect();
        let keys = GeoKeys::parse(&dir).unwrap();
        assert_eq!(keys.model_type, Some(2));
        assert_eq!(keys.geographic_type, Some(4326));
        assert_eq!(keys.crs().unwrap(), CrsCode::Epsg4326);
        assert!(!keys.is_pixel_is_point());
    }

    #[test]
    fn test_directory_projected() {
        let dir: Vec<u32> = build_directory(CrsCode::Epsg3857)
            .into_iter()
            .map(u32::from)
            .collect();
        let keys = GeoKeys::parse(&dir).unwrap();
        assert_eq!(keys.crs().unwrap(), CrsCode::Epsg3857);
    }

    #[test]
    fn test_missing_crs_defaults_to_wgs84() {
        let keys = GeoKeys::parse(&[1, 1, 0, 0]).unwrap();
        assert_eq!(keys.crs().unwrap(), CrsCode::Epsg4326);
    }

    #[test]
    fn test_unsupported_crs() {
        // UTM 20N
        let keys = GeoKeys::parse(&[1, 1, 0, 1, 3072, 0, 1, 32620]).unwrap();
        assert!(matches!(keys.crs(), Err(GeoTiffError::UnsupportedCrs(_))));
    }

    #[test]
    fn test_tiepoint_transform() {
        let t = transform_from_tiepoint(&[0.5, 0.25, 0.0], &[0.0, 0.0, 0.0, -61.8, 12.6, 0.0])
            .unwrap();
        assert_eq!(t, GeoTransform::from_origin(-61.8, 12.6, 0.5, 0.25));
    }

    #[test]
    fn test_tiepoint_not_at_origin() {
        let t = transform_from_tiepoint(&[1.0, 1.0, 0.0], &[2.0, 3.0, 0.0, 10.0, 20.0, 0.0])
            .unwrap();
        assert_eq!(t.apply(2.0, 3.0), (10.0, 20.0));
    }

    #[test]
    fn test_matrix_roundtrip() {
        let t = GeoTransform::new(0.1, 0.01, -61.8, 0.02, -0.1, 12.6);
        assert_eq!(transform_from_matrix(&matrix_from_transform(&t)).unwrap(), t);
    }
}
