//! Coordinate Reference System codes and point transforms.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Spherical Mercator earth radius (meters).
const WEB_MERCATOR_RADIUS: f64 = 6_378_137.0;

/// Latitude limit of the Web Mercator square.
const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

/// CRS codes the pipeline can read, write and align between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 Geographic (lon/lat in degrees)
    #[serde(rename = "EPSG:4326")]
    Epsg4326,
    /// Web Mercator (meters)
    #[serde(rename = "EPSG:3857")]
    Epsg3857,
}

impl CrsCode {
    /// Map an EPSG number to a supported code.
    pub fn from_epsg(code: u32) -> Result<Self, CrsParseError> {
        match code {
            4326 => Ok(CrsCode::Epsg4326),
            3857 | 900913 => Ok(CrsCode::Epsg3857),
            other => Err(CrsParseError::UnsupportedCrs(format!("EPSG:{}", other))),
        }
    }

    /// Numeric EPSG code.
    pub fn epsg(&self) -> u32 {
        match self {
            CrsCode::Epsg4326 => 4326,
            CrsCode::Epsg3857 => 3857,
        }
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Epsg4326)
    }

    /// Transform a point from `self` into `to`.
    ///
    /// Points outside the Web Mercator latitude band are clamped to it.
    pub fn transform_point(&self, to: CrsCode, x: f64, y: f64) -> (f64, f64) {
        match (self, to) {
            (CrsCode::Epsg4326, CrsCode::Epsg3857) => {
                let lat = y.clamp(-WEB_MERCATOR_MAX_LAT, WEB_MERCATOR_MAX_LAT);
                let mx = x.to_radians() * WEB_MERCATOR_RADIUS;
                let my = (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0)
                    .tan()
                    .ln()
                    * WEB_MERCATOR_RADIUS;
                (mx, my)
            }
            (CrsCode::Epsg3857, CrsCode::Epsg4326) => {
                let lon = (x / WEB_MERCATOR_RADIUS).to_degrees();
                let lat = (2.0 * (y / WEB_MERCATOR_RADIUS).exp().atan()
                    - std::f64::consts::FRAC_PI_2)
                    .to_degrees();
                (lon, lat)
            }
            _ => (x, y),
        }
    }
}

impl FromStr for CrsCode {
    type Err = CrsParseError;

    /// Accepts "EPSG:4326", "epsg:4326", "CRS:84", "EPSG:3857", "EPSG:900913".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "EPSG:4326" | "CRS:84" => Ok(CrsCode::Epsg4326),
            "EPSG:3857" | "EPSG:900913" => Ok(CrsCode::Epsg3857),
            _ => Err(CrsParseError::UnsupportedCrs(s.to_string())),
        }
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrsParseError {
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),
}
