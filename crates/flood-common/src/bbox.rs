//! Bounding boxes and the area-of-interest polygon.

use serde::{Deserialize, Serialize};

/// A geographic or projected bounding box.
///
/// For geographic CRS (EPSG:4326), coordinates are in degrees.
/// For projected CRS (EPSG:3857), coordinates are in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Center point as (x, y).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Check if this bbox intersects another.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Compute the intersection of two bounding boxes.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        if !self.intersects(other) {
            return None;
        }

        Some(BoundingBox {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        })
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Leaflet-style corner pair: `[[south, west], [north, east]]`.
    pub fn to_lat_lon_corners(&self) -> [[f64; 2]; 2] {
        [[self.min_y, self.min_x], [self.max_y, self.max_x]]
    }
}

/// The fixed polygon every layer is clipped to.
///
/// Coordinates are (lon, lat) pairs in EPSG:4326. The ring is expected to be
/// closed (first vertex repeated at the end).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaOfInterest {
    pub name: String,
    pub ring: Vec<(f64, f64)>,
}

impl AreaOfInterest {
    pub fn new(name: impl Into<String>, ring: Vec<(f64, f64)>) -> Self {
        Self {
            name: name.into(),
            ring,
        }
    }

    /// Grenada, the area the pipeline was built for.
    pub fn grenada() -> Self {
        Self::new(
            "Grenada",
            vec![
                (-61.8, 12.0),
                (-61.8, 12.6),
                (-61.3, 12.6),
                (-61.3, 12.0),
                (-61.8, 12.0),
            ],
        )
    }

    /// True when the ring has at least a triangle and ends where it starts.
    pub fn is_closed(&self) -> bool {
        self.ring.len() >= 4 && self.ring.first() == self.ring.last()
    }

    /// Envelope of the ring.
    pub fn bbox(&self) -> BoundingBox {
        let mut bbox = BoundingBox::new(
            f64::INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
        );
        for &(x, y) in &self.ring {
            bbox.min_x = bbox.min_x.min(x);
            bbox.min_y = bbox.min_y.min(y);
            bbox.max_x = bbox.max_x.max(x);
            bbox.max_y = bbox.max_y.max(y);
        }
        bbox
    }

    /// Center of the envelope as (lon, lat).
    pub fn center(&self) -> (f64, f64) {
        self.bbox().center()
    }

    /// Ring as nested coordinate arrays, the GeoJSON polygon layout.
    pub fn coordinates(&self) -> Vec<Vec<[f64; 2]>> {
        vec![self.ring.iter().map(|&(x, y)| [x, y]).collect()]
    }
}
