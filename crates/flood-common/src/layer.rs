//! The layers that make up a flood-risk run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which input (or output) a raster represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Normalized Difference Water Index, bounded to [-1, 1].
    Water,
    /// Digital elevation model, meters.
    Elevation,
    /// Population density, people per cell.
    Population,
    /// Composite flood-risk index, [0, 1].
    Risk,
}

impl LayerKind {
    /// The three acquired inputs, in acquisition order.
    pub const INPUTS: [LayerKind; 3] = [LayerKind::Water, LayerKind::Elevation, LayerKind::Population];

    /// Human-readable label used for overlays and legends.
    pub fn label(&self) -> &'static str {
        match self {
            LayerKind::Water => "NDWI",
            LayerKind::Elevation => "Elevation",
            LayerKind::Population => "Population",
            LayerKind::Risk => "Flood Risk Index",
        }
    }

    /// File stem of the GeoTIFF written for this layer.
    pub fn file_stem(&self) -> &'static str {
        match self {
            LayerKind::Water => "ndwi",
            LayerKind::Elevation => "dem",
            LayerKind::Population => "population",
            LayerKind::Risk => "flood_risk",
        }
    }

    /// File name of the GeoTIFF written for this layer.
    pub fn file_name(&self) -> String {
        format!("{}.tif", self.file_stem())
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
