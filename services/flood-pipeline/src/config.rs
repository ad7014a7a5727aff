//! Pipeline configuration.
//!
//! Every constant of a run lives in [`PipelineConfig::default`]. A YAML file
//! may override any subset of it:
//!
//! ```yaml
//! weights:
//!   water: 0.5
//!   elevation: 0.3
//!   population: 0.2
//! outputs:
//!   root: /data/grenada
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use flood_common::{AreaOfInterest, CrsCode, FloodError, FloodResult, LayerKind};
use grid_processor::{AlignOptions, FusionWeights};
use renderer::{ColorRamp, MapOptions};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Root configuration for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub aoi: AreaOfInterest,
    /// CRS requested from the acquisition backend.
    pub crs: CrsCode,
    pub layers: LayerSpecs,
    pub weights: FusionWeights,
    pub alignment: AlignOptions,
    pub map: MapOptions,
    /// Layers drawn on the map, bottom to top.
    pub map_layers: Vec<LayerKind>,
    pub outputs: OutputLayout,
    pub earth_engine: EarthEngineSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            aoi: AreaOfInterest::grenada(),
            crs: CrsCode::Epsg4326,
            layers: LayerSpecs::default(),
            weights: FusionWeights::default(),
            alignment: AlignOptions::default(),
            map: MapOptions::default(),
            map_layers: vec![
                LayerKind::Water,
                LayerKind::Elevation,
                LayerKind::Population,
                LayerKind::Risk,
            ],
            outputs: OutputLayout::default(),
            earth_engine: EarthEngineSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a YAML override file on top of the defaults.
    pub fn from_file(path: impl AsRef<Path>) -> FloodResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            FloodError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_yaml(&content)?;
        info!(path = %path.display(), "Loaded pipeline configuration");
        Ok(config)
    }

    /// Parse and validate YAML. Missing keys keep their defaults.
    pub fn from_yaml(content: &str) -> FloodResult<Self> {
        let mut config: PipelineConfig = serde_yaml::from_str(content)
            .map_err(|e| FloodError::Config(format!("invalid YAML: {}", e)))?;

        // A custom AOI without an explicit map center recenters the map on it
        let raw: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| FloodError::Config(format!("invalid YAML: {}", e)))?;
        let center_set = raw.get("map").and_then(|m| m.get("center")).is_some();
        if raw.get("aoi").is_some() && !center_set {
            let (lon, lat) = config.aoi.center();
            config.map.center = [lat, lon];
        }

        config.validate()?;
        debug!(weights = ?config.weights, "Parsed pipeline configuration");
        Ok(config)
    }

    pub fn validate(&self) -> FloodResult<()> {
        self.weights
            .validate()
            .map_err(|e| FloodError::Config(e.to_string()))?;

        if !self.aoi.is_closed() {
            return Err(FloodError::Config(format!(
                "area of interest '{}' is not a closed ring",
                self.aoi.name
            )));
        }

        for (expected, spec) in self.layers.iter() {
            if spec.kind != expected {
                return Err(FloodError::Config(format!(
                    "layer slot '{}' holds a '{}' layer",
                    expected.file_stem(),
                    spec.kind.file_stem()
                )));
            }
            if !(spec.scale > 0.0) {
                return Err(FloodError::Config(format!(
                    "{}: scale must be positive, got {}",
                    spec.kind, spec.scale
                )));
            }
            if let Some(range) = &spec.date_range {
                if range.end < range.start {
                    return Err(FloodError::Config(format!(
                        "{}: date range ends before it starts",
                        spec.kind
                    )));
                }
            }
        }

        if self.map_layers.is_empty() {
            return Err(FloodError::Config("no map layers configured".to_string()));
        }
        Ok(())
    }
}

/// Per-layer acquisition parameters for the three inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerSpecs {
    pub water: LayerSpec,
    pub elevation: LayerSpec,
    pub population: LayerSpec,
}

impl Default for LayerSpecs {
    fn default() -> Self {
        Self {
            water: LayerSpec {
                kind: LayerKind::Water,
                dataset: "COPERNICUS/S2_SR_HARMONIZED".to_string(),
                collection: true,
                date_range: Some(DateRange::new(date(2023, 1, 1), date(2023, 12, 31))),
                cloud_cover_max: Some(20.0),
                reducer: Reducer::Median,
                normalized_difference: Some(["B3".to_string(), "B8".to_string()]),
                band_name: Some("NDWI".to_string()),
                scale: 60.0,
                ramp: ColorRamp::Blues,
            },
            elevation: LayerSpec {
                kind: LayerKind::Elevation,
                dataset: "USGS/SRTMGL1_003".to_string(),
                collection: false,
                date_range: None,
                cloud_cover_max: None,
                reducer: Reducer::None,
                normalized_difference: None,
                band_name: None,
                scale: 30.0,
                ramp: ColorRamp::Viridis,
            },
            population: LayerSpec {
                kind: LayerKind::Population,
                dataset: "WorldPop/GP/100m/pop".to_string(),
                collection: true,
                date_range: Some(DateRange::new(date(2020, 1, 1), date(2020, 12, 31))),
                cloud_cover_max: None,
                reducer: Reducer::Mean,
                normalized_difference: None,
                band_name: None,
                scale: 100.0,
                ramp: ColorRamp::Purples,
            },
        }
    }
}

impl LayerSpecs {
    pub fn get(&self, kind: LayerKind) -> Option<&LayerSpec> {
        match kind {
            LayerKind::Water => Some(&self.water),
            LayerKind::Elevation => Some(&self.elevation),
            LayerKind::Population => Some(&self.population),
            LayerKind::Risk => None,
        }
    }

    /// (slot, spec) pairs in acquisition order.
    pub fn iter(&self) -> impl Iterator<Item = (LayerKind, &LayerSpec)> {
        [
            (LayerKind::Water, &self.water),
            (LayerKind::Elevation, &self.elevation),
            (LayerKind::Population, &self.population),
        ]
        .into_iter()
    }
}

/// What to request for one input layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub kind: LayerKind,
    /// Dataset identifier in the acquisition backend.
    pub dataset: String,
    /// True for image collections that must be filtered and reduced.
    #[serde(default)]
    pub collection: bool,
    #[serde(default)]
    pub date_range: Option<DateRange>,
    /// Maximum scene cloud cover, percent.
    #[serde(default)]
    pub cloud_cover_max: Option<f64>,
    #[serde(default)]
    pub reducer: Reducer,
    /// Bands `[a, b]` for `(a - b) / (a + b)`.
    #[serde(default)]
    pub normalized_difference: Option<[String; 2]>,
    /// Output band name.
    #[serde(default)]
    pub band_name: Option<String>,
    /// Ground sample distance in meters.
    pub scale: f64,
    #[serde(default = "default_ramp")]
    pub ramp: ColorRamp,
}

fn default_ramp() -> ColorRamp {
    ColorRamp::Reds
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

/// Calendar date for the built-in defaults.
fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("built-in default date is valid")
}

/// How an image collection is collapsed to one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    #[default]
    None,
    Median,
    Mean,
}

/// Where a run writes its files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputLayout {
    pub root: PathBuf,
    /// Sub-directory of `root` for GeoTIFFs.
    pub tiffs_dir: String,
    pub map_file: String,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self {
            root: PathBuf::from("outputs"),
            tiffs_dir: "tiffs".to_string(),
            map_file: "flood_sovi_map.html".to_string(),
        }
    }
}

impl OutputLayout {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn tiff_dir(&self) -> PathBuf {
        self.root.join(&self.tiffs_dir)
    }

    /// GeoTIFF path of a layer, e.g. `outputs/tiffs/ndwi.tif`.
    pub fn tiff_path(&self, kind: LayerKind) -> PathBuf {
        self.tiff_dir().join(kind.file_name())
    }

    pub fn map_path(&self) -> PathBuf {
        self.root.join(&self.map_file)
    }

    /// Create the output directories.
    pub async fn ensure_dirs(&self) -> FloodResult<()> {
        tokio::fs::create_dir_all(self.tiff_dir()).await?;
        Ok(())
    }
}

/// Earth Engine REST settings. The access token is never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarthEngineSettings {
    pub project: String,
    pub api_base: String,
}

impl Default for EarthEngineSettings {
    fn default() -> Self {
        Self {
            project: "aerobic-amphora-482118-j4".to_string(),
            api_base: "https://earthengine.googleapis.com/v1".to_string(),
        }
    }
}
