//! Stage orchestration.
//!
//! ```text
//! create dirs → acquire ndwi/dem/population → read reference (ndwi)
//!   → align dem, population → normalize → fuse → flood_risk.tif → map.html
//! ```
//!
//! Stages run strictly in order and the first failure aborts the run.

use std::path::{Path, PathBuf};

use flood_common::{FloodError, FloodResult, LayerKind, RasterGrid};
use grid_processor::{align_to_reference, compute_flood_risk, FusionOutput, RiskSummary};
use renderer::MapLayer;
use serde::Serialize;
use tracing::{info, instrument};

use crate::acquisition::RasterSource;
use crate::config::PipelineConfig;

/// What a successful run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Acquired input GeoTIFFs, in acquisition order.
    pub inputs: Vec<(LayerKind, PathBuf)>,
    pub risk_path: PathBuf,
    pub map_path: PathBuf,
    /// (height, width) of the reference grid.
    pub shape: (usize, usize),
    pub summary: RiskSummary,
}

/// Input grids on the reference lattice.
struct AlignedInputs {
    water: RasterGrid,
    elevation: RasterGrid,
    population: RasterGrid,
}

/// One flood-risk run.
pub struct Pipeline {
    config: PipelineConfig,
    source: Box<dyn RasterSource>,
    skip_download: bool,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, source: Box<dyn RasterSource>) -> Self {
        Self {
            config,
            source,
            skip_download: false,
        }
    }

    /// Reuse input GeoTIFFs already present in the output directory.
    pub fn skip_download(mut self, skip: bool) -> Self {
        self.skip_download = skip;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage.
    #[instrument(skip_all, fields(aoi = %self.config.aoi.name, source = self.source.name()))]
    pub async fn run(&self) -> FloodResult<PipelineReport> {
        self.config.validate()?;
        let layout = &self.config.outputs;
        layout.ensure_dirs().await?;

        info!("Stage 1: acquisition");
        let inputs = self.acquire().await?;

        info!("Stage 2: fusion");
        let aligned = self.align(&inputs)?;
        let fusion = compute_flood_risk(
            &aligned.water,
            &aligned.elevation,
            &aligned.population,
            &self.config.weights,
        )?;

        let risk_path = layout.tiff_path(LayerKind::Risk);
        geotiff::write_geotiff(&risk_path, &fusion.risk)?;
        info!(path = %risk_path.display(), "Wrote flood risk GeoTIFF");

        let map_path = layout.map_path();
        self.render_map(&aligned, &fusion, &map_path).await?;

        Ok(PipelineReport {
            inputs,
            risk_path,
            map_path,
            shape: fusion.risk.spec.shape(),
            summary: fusion.summary,
        })
    }

    /// Fetch the three inputs, one after another.
    #[instrument(skip_all)]
    async fn acquire(&self) -> FloodResult<Vec<(LayerKind, PathBuf)>> {
        let layout = &self.config.outputs;
        let mut paths = Vec::with_capacity(LayerKind::INPUTS.len());

        for (kind, spec) in self.config.layers.iter() {
            let dest = layout.tiff_path(kind);

            if self.skip_download && input_exists(&dest).await? {
                info!(layer = %kind, path = %dest.display(), "Reusing existing GeoTIFF");
                paths.push((kind, dest));
                continue;
            }

            let path = self
                .source
                .fetch(spec, &self.config.aoi, self.config.crs, &dest)
                .await?;
            info!(layer = %kind, path = %path.display(), "Acquired layer");
            paths.push((kind, path));
        }

        Ok(paths)
    }

    /// Read the acquired files and resample DEM and population onto the water grid.
    #[instrument(skip_all)]
    fn align(&self, inputs: &[(LayerKind, PathBuf)]) -> FloodResult<AlignedInputs> {
        let water = read_layer(inputs, LayerKind::Water)?;
        let dem = read_layer(inputs, LayerKind::Elevation)?;
        let pop = read_layer(inputs, LayerKind::Population)?;

        info!(
            width = water.width(),
            height = water.height(),
            crs = %water.spec.crs,
            "Reference grid"
        );

        let opts = &self.config.alignment;
        let elevation = align_to_reference(&dem, &water.spec, opts)?;
        let population = align_to_reference(&pop, &water.spec, opts)?;

        Ok(AlignedInputs {
            water,
            elevation,
            population,
        })
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    async fn render_map(
        &self,
        aligned: &AlignedInputs,
        fusion: &FusionOutput,
        path: &Path,
    ) -> FloodResult<()> {
        let mut layers = Vec::with_capacity(self.config.map_layers.len());
        for kind in &self.config.map_layers {
            let (grid, ramp) = match kind {
                LayerKind::Water => (&aligned.water, self.config.layers.water.ramp),
                LayerKind::Elevation => (&aligned.elevation, self.config.layers.elevation.ramp),
                LayerKind::Population => (&aligned.population, self.config.layers.population.ramp),
                LayerKind::Risk => (&fusion.risk, renderer::default_ramp(LayerKind::Risk)),
            };
            layers.push(MapLayer::from_grid(*kind, grid, ramp));
        }

        let html = renderer::render(&layers, &self.config.map)?;
        tokio::fs::write(path, html).await?;
        info!(layers = layers.len(), "Saved interactive map");
        Ok(())
    }
}

/// True when a previously acquired input can be reused.
async fn input_exists(path: &Path) -> FloodResult<bool> {
    Ok(tokio::fs::try_exists(path).await?)
}

/// Read the file acquired for `kind`.
fn read_layer(inputs: &[(LayerKind, PathBuf)], kind: LayerKind) -> FloodResult<RasterGrid> {
    let path = inputs
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, p)| p)
        .ok_or_else(|| FloodError::acquisition(kind.label(), "layer was not acquired"))?;

    let grid = geotiff::read_geotiff(path)
        .map_err(|e| FloodError::RasterIo(format!("{} ({}): {}", kind, path.display(), e)))?;
    if grid.spec.is_empty() {
        return Err(FloodError::InvalidGrid(format!("{} grid is empty", kind)));
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::TestOutputDir;

    #[tokio::test]
    async fn test_input_exists() {
        let dir = TestOutputDir::new();
        let file = dir.join("ndwi.tif");
        assert!(!input_exists(&file).await.unwrap());

        std::fs::write(&file, b"x").unwrap();
        assert!(input_exists(&file).await.unwrap());
    }

    #[tokio::test]
    async fn test_input_exists_propagates_io_errors() {
        let dir = TestOutputDir::new();
        let file = dir.join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();

        // A regular file used as a directory is an error, not "absent"
        let err = input_exists(&file.join("ndwi.tif")).await.unwrap_err();
        assert!(matches!(err, FloodError::Io(_)));
    }

    #[test]
    fn test_read_layer_requires_acquired_path() {
        let err = read_layer(&[], LayerKind::Water).unwrap_err();
        assert!(matches!(err, FloodError::Acquisition { .. }));
    }
}
