//! Pre-fetched rasters from a local directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use flood_common::{AreaOfInterest, CrsCode, FloodError, FloodResult};
use tracing::{info, warn};

use super::RasterSource;
use crate::config::LayerSpec;

/// Serves `<dir>/<stem>.tif` for each layer, e.g. `ndwi.tif`.
///
/// The files are used as-is: the AOI and CRS of the request are not applied.
#[derive(Debug, Clone)]
pub struct LocalDirectorySource {
    dir: PathBuf,
}

impl LocalDirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl RasterSource for LocalDirectorySource {
    fn name(&self) -> &str {
        "local"
    }

    async fn fetch(
        &self,
        layer: &LayerSpec,
        _aoi: &AreaOfInterest,
        crs: CrsCode,
        dest: &Path,
    ) -> FloodResult<PathBuf> {
        let source = self.dir.join(layer.kind.file_name());
        if !tokio::fs::try_exists(&source).await.unwrap_or(false) {
            return Err(FloodError::acquisition(
                layer.kind.label(),
                format!("{} not found", source.display()),
            ));
        }

        if crs != CrsCode::Epsg4326 {
            warn!(crs = %crs, "Local files are served as-is, requested CRS not applied");
        }

        let same_file = match (source.canonicalize(), dest.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        if !same_file {
            if let Some(parent) = dest.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::copy(&source, dest).await.map_err(|e| {
                FloodError::acquisition(
                    layer.kind.label(),
                    format!("copying {}: {}", source.display(), e),
                )
            })?;
        }

        info!(
            layer = %layer.kind,
            source = %source.display(),
            dest = %dest.display(),
            "Acquired layer from local directory"
        );
        Ok(dest.to_path_buf())
    }
}
