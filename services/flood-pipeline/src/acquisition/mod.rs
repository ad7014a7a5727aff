//! Raster acquisition.
//!
//! A [`RasterSource`] turns a layer request into a GeoTIFF on disk. The
//! pipeline only depends on this trait, so the remote backend can be swapped
//! for a local directory in offline runs and tests.

pub mod download;
pub mod earth_engine;
pub mod local;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use flood_common::{AreaOfInterest, CrsCode, FloodResult};

use crate::config::LayerSpec;

pub use download::{DownloadConfig, DownloadManager, DownloadProgress};
pub use earth_engine::EarthEngineSource;
pub use local::LocalDirectorySource;

/// Fetches one input layer as a GeoTIFF.
#[async_trait]
pub trait RasterSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Fetch `layer` clipped to `aoi` in `crs` and write it to `dest`.
    ///
    /// Returns the path of the written file. Failures are
    /// `FloodError::Acquisition` and abort the run.
    async fn fetch(
        &self,
        layer: &LayerSpec,
        aoi: &AreaOfInterest,
        crs: CrsCode,
        dest: &Path,
    ) -> FloodResult<PathBuf>;
}
