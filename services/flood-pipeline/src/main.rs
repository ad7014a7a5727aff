//! Flood-risk pipeline.
//!
//! Runs one batch over the configured area of interest:
//! - Acquires NDWI, elevation and population GeoTIFFs
//! - Aligns elevation and population onto the NDWI grid
//! - Writes the fused flood-risk GeoTIFF
//! - Renders an interactive HTML map

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use flood_pipeline::acquisition::{DownloadConfig, DownloadManager, RasterSource};
use flood_pipeline::{EarthEngineSource, LocalDirectorySource, Pipeline, PipelineConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    /// Earth Engine REST API
    EarthEngine,
    /// Pre-downloaded GeoTIFFs in a directory
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "flood-pipeline")]
#[command(about = "Flood-risk index from NDWI, elevation and population rasters")]
struct Args {
    /// YAML configuration overriding the built-in defaults
    #[arg(short, long, env = "FLOOD_CONFIG")]
    config: Option<PathBuf>,

    /// Output root (overrides the configuration)
    #[arg(short, long, env = "FLOOD_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Where input rasters come from
    #[arg(long, value_enum, default_value = "earth-engine")]
    source: SourceKind,

    /// Directory holding ndwi.tif, dem.tif and population.tif for --source local
    #[arg(long, required_if_eq("source", "local"))]
    local_dir: Option<PathBuf>,

    /// Reuse input GeoTIFFs already present in the output directory
    #[arg(long)]
    skip_download: bool,

    /// Earth Engine cloud project (overrides the configuration)
    #[arg(long, env = "EE_PROJECT")]
    ee_project: Option<String>,

    /// OAuth2 access token for Earth Engine
    #[arg(long, env = "EE_ACCESS_TOKEN", hide_env_values = true)]
    ee_access_token: Option<String>,

    /// Earth Engine API base URL (overrides the configuration)
    #[arg(long, env = "EE_API_BASE")]
    ee_api_base: Option<String>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,
}

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let builder = fmt().with_env_filter(filter).with_target(true).with_level(true);
    match args.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

fn load_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(root) = &args.output_dir {
        config.outputs.root = root.clone();
    }
    if let Some(project) = &args.ee_project {
        config.earth_engine.project = project.clone();
    }
    if let Some(api_base) = &args.ee_api_base {
        config.earth_engine.api_base = api_base.clone();
    }

    Ok(config)
}

fn build_source(args: &Args, config: &PipelineConfig) -> Result<Box<dyn RasterSource>> {
    match args.source {
        SourceKind::Local => {
            let dir = args
                .local_dir
                .clone()
                .context("--local-dir is required with --source local")?;
            Ok(Box::new(LocalDirectorySource::new(dir)))
        }
        SourceKind::EarthEngine => {
            let token = args
                .ee_access_token
                .clone()
                .context("EE_ACCESS_TOKEN must be set for the Earth Engine source")?;
            let downloader = DownloadManager::new(DownloadConfig::default())?;
            Ok(Box::new(EarthEngineSource::new(
                config.earth_engine.clone(),
                token,
                downloader,
            )))
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args);

    let config = load_config(&args)?;
    let source = build_source(&args, &config)?;

    info!(
        aoi = %config.aoi.name,
        source = source.name(),
        output = %config.outputs.root.display(),
        "Starting flood-risk pipeline"
    );

    let pipeline = Pipeline::new(config, source).skip_download(args.skip_download);
    let report = match pipeline.run().await {
        Ok(report) => report,
        Err(e) => {
            error!(stage = e.stage(), error = %e, "Pipeline failed");
            return Err(e.into());
        }
    };

    info!(
        risk = %report.risk_path.display(),
        map = %report.map_path.display(),
        height = report.shape.0,
        width = report.shape.1,
        min = report.summary.min,
        max = report.summary.max,
        mean = report.summary.mean,
        "Pipeline complete"
    );
    println!("{}", report.map_path.display());

    Ok(())
}
