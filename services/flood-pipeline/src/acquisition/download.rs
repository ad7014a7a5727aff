//! Streaming download of remote rasters.
//!
//! Bytes go to `<dest>.partial` first. The file is renamed into place only
//! after the body is complete and flushed. There are no retries: a failure
//! aborts the run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use reqwest::{header, Client, RequestBuilder, Response};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

/// Log progress after this many bytes.
const PROGRESS_INTERVAL: u64 = 1_000_000;

/// Configuration for the download manager.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// HTTP request timeout
    pub request_timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(600), // 10 minutes
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// Download progress information.
#[derive(Debug, Clone)]
pub struct DownloadProgress {
    pub url: String,
    pub total_bytes: Option<u64>,
    pub downloaded_bytes: u64,
    pub started_at: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
}

impl DownloadProgress {
    fn new(url: &str) -> Self {
        let now = Utc::now();
        Self {
            url: url.to_string(),
            total_bytes: None,
            downloaded_bytes: 0,
            started_at: now,
            last_update: now,
        }
    }

    pub fn percent_complete(&self) -> Option<f64> {
        self.total_bytes
            .filter(|total| *total > 0)
            .map(|total| (self.downloaded_bytes as f64 / total as f64) * 100.0)
    }

    pub fn bytes_per_second(&self) -> f64 {
        let elapsed = (self.last_update - self.started_at).num_milliseconds() as f64 / 1000.0;
        if elapsed > 0.0 {
            self.downloaded_bytes as f64 / elapsed
        } else {
            0.0
        }
    }
}

/// `<dest>.partial`, next to the final file.
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    dest.with_file_name(name)
}

/// Streams HTTP responses to disk.
pub struct DownloadManager {
    client: Client,
}

impl DownloadManager {
    /// Create a new download manager with the given configuration.
    pub fn new(config: DownloadConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .tcp_nodelay(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Shared HTTP client, for API calls that precede a download.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// GET `url` into `dest`.
    pub async fn download(
        &self,
        url: &str,
        bearer_token: Option<&str>,
        dest: &Path,
    ) -> Result<DownloadProgress> {
        let mut request = self.client.get(url);
        if let Some(token) = bearer_token {
            request = request.bearer_auth(token);
        }
        self.download_request(url, request, dest).await
    }

    /// Send a prepared request and stream its body into `dest`.
    #[instrument(skip(self, request, dest), fields(dest = %dest.display()))]
    pub async fn download_request(
        &self,
        url: &str,
        request: RequestBuilder,
        dest: &Path,
    ) -> Result<DownloadProgress> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }
        let temp_path = partial_path(dest);
        let mut progress = DownloadProgress::new(url);

        info!(url = %url, "Starting download");

        let response = request.send().await.context("HTTP request failed")?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(300).collect();
            return Err(anyhow!("HTTP error {}: {}", status, snippet));
        }

        progress.total_bytes = response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());

        if let Err(e) = self.stream_to_file(response, &temp_path, &mut progress).await {
            fs::remove_file(&temp_path).await.ok();
            return Err(e);
        }

        if let Some(expected) = progress.total_bytes {
            if progress.downloaded_bytes != expected {
                fs::remove_file(&temp_path).await.ok();
                return Err(anyhow!(
                    "Download size mismatch: expected {} bytes, got {}",
                    expected,
                    progress.downloaded_bytes
                ));
            }
        }

        fs::rename(&temp_path, dest)
            .await
            .with_context(|| format!("Failed to move download into {}", dest.display()))?;

        info!(
            path = %dest.display(),
            bytes = progress.downloaded_bytes,
            speed = format!("{:.1} KB/s", progress.bytes_per_second() / 1024.0),
            "Download completed"
        );

        Ok(progress)
    }

    /// Stream response body to file with progress updates.
    async fn stream_to_file(
        &self,
        response: Response,
        path: &Path,
        progress: &mut DownloadProgress,
    ) -> Result<()> {
        let mut file = File::create(path)
            .await
            .context("Failed to open output file")?;

        let mut stream = response.bytes_stream();
        let mut bytes_since_update = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Error reading response chunk")?;

            file.write_all(&chunk)
                .await
                .context("Error writing to file")?;

            progress.downloaded_bytes += chunk.len() as u64;
            progress.last_update = Utc::now();
            bytes_since_update += chunk.len() as u64;

            if bytes_since_update >= PROGRESS_INTERVAL {
                bytes_since_update = 0;
                debug!(
                    downloaded = progress.downloaded_bytes,
                    total = ?progress.total_bytes,
                    percent = ?progress.percent_complete().map(|p| format!("{:.1}%", p)),
                    "Download progress"
                );
            }
        }

        // Flush and sync
        file.flush().await?;
        file.sync_all().await?;

        Ok(())
    }
}
