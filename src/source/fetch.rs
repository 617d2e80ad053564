//! Module index download.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context};

use crate::error::{CheckError, Result};

/// Whether a download actually happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    Downloaded,
    AlreadyPresent,
}

/// Fetches the module index over HTTP.
///
/// # Example
///
/// ```no_run
/// use avm_check::source::SourceFetcher;
/// use std::path::Path;
/// use std::time::Duration;
///
/// let fetcher = SourceFetcher::new(Duration::from_secs(30)).unwrap();
/// fetcher
///     .download_if_needed("https://example.com/modules.csv", Path::new("modules.csv"), false)
///     .unwrap();
/// ```
pub struct SourceFetcher {
    client: reqwest::blocking::Client,
}

impl SourceFetcher {
    /// Create a fetcher with the specified request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    /// Download `url` to `path`, replacing any existing file.
    ///
    /// The body is written to a temporary file next to `path` first, so a
    /// failed download never leaves a truncated index behind.
    pub fn download(&self, url: &str, path: &Path) -> Result<()> {
        tracing::info!("Downloading module index from {}", url);
        let body = self.fetch(url).map_err(|e| CheckError::Source {
            message: format!("failed to download CSV: {:#}", e),
        })?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(&body)?;
        file.persist(path).map_err(|e| CheckError::Source {
            message: format!("failed to save CSV to {}: {}", path.display(), e.error),
        })?;

        tracing::debug!("Wrote {} bytes to {}", body.len(), path.display());
        Ok(())
    }

    /// Download unless `path` already exists, or always when `force` is set.
    pub fn download_if_needed(&self, url: &str, path: &Path, force: bool) -> Result<DownloadStatus> {
        if path.exists() && !force {
            tracing::debug!("{} already exists, skipping download", path.display());
            return Ok(DownloadStatus::AlreadyPresent);
        }
        self.download(url, path)?;
        Ok(DownloadStatus::Downloaded)
    }

    fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            return Err(anyhow!("received status code {}", response.status().as_u16()));
        }

        let body = response
            .bytes()
            .with_context(|| format!("Failed to read response from {}", url))?;
        Ok(body.to_vec())
    }
}
