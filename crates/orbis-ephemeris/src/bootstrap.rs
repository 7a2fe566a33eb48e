//! Idempotent download of ephemeris data files.
//!
//! Each file is guarded by its own async lock, so concurrent callers wait for
//! one download instead of racing. Downloads land in a temporary sibling and
//! are renamed into place, and presence is re-checked after every attempt.
//!
//! [`AnalyticEphemeris`](crate::AnalyticEphemeris) does not read these files.
//! They are fetched for providers that do, and their presence does not change
//! the analytic provider's precision.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use orbis_core::{ChartError, Result};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::config::EphemerisConfig;

/// User agent for HTTP requests.
const USER_AGENT: &str = concat!("orbis-ephemeris/", env!("CARGO_PKG_VERSION"));

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// The file was already present and non-empty.
    Present,
    /// The file was fetched.
    Downloaded {
        /// Bytes written.
        bytes: u64,
    },
    /// The file is still missing.
    Failed {
        /// Reason for the failure.
        error: String,
    },
}

/// Per-file result of [`EphemerisFiles::ensure_all`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStatus {
    /// File name.
    pub file: String,
    /// Outcome.
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// Summary of a bootstrap run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    /// One entry per configured file, in configuration order.
    pub files: Vec<FileStatus>,
}

impl BootstrapReport {
    /// Returns `true` when every file is available.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.files
            .iter()
            .all(|f| !matches!(f.outcome, FileOutcome::Failed { .. }))
    }
}

/// Ensures the configured data files exist locally.
#[derive(Debug)]
pub struct EphemerisFiles {
    config: EphemerisConfig,
    client: reqwest::Client,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl EphemerisFiles {
    /// Creates a bootstrapper for a configuration.
    ///
    /// # Errors
    /// Returns [`ChartError::Network`] if the HTTP client cannot be built.
    pub fn new(config: EphemerisConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ChartError::Network(e.to_string()))?;
        Ok(Self::with_client(config, client))
    }

    /// Creates a bootstrapper with a custom HTTP client.
    #[must_use]
    pub fn with_client(config: EphemerisConfig, client: reqwest::Client) -> Self {
        Self {
            config,
            client,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &EphemerisConfig {
        &self.config
    }

    /// Local path of a data file.
    #[must_use]
    pub fn path_for(&self, file: &str) -> PathBuf {
        self.config.data_dir.join(file)
    }

    /// Ensures every configured file is present.
    ///
    /// Never fails as a whole; per-file failures are reported in the result.
    #[instrument(skip(self), fields(dir = %self.config.data_dir.display()))]
    pub async fn ensure_all(&self) -> BootstrapReport {
        let mut report = BootstrapReport::default();
        for file in &self.config.files {
            let outcome = match self.ensure_file(file).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(file = %file, error = %e, "Ephemeris file unavailable");
                    FileOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            report.files.push(FileStatus {
                file: file.clone(),
                outcome,
            });
        }
        report
    }

    /// Ensures one file is present, downloading it if needed.
    ///
    /// # Errors
    /// Returns an error when the download or the final check fails.
    #[instrument(skip(self))]
    pub async fn ensure_file(&self, file: &str) -> Result<FileOutcome> {
        if file.is_empty() || file.contains('/') || file.contains("..") {
            return Err(ChartError::InvalidInput(format!(
                "Invalid ephemeris file name: {file}"
            )));
        }

        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(
                locks
                    .entry(file.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        let _guard = lock.lock().await;

        let path = self.path_for(file);
        if is_present(&path).await {
            debug!(path = %path.display(), "Ephemeris file present");
            return Ok(FileOutcome::Present);
        }

        let bytes = self.download(file, &path).await?;
        if !is_present(&path).await {
            return Err(ChartError::Other(format!(
                "{} missing after download",
                path.display()
            )));
        }
        info!(file, bytes, "Downloaded ephemeris file");
        Ok(FileOutcome::Downloaded { bytes })
    }

    async fn download(&self, file: &str, path: &Path) -> Result<u64> {
        let url = self.config.url_for(file);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ChartError::Network(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ChartError::Network(format!(
                "HTTP {} for {}",
                response.status(),
                url
            )));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| ChartError::Network(e.to_string()))?;
        if body.is_empty() {
            return Err(ChartError::Network(format!("Empty body for {url}")));
        }

        tokio::fs::create_dir_all(&self.config.data_dir).await?;
        let tmp = path.with_file_name(format!(".{file}.part.{}", std::process::id()));
        if let Err(e) = tokio::fs::write(&tmp, &body).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        tokio::fs::rename(&tmp, path).await?;
        Ok(body.len() as u64)
    }
}

async fn is_present(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}
