//! Ephemeris data-file configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default remote location of the ephemeris data files.
pub const DEFAULT_BASE_URL: &str = "https://erkanerdem.net/ephe/";

/// Data files fetched by default: planets, Moon and main asteroids, 1800 to 2400.
pub const DEFAULT_FILES: [&str; 3] = ["sepl_00.se1", "semo_00.se1", "seas_00.se1"];

/// Environment variables that mark a read-only serverless filesystem.
const EPHEMERAL_HOST_MARKERS: [&str; 3] = ["VERCEL", "NETLIFY", "GAE_SERVICE"];

/// Where ephemeris data files live and how to fetch them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EphemerisConfig {
    /// Local directory holding the data files.
    pub data_dir: PathBuf,
    /// Base URL the files are downloaded from.
    pub base_url: String,
    /// File names to ensure.
    pub files: Vec<String>,
    /// HTTP timeout per download.
    pub timeout: Duration,
}

impl Default for EphemerisConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("ephe"),
            base_url: DEFAULT_BASE_URL.to_string(),
            files: DEFAULT_FILES.iter().map(|f| (*f).to_string()).collect(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl EphemerisConfig {
    /// Builds a configuration from the process environment.
    ///
    /// - `ORBIS_EPHE_PATH` overrides the data directory
    /// - `ORBIS_EPHE_BASE_URL` overrides the download location
    /// - on Vercel, Netlify or App Engine the directory defaults to `/tmp/ephe`
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if EPHEMERAL_HOST_MARKERS.iter().any(|k| lookup(k).is_some()) {
            config.data_dir = PathBuf::from("/tmp/ephe");
        }
        if let Some(path) = lookup("ORBIS_EPHE_PATH").filter(|p| !p.is_empty()) {
            config.data_dir = PathBuf::from(path);
        }
        if let Some(url) = lookup("ORBIS_EPHE_BASE_URL").filter(|u| !u.is_empty()) {
            config.base_url = url;
        }
        config
    }

    /// Sets the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Sets the download base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the list of files to ensure.
    #[must_use]
    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Download URL of one file.
    #[must_use]
    pub fn url_for(&self, file: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), file)
    }
}
