//! Runtime configuration for the interpreter and its host client.
//!
//! [`Config`] controls the API endpoint, credentials, timeouts, group
//! evaluation parallelism and the report mode. Use [`Config::default()`]
//! for sensible defaults (public GitHub API, 30 s timeout, rayon's thread
//! count, verbose report).
//!
//! # Config file: `.padrc`
//!
//! TOML, looked up in two places:
//!
//! - **Global**: `~/.padrc`, applies to every repository
//! - **Local**: `.padrc` or `.github/padrc.toml`, searched upwards from the
//!   working directory; overrides global values
//!
//! ```toml
//! api_url = "https://github.example.com/api/v3"
//! http_timeout = 10
//! max_parallel_threads = 4
//! report_mode = "silent"
//! ```
//!
//! A missing `token` is filled from the `GITHUB_TOKEN` environment variable.

use crate::program::ReportMode;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// TOML-friendly intermediate representation (all fields optional).
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    /// Base URL of the REST API.
    api_url: Option<String>,
    /// Bearer token for API requests.
    token: Option<String>,
    /// HTTP timeout in seconds.
    http_timeout: Option<u64>,
    /// Max threads for filter-group evaluation (0 = rayon default).
    max_parallel_threads: Option<usize>,
    /// `silent` or `verbose`.
    report_mode: Option<ReportMode>,
}

/// Runtime configuration.
///
/// # Defaults
///
/// | Setting | Default |
/// |---------|---------|
/// | `api_url` | `https://api.github.com` |
/// | `token` | `None` |
/// | `http_timeout` | 30 s |
/// | `max_parallel_threads` | `0` (= rayon's global pool) |
/// | `report_mode` | `verbose` |
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub token: Option<String>,
    pub http_timeout: Duration,
    /// Maximum number of threads evaluating filter-group candidates.
    /// `0` means "use rayon's global pool".
    pub max_parallel_threads: usize,
    pub report_mode: ReportMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            http_timeout: Duration::from_secs(30),
            max_parallel_threads: 0,
            report_mode: ReportMode::Verbose,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration by merging global and local `.padrc` files,
    /// then falls back to `GITHUB_TOKEN` for the token.
    ///
    /// Returns `Config::default()` (plus the env token) if no files exist.
    pub fn load(start_dir: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(global_path) = Self::find_global_config() {
            config = Self::from_file(&global_path)?;
        }

        if let Some(local_path) = Self::find_local_config(start_dir) {
            let content = std::fs::read_to_string(&local_path)
                .with_context(|| format!("Failed to read config file: {}", local_path.display()))?;
            let local: ConfigFile = toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", local_path.display()))?;
            config.merge(local);
        }

        Ok(config.with_env_token(std::env::var("GITHUB_TOKEN").ok()))
    }

    /// Loads configuration from a specific file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_str(toml_str: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(toml_str).context("Failed to parse config")?;
        let mut config = Self::default();
        config.merge(file);
        Ok(config)
    }

    fn merge(&mut self, file: ConfigFile) {
        if let Some(url) = file.api_url {
            self.api_url = url;
        }
        if file.token.is_some() {
            self.token = file.token;
        }
        if let Some(timeout) = file.http_timeout {
            self.http_timeout = Duration::from_secs(timeout);
        }
        if let Some(threads) = file.max_parallel_threads {
            self.max_parallel_threads = threads;
        }
        if let Some(mode) = file.report_mode {
            self.report_mode = mode;
        }
    }

    /// Uses `token` only when no token was configured.
    pub fn with_env_token(mut self, token: Option<String>) -> Self {
        if self.token.is_none() {
            self.token = token.filter(|t| !t.is_empty());
        }
        self
    }

    fn find_global_config() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".padrc")).filter(|p| p.is_file())
    }

    /// Walks up from `start_dir` looking for `.padrc` or `.github/padrc.toml`.
    fn find_local_config(start_dir: impl AsRef<Path>) -> Option<PathBuf> {
        let mut dir = start_dir.as_ref().to_path_buf();

        if let Ok(abs) = dir.canonicalize() {
            dir = abs;
        }

        loop {
            let rc_file = dir.join(".padrc");
            if rc_file.is_file() {
                return Some(rc_file);
            }

            let github_rc = dir.join(".github").join("padrc.toml");
            if github_rc.is_file() {
                return Some(github_rc);
            }

            if !dir.pop() {
                return None;
            }
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Builder: limit filter-group threads (`0` = rayon default).
    pub fn with_max_parallel_threads(mut self, n: usize) -> Self {
        self.max_parallel_threads = n;
        self
    }

    pub fn with_report_mode(mut self, mode: ReportMode) -> Self {
        self.report_mode = mode;
        self
    }
}
