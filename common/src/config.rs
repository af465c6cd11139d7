//! # Run Configuration
//!
//! Loaded once at startup and immutable afterwards. Layers, lowest priority first:
//!
//! 1. built-in defaults ([`Config::default`]),
//! 2. a TOML file (explicit path, or [`DEFAULT_CONFIG_FILE`] when present),
//! 3. `PROXYSIFT_*` environment variables (`__` separates nested keys),
//! 4. command-line overrides, applied by the binary.
//!
//! [`Config::validate`] must pass before any source is fetched.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "proxysift.toml";
pub const ENV_PREFIX: &str = "PROXYSIFT";

pub const DEFAULT_TARGET_URL: &str = "https://cf-clearance.pages.dev";
pub const DEFAULT_CHALLENGE_MARKER: &str = "Just a moment...";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/128.0.0.0 Safari/537.36";

/// Fatal configuration problems. Nothing is fetched or probed once one of these occurs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeBackend {
    /// Route an HTTP client through the endpoint.
    #[default]
    Http,
    /// Drive a headless browser through the endpoint.
    Browser,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub backend: ProbeBackend,
    /// Text whose presence in the verification page means the endpoint was challenged.
    pub challenge_marker: String,
    pub user_agent: String,
    /// Executable used by the browser backend.
    pub browser_path: PathBuf,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            backend: ProbeBackend::Http,
            challenge_marker: DEFAULT_CHALLENGE_MARKER.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            browser_path: PathBuf::from("chromium"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Commit and push the output file after writing it.
    pub enabled: bool,
    pub commit_message: String,
    pub author_name: String,
    pub author_email: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            commit_message: "Update IPs".to_string(),
            author_name: "Bot".to_string(),
            author_email: "bot@example.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URLs or local paths holding candidate lists.
    pub sources: Vec<String>,
    /// Page loaded through every candidate.
    pub target_url: String,
    /// Port used for candidates that do not carry one.
    pub default_port: u16,
    pub output_path: PathBuf,
    /// Maximum number of probes running at once.
    pub concurrency: usize,
    pub timeout_ms: u64,
    pub debug: bool,
    pub source_timeout_ms: u64,
    pub probe: ProbeConfig,
    pub publish: PublishConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            target_url: DEFAULT_TARGET_URL.to_string(),
            default_port: 443,
            output_path: PathBuf::from("pyip.txt"),
            concurrency: 30,
            timeout_ms: 30_000,
            debug: false,
            source_timeout_ms: 15_000,
            probe: ProbeConfig::default(),
            publish: PublishConfig::default(),
        }
    }
}

impl Config {
    /// Loads the file and environment layers on top of the defaults.
    ///
    /// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
    /// read from the working directory if it is there.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path)
                .format(config::FileFormat::Toml)
                .required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let cfg = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("sources")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Config>()?;

        Ok(cfg)
    }

    /// Checks every option the pipeline depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.iter().all(|s| s.trim().is_empty()) {
            return Err(ConfigError::invalid("sources", "no candidate sources configured"));
        }

        let target = Url::parse(&self.target_url)
            .map_err(|e| ConfigError::invalid("target_url", format!("{}: {e}", self.target_url)))?;
        if !matches!(target.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "target_url",
                format!("unsupported scheme `{}`", target.scheme()),
            ));
        }

        if self.default_port == 0 {
            return Err(ConfigError::invalid("default_port", "must be between 1 and 65535"));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::invalid("concurrency", "must be at least 1"));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::invalid("timeout_ms", "must be at least 1"));
        }
        if self.source_timeout_ms == 0 {
            return Err(ConfigError::invalid("source_timeout_ms", "must be at least 1"));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(ConfigError::invalid("output_path", "must not be empty"));
        }
        if self.probe.challenge_marker.is_empty() {
            return Err(ConfigError::invalid("probe.challenge_marker", "must not be empty"));
        }

        Ok(())
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_millis(self.source_timeout_ms)
    }

    /// Non-empty source locations, trimmed.
    pub fn source_locations(&self) -> Vec<String> {
        self.sources
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
