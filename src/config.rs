//! Configuration loaded from `~/.config/anisrc/config.toml`.
//!
//! Every table and field is optional; a missing file yields the built-in
//! defaults, which point at the live sites.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::fingerprint::FingerprintOptions;

/// Nonce-retrieval action identifier of the Otakudesu AJAX endpoint.
pub const OTAKUDESU_NONCE_ACTION: &str = "aa1208d27f29ca340c92c66d1926f13f";
/// Stream-resolution action identifier of the Otakudesu AJAX endpoint.
pub const OTAKUDESU_STREAM_ACTION: &str = "2a3505c93b0035d3f455df82bf976b84";

/// Connection settings shared by both sources.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Origin of the site, without trailing slash.
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra attempts after a transport failure.
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,
}

impl SourceConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: default_timeout_secs(),
            retry_limit: default_retry_limit(),
        }
    }

    /// Base URL with any trailing slash removed.
    #[must_use]
    pub fn origin(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Otakudesu settings, including the opaque AJAX action identifiers.
///
/// The identifiers are site constants; they only need changing here if the
/// site rotates them.
#[derive(Debug, Clone, Deserialize)]
pub struct OtakudesuConfig {
    #[serde(flatten)]
    pub source: SourceConfig,
    #[serde(default = "default_nonce_action")]
    pub nonce_action: String,
    #[serde(default = "default_stream_action")]
    pub stream_action: String,
}

impl OtakudesuConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            source: SourceConfig::new(base_url),
            nonce_action: default_nonce_action(),
            stream_action: default_stream_action(),
        }
    }
}

impl Default for OtakudesuConfig {
    fn default() -> Self {
        Self::new("https://otakudesu.best")
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub otakudesu: OtakudesuConfig,
    #[serde(default = "default_samehadaku")]
    pub samehadaku: SourceConfig,
    #[serde(default)]
    pub fingerprint: FingerprintOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            otakudesu: OtakudesuConfig::default(),
            samehadaku: default_samehadaku(),
            fingerprint: FingerprintOptions::default(),
        }
    }
}

impl Config {
    /// Load from the default location.
    ///
    /// Returns the defaults if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("invalid TOML in {}", path.display()))
    }
}

/// Return the path to the config file.
#[must_use]
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("anisrc")
        .join("config.toml")
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_retry_limit() -> u32 {
    3
}

fn default_nonce_action() -> String {
    OTAKUDESU_NONCE_ACTION.to_string()
}

fn default_stream_action() -> String {
    OTAKUDESU_STREAM_ACTION.to_string()
}

fn default_samehadaku() -> SourceConfig {
    SourceConfig::new("https://v1.samehadaku.how")
}
