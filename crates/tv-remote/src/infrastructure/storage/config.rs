//! TOML configuration file.
//!
//! The file is optional.  When `--config` is not given, the platform default
//! is read if it exists:
//! - Windows:  `%APPDATA%\tv-remote\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/tv-remote/config.toml` (or `~/.config/...`)
//! - macOS:    `~/Library/Application Support/tv-remote/config.toml`
//!
//! Every field is optional in the file; missing fields take the built-in
//! default.  Command-line flags and environment variables override the file.
//!
//! ```toml
//! port = 8002
//! search_target = "urn:schemas-upnp-org:device:MediaRenderer:1"
//! discovery_timeout = 5
//! http_timeout = 5
//! app_id = "samsung.remote.control"
//! log_level = "warn"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tv_remote_core::protocol::messages::{DEFAULT_APP_ID, DEFAULT_TV_PORT};
use tv_remote_core::ssdp::{DEFAULT_DISCOVERY_TIMEOUT_SECS, DEFAULT_SEARCH_TARGET};

/// Errors loading or rendering the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config base directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// The config file could not be read.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`RemoteConfig`].
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The effective config could not be rendered as TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Effective settings for one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteConfig {
    /// TCP port of the TV's control endpoint.
    #[serde(default = "default_port")]
    pub port: u16,
    /// SSDP `ST` header.
    #[serde(default = "default_search_target")]
    pub search_target: String,
    /// Discovery window in seconds.
    #[serde(default = "default_discovery_timeout")]
    pub discovery_timeout: u64,
    /// Per-request timeout for descriptor fetches, in seconds.
    #[serde(default = "default_http_timeout")]
    pub http_timeout: u64,
    /// Application id in the control endpoint path.
    #[serde(default = "default_app_id")]
    pub app_id: String,
    /// `tracing` level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    DEFAULT_TV_PORT
}
fn default_search_target() -> String {
    DEFAULT_SEARCH_TARGET.to_string()
}
fn default_discovery_timeout() -> u64 {
    DEFAULT_DISCOVERY_TIMEOUT_SECS
}
fn default_http_timeout() -> u64 {
    5
}
fn default_app_id() -> String {
    DEFAULT_APP_ID.to_string()
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            search_target: default_search_target(),
            discovery_timeout: default_discovery_timeout(),
            http_timeout: default_http_timeout(),
            app_id: default_app_id(),
            log_level: default_log_level(),
        }
    }
}

/// Reads and parses the config file at `path`.
///
/// # Errors
///
/// [`ConfigError::Io`] if the file cannot be read (including not found),
/// [`ConfigError::Parse`] if it is not valid TOML for [`RemoteConfig`].
pub fn load_config(path: &Path) -> Result<RemoteConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Loads the platform default config file, or the defaults if it does not
/// exist.
///
/// # Errors
///
/// As [`load_config`], except that a missing file or an undeterminable
/// config directory is not an error.
pub fn load_default_config() -> Result<RemoteConfig, ConfigError> {
    let path = match default_config_path() {
        Ok(path) => path,
        Err(ConfigError::NoPlatformConfigDir) => return Ok(RemoteConfig::default()),
        Err(e) => return Err(e),
    };
    match load_config(&path) {
        Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            Ok(RemoteConfig::default())
        }
        other => other,
    }
}

/// Full path of the platform default config file.
///
/// # Errors
///
/// [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined from the environment.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Renders `config` as TOML (for `--print-config`).
///
/// # Errors
///
/// [`ConfigError::Serialize`] if serialisation fails.
pub fn to_toml_string(config: &RemoteConfig) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(config)?)
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("tv-remote"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("tv-remote"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("tv-remote")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
