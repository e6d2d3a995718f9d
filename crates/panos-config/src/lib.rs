//! Configuration for the panos-mcp server.
//!
//! Serialized defaults, then an optional TOML file, then the environment.
//! `FIREWALL_IP` and `FIREWALL_API_KEY` supply the device address and
//! credential; `PANOS_MCP_*` variables override any other field.
//! [`resolve_target`] turns the result into a `panos_core::DeviceTarget`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use panos_api::TlsMode;
use panos_core::DeviceTarget;

/// Environment variable holding the firewall address.
pub const HOST_ENV: &str = "FIREWALL_IP";
/// Environment variable holding the XML API key.
pub const API_KEY_ENV: &str = "FIREWALL_API_KEY";
/// Prefix for every other override, e.g. `PANOS_MCP_VSYS`.
pub const ENV_PREFIX: &str = "PANOS_MCP_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured (set {API_KEY_ENV})")]
    NoCredentials,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config struct ───────────────────────────────────────────────────

/// Effective server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Firewall management address: a host, IP, or full URL.
    pub host: Option<String>,

    /// XML API key (prefer the environment over the file).
    pub api_key: Option<String>,

    /// Virtual system configuration requests are scoped to.
    #[serde(default = "default_vsys")]
    pub vsys: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Verify the management certificate against the system roots.
    #[serde(default)]
    pub verify_tls: bool,

    /// Trust this PEM CA instead; implies verification.
    pub ca_cert: Option<PathBuf>,

    /// Directory for `mcp_server.log`.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: None,
            api_key: None,
            vsys: default_vsys(),
            timeout_secs: default_timeout(),
            verify_tls: false,
            ca_cert: None,
            log_dir: default_log_dir(),
        }
    }
}

fn default_vsys() -> String {
    "vsys1".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

impl Config {
    /// Render as TOML with the API key masked.
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        let mut shown = self.clone();
        if shown.api_key.as_deref().is_some_and(|k| !k.is_empty()) {
            shown.api_key = Some("********".into());
        }
        Ok(toml::to_string_pretty(&shown)?)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Platform config file, e.g. `~/.config/panos-mcp/config.toml`.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "panos-mcp", "panos-mcp").map_or_else(
        || PathBuf::from("panos-mcp.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// The layered provider chain. A missing file contributes nothing.
pub fn figment(path: Option<&Path>) -> Figment {
    let path = path.map_or_else(config_path, Path::to_path_buf);

    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
        .merge(Env::raw().only(&[HOST_ENV]).map(|_| "host".into()))
        .merge(Env::raw().only(&[API_KEY_ENV]).map(|_| "api_key".into()))
}

/// Load the effective config from defaults, file and environment.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    Ok(figment(path).extract()?)
}

// ── Target resolution ───────────────────────────────────────────────

/// Validate the address and credential and build a [`DeviceTarget`].
///
/// A bare host gets an `https://` scheme. A missing or blank key is
/// [`ConfigError::NoCredentials`].
pub fn resolve_target(config: &Config) -> Result<DeviceTarget, ConfigError> {
    let host = config
        .host
        .as_deref()
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ConfigError::Validation {
            field: "host".into(),
            reason: format!("firewall address is not set ({HOST_ENV})"),
        })?;

    let raw_url = if host.contains("://") {
        host.to_owned()
    } else {
        format!("https://{host}")
    };
    let url: url::Url = raw_url.parse().map_err(|e| ConfigError::Validation {
        field: "host".into(),
        reason: format!("'{host}' is not a valid address: {e}"),
    })?;

    let api_key = config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(ConfigError::NoCredentials)?;

    let tls = if let Some(ref ca) = config.ca_cert {
        TlsMode::CustomCa(ca.clone())
    } else if config.verify_tls {
        TlsMode::System
    } else {
        // Management interfaces ship self-signed certificates.
        TlsMode::DangerAcceptInvalid
    };

    Ok(DeviceTarget::new(url, SecretString::from(api_key.to_owned()))
        .with_vsys(config.vsys.clone())
        .with_tls(tls)
        .with_timeout(Duration::from_secs(config.timeout_secs)))
}
