// ── Runtime connection configuration ──
//
// Describes *which* firewall to talk to and how. Carries the credential
// but never touches disk: `panos-config` resolves files and environment
// into a `DeviceTarget` and hands it in.

use std::time::Duration;

use panos_api::{TlsMode, TransportConfig};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

/// Address, credential and transport tuning for a single firewall.
#[derive(Debug, Clone)]
pub struct DeviceTarget {
    /// Management interface URL (e.g., `https://192.168.1.1`).
    pub url: Url,
    /// XML API key.
    pub api_key: SecretString,
    /// Virtual system configuration requests are scoped to.
    pub vsys: String,
    /// TLS verification and request timeout.
    pub transport: TransportConfig,
}

impl DeviceTarget {
    pub fn new(url: Url, api_key: SecretString) -> Self {
        Self {
            url,
            api_key,
            vsys: "vsys1".into(),
            transport: TransportConfig::default(),
        }
    }

    pub fn with_vsys(mut self, vsys: impl Into<String>) -> Self {
        self.vsys = vsys.into();
        self
    }

    pub fn with_tls(mut self, tls: TlsMode) -> Self {
        self.transport.tls = tls;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.transport = self.transport.with_timeout(timeout);
        self
    }

    /// Host part of the URL, used in log lines and connection errors.
    pub fn address(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Both the address and the credential are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.address().is_empty() && !self.api_key.expose_secret().trim().is_empty()
    }
}
