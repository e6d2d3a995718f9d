use thiserror::Error;

/// Top-level error type for the `panos-api` crate.
///
/// Covers every failure mode of the XML API: authentication, transport,
/// the `<response status="error">` envelope, and XML decoding.
/// `panos-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// API key rejected (HTTP 401/403 or an auth error envelope).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Non-success HTTP status without an XML envelope.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── XML API ─────────────────────────────────────────────────────
    /// The device answered `<response status="error">`. `message` is the
    /// device-supplied reason, verbatim.
    #[error("{message}")]
    Api {
        code: Option<String>,
        message: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// XML decoding failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the device refused the credential.
    pub fn is_auth(&self) -> bool {
        match self {
            Self::Authentication { .. } => true,
            // PAN-OS reports a bad key as error code 403 in the envelope.
            Self::Api { code, .. } => code.as_deref() == Some("403"),
            _ => false,
        }
    }

    /// Returns `true` if the failure happened before the device answered.
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout(),
            Self::Tls(_) => true,
            _ => false,
        }
    }

    /// Extract the XML API error code, if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
