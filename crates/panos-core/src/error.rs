// ── Core error types ──
//
// Domain errors raised by the connection manager, mirror and mutation
// protocol. Handlers never see HTTP status codes or XML decode failures
// directly: the `From<panos_api::Error>` impl folds them into `Remote`.

use thiserror::Error;

use crate::model::EntityKind;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Caller errors ────────────────────────────────────────────────
    /// Arguments insufficient or malformed. No remote call was made.
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// The named entity is absent from the latest refresh.
    #[error("{kind} '{name}' not found")]
    NotFound { kind: EntityKind, name: String },

    // ── Device errors ────────────────────────────────────────────────
    /// The session could not be constructed. The manager stays
    /// unconnected so the next call retries.
    #[error("Cannot connect to firewall at {target}: {reason}")]
    Connection { target: String, reason: String },

    /// The device rejected or failed an operation. `message` is the
    /// device-supplied reason, verbatim.
    #[error("{message}")]
    Remote { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<panos_api::Error> for CoreError {
    fn from(err: panos_api::Error) -> Self {
        match err {
            panos_api::Error::Api { message, .. } => CoreError::Remote { message },
            panos_api::Error::Deserialization { message, body: _ } => CoreError::Remote {
                message: format!("Unexpected response from firewall: {message}"),
            },
            other => CoreError::Remote {
                message: other.to_string(),
            },
        }
    }
}
