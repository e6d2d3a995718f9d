// ── Registry, dispatch and handler errors ──
//
// None of these cross the dispatcher as values: handler errors become
// failure text, dispatch errors become failure text at the server, and
// registry errors are recorded in the load summary.

use thiserror::Error;

use panos_core::CoreError;

/// Raised while a handler unit defines or registers its command.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The command definition itself is unusable.
    #[error("invalid command definition '{name}': {reason}")]
    InvalidDefinition { name: String, reason: String },

    /// Another unit already owns this command name.
    #[error("command '{name}' is already registered")]
    Duplicate { name: String },
}

/// Raised inside a handler; rendered as the handler's failure text.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Raised by the dispatcher itself, never by a handler.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Unknown command '{name}'")]
    UnknownCommand { name: String },

    #[error("Command '{command}' crashed: {reason}")]
    HandlerCrashed { command: String, reason: String },
}
