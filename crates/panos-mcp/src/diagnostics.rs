//! Startup and one-shot failures of the binary, with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

use panos_config::ConfigError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const COMMAND_FAILED: i32 = 4;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("No firewall API key configured")]
    #[diagnostic(
        code(panos_mcp::no_credentials),
        help(
            "Set FIREWALL_API_KEY (and FIREWALL_IP) in the environment,\n\
             or api_key/host in the config file."
        )
    )]
    NoCredentials,

    #[error("Configuration error")]
    #[diagnostic(code(panos_mcp::config))]
    Config {
        #[source]
        source: ConfigError,
    },

    #[error("Invalid command arguments: {reason}")]
    #[diagnostic(
        code(panos_mcp::usage),
        help("Pass arguments as a JSON object, e.g. --args '{{\"name\": \"Server1\"}}'")
    )]
    InvalidArguments { reason: String },

    #[error("Command '{name}' failed")]
    #[diagnostic(code(panos_mcp::command_failed))]
    CommandFailed { name: String },

    #[error(transparent)]
    #[diagnostic(code(panos_mcp::io))]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoCredentials | Self::Config { .. } => exit_code::CONFIG,
            Self::InvalidArguments { .. } => exit_code::USAGE,
            Self::CommandFailed { .. } => exit_code::COMMAND_FAILED,
            Self::Io(_) => exit_code::GENERAL,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials => Self::NoCredentials,
            source => Self::Config { source },
        }
    }
}
