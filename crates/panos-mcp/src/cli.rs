//! Clap derive structures for the `panos-mcp` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// panos-mcp -- firewall configuration commands over the MCP stdio transport
#[derive(Debug, Parser)]
#[command(
    name = "panos-mcp",
    version,
    about = "Serve Palo Alto Networks firewall commands to MCP clients",
    long_about = "Exposes address object, security policy and operational commands\n\
        for a PAN-OS firewall over line-delimited JSON-RPC on stdin/stdout.\n\n\
        The firewall is addressed by FIREWALL_IP and authenticated with\n\
        FIREWALL_API_KEY.",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    /// Defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config dir)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Directory for the `mcp_server.log` files (overrides config)
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve commands on stdin/stdout until the client disconnects
    Serve,

    /// List registered commands and the handler load summary
    Tools,

    /// Dispatch one command and print its result text
    Call(CallArgs),

    /// Print the effective configuration with the API key redacted
    Config,
}

#[derive(Debug, Args)]
pub struct CallArgs {
    /// Command name, e.g. list_address_objects
    pub name: String,

    /// Arguments as a JSON object
    #[arg(long, default_value = "{}")]
    pub args: String,
}
