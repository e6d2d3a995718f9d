mod cli;
mod diagnostics;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use serde_json::{Map, Value};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use panos_config::Config;
use panos_core::ConnectionManager;
use panos_mcp::{Dispatcher, handlers, registry, server::Server};

use crate::cli::{CallArgs, Cli, Command};
use crate::diagnostics::CliError;

const LOG_FILE: &str = "mcp_server.log";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = panos_config::load_config(cli.global.config.as_deref())?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Config => {
            print!("{}", config.to_redacted_toml()?);
            Ok(())
        }

        Command::Tools => {
            let _guard = init_tracing(cli.global.verbose, None);
            let (registry, summary) = registry::discover(handlers::UNITS);
            for command in registry.commands() {
                println!("{:<26} {}", command.name(), command.description());
            }
            println!();
            println!("{}", summary.render());
            Ok(())
        }

        Command::Call(args) => {
            let log_dir = cli.global.log_dir.unwrap_or_else(|| config.log_dir.clone());
            let _guard = init_tracing(cli.global.verbose.saturating_add(1), Some(&log_dir));
            call(&config, args).await
        }

        Command::Serve => {
            let log_dir = cli.global.log_dir.unwrap_or_else(|| config.log_dir.clone());
            let _guard = init_tracing(cli.global.verbose.saturating_add(1), Some(&log_dir));
            serve(&config).await
        }
    }
}

fn dispatcher(config: &Config) -> Result<Dispatcher, CliError> {
    let target = panos_config::resolve_target(config)?;
    let (registry, summary) = registry::discover(handlers::UNITS);
    if summary.failed() > 0 {
        tracing::warn!(failed = summary.failed(), "some handler units did not register");
    }
    let connection = Arc::new(ConnectionManager::xml_api(target));
    Ok(Dispatcher::new(Arc::new(registry), connection))
}

async fn serve(config: &Config) -> Result<(), CliError> {
    let dispatcher = dispatcher(config)?;
    tracing::info!(
        commands = dispatcher.registry().len(),
        "serving on stdio"
    );
    Server::new(dispatcher)
        .serve(tokio::io::stdin(), tokio::io::stdout())
        .await?;
    tracing::info!("client disconnected");
    Ok(())
}

async fn call(config: &Config, args: CallArgs) -> Result<(), CliError> {
    let arguments: Map<String, Value> =
        serde_json::from_str(&args.args).map_err(|e| CliError::InvalidArguments {
            reason: e.to_string(),
        })?;
    let dispatcher = dispatcher(config)?;

    let outcome = dispatcher.call(&args.name, arguments).await;
    println!("{outcome}");
    if outcome.is_error {
        return Err(CliError::CommandFailed { name: args.name });
    }
    Ok(())
}

/// Log to stderr, and to a daily `mcp_server.log` under `log_dir` when
/// given. Stdout carries the protocol and never gets log output.
fn init_tracing(verbosity: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard, dir_error) = match log_dir.map(|dir| std::fs::create_dir_all(dir).map(|()| dir)) {
        Some(Ok(dir)) => {
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, LOG_FILE));
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard), None)
        }
        Some(Err(e)) => (None, None, Some(e)),
        None => (None, None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .init();

    if let Some(e) = dir_error {
        tracing::warn!(error = %e, "cannot create log directory, logging to stderr only");
    }
    guard
}
