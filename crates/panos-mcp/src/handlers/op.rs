use serde::Deserialize;
use serde_json::json;
use tracing::info;

use panos_core::CoreError;

use crate::error::{RegistryError, ToolError};
use crate::registry::{Command, CommandRegistry, Context, handler};

#[derive(Debug, Deserialize)]
struct Args {
    command: String,
}

pub fn register(registry: &mut CommandRegistry) -> Result<(), RegistryError> {
    registry.register(Command::new(
        "run_op_command",
        "Run an operational CLI command on the firewall and return its raw output.",
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "Operational command, e.g. \"show system info\" or \"show interface all\""
                }
            },
            "required": ["command"]
        }),
        handler(run),
    )?)
}

async fn run(ctx: Context, args: Args) -> Result<String, ToolError> {
    let command = args.command.trim();
    if command.is_empty() {
        return Err(CoreError::validation("command is required").into());
    }
    let session = ctx.session().await?;
    info!(command, "running operational command");
    let output = session.run_op(command).await?;
    Ok(format!("Output for '{command}':\n\n{output}"))
}
