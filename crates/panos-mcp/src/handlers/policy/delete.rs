use serde_json::json;

use panos_core::model::require;
use panos_core::{SecurityRule, mutation};

use crate::error::{RegistryError, ToolError};
use crate::handlers::NameArgs;
use crate::registry::{Command, CommandRegistry, Context, handler};

pub fn register(registry: &mut CommandRegistry) -> Result<(), RegistryError> {
    registry.register(Command::new(
        "delete_security_policy",
        "Delete a security policy by name.",
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Rule name" }
            },
            "required": ["name"]
        }),
        handler(run),
    )?)
}

async fn run(ctx: Context, args: NameArgs) -> Result<String, ToolError> {
    require("name", &args.name)?;

    let session = ctx.session().await?;
    let removed: SecurityRule = mutation::delete(session.as_ref(), &args.name).await?;
    Ok(format!("Successfully deleted security policy '{}'", removed.name))
}
