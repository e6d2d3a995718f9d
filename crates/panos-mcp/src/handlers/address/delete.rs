use serde_json::json;

use panos_core::model::require;
use panos_core::{AddressObject, mutation};

use crate::error::{RegistryError, ToolError};
use crate::handlers::NameArgs;
use crate::registry::{Command, CommandRegistry, Context, handler};

pub fn register(registry: &mut CommandRegistry) -> Result<(), RegistryError> {
    registry.register(Command::new(
        "delete_address_object",
        "Delete an address object from the firewall.",
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Name of the address object to delete" }
            },
            "required": ["name"]
        }),
        handler(run),
    )?)
}

async fn run(ctx: Context, args: NameArgs) -> Result<String, ToolError> {
    require("name", &args.name)?;

    let session = ctx.session().await?;
    let removed: AddressObject = mutation::delete(session.as_ref(), &args.name).await?;
    Ok(format!("Successfully deleted address object '{}'", removed.name))
}
