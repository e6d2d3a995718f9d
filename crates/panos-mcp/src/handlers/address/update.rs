use serde::Deserialize;
use serde_json::json;

use panos_core::{AddressObject, AddressUpdate, mutation};

use crate::error::{RegistryError, ToolError};
use crate::registry::{Command, CommandRegistry, Context, handler};

#[derive(Debug, Deserialize)]
struct Args {
    name: String,
    new_ip: Option<String>,
    new_description: Option<String>,
}

pub fn register(registry: &mut CommandRegistry) -> Result<(), RegistryError> {
    registry.register(Command::new(
        "update_address_object",
        "Update an existing address object. Only the supplied fields change.",
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Name of the address object to update" },
                "new_ip": { "type": "string", "description": "New IP address or CIDR" },
                "new_description": { "type": "string", "description": "New description; empty clears it" }
            },
            "required": ["name"]
        }),
        handler(run),
    )?)
}

async fn run(ctx: Context, args: Args) -> Result<String, ToolError> {
    let patch = AddressUpdate {
        value: args.new_ip,
        description: args.new_description,
    };
    mutation::check_update::<AddressObject, _>(&args.name, &patch)?;

    let session = ctx.session().await?;
    let updated: AddressObject = mutation::update(session.as_ref(), &args.name, patch).await?;
    Ok(format!("Successfully updated address object '{}'", updated.name))
}
