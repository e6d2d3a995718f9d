use serde::Deserialize;
use serde_json::json;

use panos_core::{AddressObject, Resource, mutation};

use crate::error::{RegistryError, ToolError};
use crate::registry::{Command, CommandRegistry, Context, handler};

#[derive(Debug, Deserialize)]
struct Args {
    name: String,
    ip_address: String,
    description: Option<String>,
}

pub fn register(registry: &mut CommandRegistry) -> Result<(), RegistryError> {
    registry.register(Command::new(
        "create_address_object",
        "Create an address object on the firewall.",
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Name of the address object" },
                "ip_address": { "type": "string", "description": "IP address or CIDR, e.g. 192.168.1.10 or 10.0.0.0/24" },
                "description": { "type": "string", "description": "Optional description" }
            },
            "required": ["name", "ip_address"]
        }),
        handler(run),
    )?)
}

async fn run(ctx: Context, args: Args) -> Result<String, ToolError> {
    let object = AddressObject::ip_netmask(args.name, args.ip_address.trim())
        .with_description(args.description);
    object.validate()?;

    let session = ctx.session().await?;
    let created = mutation::create(session.as_ref(), object).await?;
    Ok(format!(
        "Successfully created address object '{}' with IP {}",
        created.name, created.value
    ))
}
