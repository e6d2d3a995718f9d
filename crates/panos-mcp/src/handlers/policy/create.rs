use serde::Deserialize;
use serde_json::json;

use panos_core::{Resource, RuleAction, SecurityRule, codec, mutation};

use crate::error::{RegistryError, ToolError};
use crate::registry::{Command, CommandRegistry, Context, handler};

#[derive(Debug, Deserialize)]
struct Args {
    name: String,
    source_zone: String,
    destination_zone: String,
    source_address: String,
    destination_address: String,
    application: Option<String>,
    action: Option<String>,
    description: Option<String>,
}

pub fn register(registry: &mut CommandRegistry) -> Result<(), RegistryError> {
    registry.register(Command::new(
        "create_security_policy",
        "Create a security policy. Zone, address and application fields take comma-separated lists.",
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Rule name" },
                "source_zone": { "type": "string", "description": "Source zones, e.g. \"trust,dmz\"" },
                "destination_zone": { "type": "string", "description": "Destination zones, e.g. \"untrust\"" },
                "source_address": { "type": "string", "description": "Source addresses, e.g. \"any\"" },
                "destination_address": { "type": "string", "description": "Destination addresses, e.g. \"8.8.8.8,10.0.0.1\"" },
                "application": { "type": "string", "description": "Applications, e.g. \"dns,ssh\"", "default": "any" },
                "action": {
                    "type": "string",
                    "enum": ["allow", "deny", "drop", "reset-client", "reset-server", "reset-both"],
                    "default": "allow"
                },
                "description": { "type": "string" }
            },
            "required": ["name", "source_zone", "destination_zone", "source_address", "destination_address"]
        }),
        handler(run),
    )?)
}

async fn run(ctx: Context, args: Args) -> Result<String, ToolError> {
    let action = match args.action.as_deref() {
        Some(raw) => RuleAction::parse(raw)?,
        None => RuleAction::Allow,
    };
    let rule = SecurityRule {
        name: args.name,
        source_zones: codec::split_list(&args.source_zone),
        destination_zones: codec::split_list(&args.destination_zone),
        source_addresses: codec::split_list(&args.source_address),
        destination_addresses: codec::split_list(&args.destination_address),
        applications: codec::split_list(args.application.as_deref().unwrap_or("any")),
        action,
        description: args.description.filter(|d| !d.is_empty()),
        ..SecurityRule::default()
    };
    rule.validate()?;

    let session = ctx.session().await?;
    let created = mutation::create(session.as_ref(), rule).await?;
    Ok(format!("Successfully created security policy '{}'", created.name))
}
