use serde::Deserialize;
use serde_json::json;

use panos_core::{RuleAction, RuleUpdate, SecurityRule, codec::split_optional, mutation};

use crate::error::{RegistryError, ToolError};
use crate::registry::{Command, CommandRegistry, Context, handler};

// `action` is taken by workflow tools for their own bookkeeping, so the
// rule action travels as `action_type`.
#[derive(Debug, Deserialize)]
struct Args {
    name: String,
    source_zone: Option<String>,
    destination_zone: Option<String>,
    source_address: Option<String>,
    destination_address: Option<String>,
    application: Option<String>,
    action_type: Option<String>,
    description: Option<String>,
}

pub fn register(registry: &mut CommandRegistry) -> Result<(), RegistryError> {
    registry.register(Command::new(
        "update_security_policy",
        "Update an existing security policy. Only the supplied fields change; lists are replaced whole.",
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Rule name" },
                "source_zone": { "type": "string", "description": "New source zones, comma-separated" },
                "destination_zone": { "type": "string", "description": "New destination zones, comma-separated" },
                "source_address": { "type": "string", "description": "New source addresses, comma-separated" },
                "destination_address": { "type": "string", "description": "New destination addresses, comma-separated" },
                "application": { "type": "string", "description": "New applications, comma-separated" },
                "action_type": {
                    "type": "string",
                    "enum": ["allow", "deny", "drop", "reset-client", "reset-server", "reset-both"]
                },
                "description": { "type": "string", "description": "New description; empty clears it" }
            },
            "required": ["name"]
        }),
        handler(run),
    )?)
}

async fn run(ctx: Context, args: Args) -> Result<String, ToolError> {
    let patch = RuleUpdate {
        source_zones: split_optional(args.source_zone.as_deref()),
        destination_zones: split_optional(args.destination_zone.as_deref()),
        source_addresses: split_optional(args.source_address.as_deref()),
        destination_addresses: split_optional(args.destination_address.as_deref()),
        applications: split_optional(args.application.as_deref()),
        action: args.action_type.as_deref().map(RuleAction::parse).transpose()?,
        description: args.description,
    };
    mutation::check_update::<SecurityRule, _>(&args.name, &patch)?;

    let session = ctx.session().await?;
    let updated: SecurityRule = mutation::update(session.as_ref(), &args.name, patch).await?;
    Ok(format!("Successfully updated security policy '{}'", updated.name))
}
