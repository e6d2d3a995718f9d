use serde_json::json;

use panos_core::{SecurityRule, codec::render_list, mirror};

use crate::error::{RegistryError, ToolError};
use crate::handlers::NoArgs;
use crate::registry::{Command, CommandRegistry, Context, handler};

pub fn register(registry: &mut CommandRegistry) -> Result<(), RegistryError> {
    registry.register(Command::new(
        "list_security_policies",
        "List the security rulebase in evaluation order.",
        json!({ "type": "object", "properties": {} }),
        handler(run),
    )?)
}

async fn run(ctx: Context, _args: NoArgs) -> Result<String, ToolError> {
    let session = ctx.session().await?;
    let snapshot = mirror::refresh::<SecurityRule>(session.as_ref()).await?;
    Ok(render(snapshot.items()))
}

fn render(rules: &[SecurityRule]) -> String {
    if rules.is_empty() {
        return "No security policies found.".to_owned();
    }
    let mut lines = vec!["Security Policies:\n".to_owned()];
    lines.extend(rules.iter().map(|r| {
        format!(
            "- {}: from {} to {}, src {}, dst {}, application {}, action {}",
            r.name,
            render_list(&r.source_zones),
            render_list(&r.destination_zones),
            render_list(&r.source_addresses),
            render_list(&r.destination_addresses),
            render_list(&r.applications),
            r.action,
        )
    }));
    lines.join("\n")
}
