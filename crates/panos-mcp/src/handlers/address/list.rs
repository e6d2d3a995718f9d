use serde_json::json;

use panos_core::{AddressObject, mirror};

use crate::error::{RegistryError, ToolError};
use crate::handlers::NoArgs;
use crate::registry::{Command, CommandRegistry, Context, handler};

pub fn register(registry: &mut CommandRegistry) -> Result<(), RegistryError> {
    registry.register(Command::new(
        "list_address_objects",
        "List every address object configured on the firewall.",
        json!({ "type": "object", "properties": {} }),
        handler(run),
    )?)
}

async fn run(ctx: Context, _args: NoArgs) -> Result<String, ToolError> {
    let session = ctx.session().await?;
    let snapshot = mirror::refresh::<AddressObject>(session.as_ref()).await?;
    Ok(render(snapshot.items()))
}

fn render(objects: &[AddressObject]) -> String {
    if objects.is_empty() {
        return "No address objects found.".to_owned();
    }
    let mut lines = vec![format!("Found {} object(s):\n", objects.len())];
    for object in objects {
        lines.push(format!("Name: {}", object.name));
        lines.push(format!("  Value: {}", object.value));
        if let Some(description) = object.description.as_deref().filter(|d| !d.is_empty()) {
            lines.push(format!("  Description: {description}"));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}
