// ── Security rules ──

use serde::Serialize;
use strum::{Display, EnumString, VariantNames};

use super::{Entity, EntityKind, Resource, require};
use crate::error::CoreError;

/// What the firewall does with matching traffic.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Display, EnumString, VariantNames,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum RuleAction {
    #[default]
    Allow,
    Deny,
    Drop,
    ResetClient,
    ResetServer,
    ResetBoth,
}

impl RuleAction {
    /// Parse a caller-supplied action, listing the accepted values on failure.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        raw.trim().parse().map_err(|_| {
            CoreError::validation(format!(
                "invalid action '{raw}' (expected one of: {})",
                Self::VARIANTS.join(", ")
            ))
        })
    }
}

/// A security rule. Every list keeps the device's stored order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SecurityRule {
    pub name: String,
    pub source_zones: Vec<String>,
    pub destination_zones: Vec<String>,
    pub source_addresses: Vec<String>,
    pub destination_addresses: Vec<String>,
    pub applications: Vec<String>,
    /// Read and written back unchanged; handlers never edit it.
    pub services: Vec<String>,
    pub action: RuleAction,
    pub description: Option<String>,
    /// Device elements this type does not model (`disabled`, `tag`,
    /// profiles), as raw XML. Written back unchanged on update.
    #[serde(skip)]
    pub retained: Vec<String>,
}

impl Resource for SecurityRule {
    const KIND: EntityKind = EntityKind::SecurityRule;

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), CoreError> {
        require("name", &self.name)?;
        // Lists must be supplied; their members are the device's to judge.
        for (field, values) in [
            ("source_zone", &self.source_zones),
            ("destination_zone", &self.destination_zones),
            ("source_address", &self.source_addresses),
            ("destination_address", &self.destination_addresses),
            ("application", &self.applications),
        ] {
            if values.is_empty() {
                return Err(CoreError::validation(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }

    fn from_entity(entity: Entity) -> Option<Self> {
        match entity {
            Entity::SecurityRule(r) => Some(r),
            Entity::Address(_) => None,
        }
    }
}
