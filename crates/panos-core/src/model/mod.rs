// ── Domain model ──
//
// Canonical representation of the configuration entities handlers work
// with. Name uniqueness is the device's business: nothing here dedups.

pub mod address;
pub mod rule;

use serde::Serialize;
use strum::{Display, EnumString};

use crate::error::CoreError;

pub use address::{AddressKind, AddressObject};
pub use rule::{RuleAction, SecurityRule};

/// The kinds of configuration entity the mirror can fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum EntityKind {
    #[strum(to_string = "Address object", serialize = "address")]
    Address,
    #[strum(to_string = "Security policy", serialize = "security_rule")]
    SecurityRule,
}

/// Any configuration entity, as it crosses the device boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Address(AddressObject),
    SecurityRule(SecurityRule),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Address(_) => EntityKind::Address,
            Self::SecurityRule(_) => EntityKind::SecurityRule,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Address(a) => &a.name,
            Self::SecurityRule(r) => &r.name,
        }
    }
}

impl From<AddressObject> for Entity {
    fn from(value: AddressObject) -> Self {
        Self::Address(value)
    }
}

impl From<SecurityRule> for Entity {
    fn from(value: SecurityRule) -> Self {
        Self::SecurityRule(value)
    }
}

/// A concrete entity type the mirror and mutation protocol are generic over.
pub trait Resource: Clone + Send + Sync + Into<Entity> + 'static {
    const KIND: EntityKind;

    fn name(&self) -> &str;

    /// Check the fields a create needs before anything is sent.
    fn validate(&self) -> Result<(), CoreError>;

    /// Narrow a boundary entity back to this type.
    fn from_entity(entity: Entity) -> Option<Self>;
}

/// Reject a blank mandatory field.
pub fn require(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        Err(CoreError::validation(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}
