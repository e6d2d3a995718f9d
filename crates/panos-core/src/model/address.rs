// ── Address objects ──

use serde::Serialize;

use super::{Entity, EntityKind, Resource, require};
use crate::error::CoreError;

/// Which value element the object carries on the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddressKind {
    #[default]
    IpNetmask,
    IpRange,
    Fqdn,
}

/// Named address definition: an IP literal or CIDR, optionally described.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressObject {
    pub name: String,
    pub value: String,
    pub value_kind: AddressKind,
    pub description: Option<String>,
    /// Device elements this type does not model, as raw XML. Written back
    /// unchanged on update.
    #[serde(skip)]
    pub retained: Vec<String>,
}

impl AddressObject {
    pub fn ip_netmask(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            value_kind: AddressKind::IpNetmask,
            description: None,
            retained: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.is_empty());
        self
    }
}

impl Resource for AddressObject {
    const KIND: EntityKind = EntityKind::Address;

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), CoreError> {
        require("name", &self.name)?;
        require("ip_address", &self.value)
    }

    fn from_entity(entity: Entity) -> Option<Self> {
        match entity {
            Entity::Address(a) => Some(a),
            Entity::SecurityRule(_) => None,
        }
    }
}
