// ── Mutation protocol ──
//
// Create commits a new entity as-is. Update and delete always refresh
// first and locate the entity by name in that fresh snapshot; the
// snapshot is dropped when the call returns. Each change is exactly one
// commit against the device.

use tracing::info;

use crate::device::DeviceSession;
use crate::error::CoreError;
use crate::mirror;
use crate::model::{AddressObject, Resource, RuleAction, SecurityRule, require};

/// A set of caller-supplied field changes for one entity type.
///
/// `None` fields are left alone; only supplied fields are written.
pub trait Patch<T>: Send {
    fn is_empty(&self) -> bool;

    /// Reject supplied values that can never be valid.
    fn validate(&self) -> Result<(), CoreError> {
        Ok(())
    }

    fn apply(self, target: &mut T);
}

// ── Patches ─────────────────────────────────────────────────────────

/// Partial update of an address object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressUpdate {
    pub value: Option<String>,
    /// `Some("")` clears the description.
    pub description: Option<String>,
}

impl Patch<AddressObject> for AddressUpdate {
    fn is_empty(&self) -> bool {
        self.value.is_none() && self.description.is_none()
    }

    fn validate(&self) -> Result<(), CoreError> {
        match self.value.as_deref() {
            Some(value) => require("new_ip", value),
            None => Ok(()),
        }
    }

    fn apply(self, target: &mut AddressObject) {
        if let Some(value) = self.value {
            target.value = value.trim().to_owned();
        }
        if let Some(description) = self.description {
            target.description = Some(description).filter(|d| !d.is_empty());
        }
    }
}

/// Partial update of a security rule. Lists replace the stored list whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleUpdate {
    pub source_zones: Option<Vec<String>>,
    pub destination_zones: Option<Vec<String>>,
    pub source_addresses: Option<Vec<String>>,
    pub destination_addresses: Option<Vec<String>>,
    pub applications: Option<Vec<String>>,
    pub action: Option<RuleAction>,
    /// `Some("")` clears the description.
    pub description: Option<String>,
}

impl Patch<SecurityRule> for RuleUpdate {
    fn is_empty(&self) -> bool {
        self.source_zones.is_none()
            && self.destination_zones.is_none()
            && self.source_addresses.is_none()
            && self.destination_addresses.is_none()
            && self.applications.is_none()
            && self.action.is_none()
            && self.description.is_none()
    }

    fn apply(self, target: &mut SecurityRule) {
        for (field, value) in [
            (&mut target.source_zones, self.source_zones),
            (&mut target.destination_zones, self.destination_zones),
            (&mut target.source_addresses, self.source_addresses),
            (&mut target.destination_addresses, self.destination_addresses),
            (&mut target.applications, self.applications),
        ] {
            if let Some(value) = value {
                *field = value;
            }
        }
        if let Some(action) = self.action {
            target.action = action;
        }
        if let Some(description) = self.description {
            target.description = Some(description).filter(|d| !d.is_empty());
        }
    }
}

// ── Operations ──────────────────────────────────────────────────────

/// Validate and commit a new entity. A duplicate name is rejected by the
/// session, not here.
pub async fn create<T: Resource>(session: &dyn DeviceSession, item: T) -> Result<T, CoreError> {
    item.validate()?;
    session.commit_create(&item.clone().into()).await?;
    info!(kind = %T::KIND, name = item.name(), "created");
    Ok(item)
}

/// The local checks [`update`] runs before touching the device.
pub fn check_update<T, P: Patch<T>>(name: &str, patch: &P) -> Result<(), CoreError> {
    require("name", name)?;
    if patch.is_empty() {
        return Err(CoreError::validation("at least one field to update must be supplied"));
    }
    patch.validate()
}

/// Refresh, find `name`, overwrite exactly the supplied fields, commit.
pub async fn update<T, P>(session: &dyn DeviceSession, name: &str, patch: P) -> Result<T, CoreError>
where
    T: Resource,
    P: Patch<T>,
{
    check_update(name, &patch)?;

    let mut item = mirror::refresh::<T>(session).await?.find(name)?.clone();
    patch.apply(&mut item);

    session.commit_update(&item.clone().into()).await?;
    info!(kind = %T::KIND, name, "updated");
    Ok(item)
}

/// Refresh, find `name`, commit its deletion. Returns the removed entity.
pub async fn delete<T: Resource>(session: &dyn DeviceSession, name: &str) -> Result<T, CoreError> {
    require("name", name)?;

    let item = mirror::refresh::<T>(session).await?.find(name)?.clone();
    session.commit_delete(&item.clone().into()).await?;
    info!(kind = %T::KIND, name, "deleted");
    Ok(item)
}
