// ── Remote device boundary ──
//
// Everything the core needs from the firewall, expressed as two traits.
// `XmlApiConnector` / `XmlApiSession` are the production implementation;
// tests substitute `FakeDevice`.

use std::sync::Arc;

use async_trait::async_trait;
use panos_api::{AddressEntry, SecurityRuleEntry, XmlApiClient};
use tracing::debug;

use crate::config::DeviceTarget;
use crate::error::CoreError;
use crate::model::{AddressObject, Entity, EntityKind, SecurityRule};

/// Builds an authenticated session to the device.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, target: &DeviceTarget) -> Result<Arc<dyn DeviceSession>, CoreError>;
}

/// One live session. Shared by every handler for the process lifetime.
#[async_trait]
pub trait DeviceSession: Send + Sync {
    /// Every entity of `kind`, in device order.
    async fn fetch_all(&self, kind: EntityKind) -> Result<Vec<Entity>, CoreError>;

    /// Commit a new entity in a single operation. An entity of the same
    /// kind and name already on the device is an error, not a merge.
    async fn commit_create(&self, entity: &Entity) -> Result<(), CoreError>;

    /// Replace the stored entity of the same name in a single operation.
    async fn commit_update(&self, entity: &Entity) -> Result<(), CoreError>;

    async fn commit_delete(&self, entity: &Entity) -> Result<(), CoreError>;

    /// Raw operational query, used by diagnostics.
    async fn run_op(&self, command: &str) -> Result<String, CoreError>;
}

// ── XML API implementation ──────────────────────────────────────────

/// Connects over the XML API and probes the key with `show system info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlApiConnector;

#[async_trait]
impl Connector for XmlApiConnector {
    async fn connect(&self, target: &DeviceTarget) -> Result<Arc<dyn DeviceSession>, CoreError> {
        let connection_error = |e: panos_api::Error| CoreError::Connection {
            target: target.address().to_owned(),
            reason: e.to_string(),
        };

        let client = XmlApiClient::new(
            target.url.clone(),
            target.api_key.clone(),
            &target.transport,
        )
        .map_err(connection_error)?
        .with_vsys(target.vsys.clone());

        client.system_info().await.map_err(connection_error)?;
        debug!(vsys = client.vsys(), "XML API key accepted");

        Ok(Arc::new(XmlApiSession { client }))
    }
}

/// A session backed by [`XmlApiClient`].
pub struct XmlApiSession {
    client: XmlApiClient,
}

impl XmlApiSession {
    pub fn new(client: XmlApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DeviceSession for XmlApiSession {
    async fn fetch_all(&self, kind: EntityKind) -> Result<Vec<Entity>, CoreError> {
        match kind {
            EntityKind::Address => Ok(self
                .client
                .list_addresses()
                .await?
                .into_iter()
                .map(|e| Entity::Address(AddressObject::from(e)))
                .collect()),
            EntityKind::SecurityRule => self
                .client
                .list_security_rules()
                .await?
                .into_iter()
                .map(|e| SecurityRule::try_from(e).map(Entity::SecurityRule))
                .collect(),
        }
    }

    async fn commit_create(&self, entity: &Entity) -> Result<(), CoreError> {
        // `action=set` would merge into an existing entry.
        let exists = match entity {
            Entity::Address(a) => self.client.address_exists(&a.name).await?,
            Entity::SecurityRule(r) => self.client.security_rule_exists(&r.name).await?,
        };
        if exists {
            return Err(CoreError::Remote {
                message: format!("{} already exists", entity.name()),
            });
        }
        match entity {
            Entity::Address(a) => self.client.create_address(&AddressEntry::from(a)).await?,
            Entity::SecurityRule(r) => {
                self.client
                    .create_security_rule(&SecurityRuleEntry::from(r))
                    .await?;
            }
        }
        Ok(())
    }

    async fn commit_update(&self, entity: &Entity) -> Result<(), CoreError> {
        match entity {
            Entity::Address(a) => self.client.edit_address(&AddressEntry::from(a)).await?,
            Entity::SecurityRule(r) => {
                self.client
                    .edit_security_rule(&SecurityRuleEntry::from(r))
                    .await?;
            }
        }
        Ok(())
    }

    async fn commit_delete(&self, entity: &Entity) -> Result<(), CoreError> {
        match entity {
            Entity::Address(a) => self.client.delete_address(&a.name).await?,
            Entity::SecurityRule(r) => self.client.delete_security_rule(&r.name).await?,
        }
        Ok(())
    }

    async fn run_op(&self, command: &str) -> Result<String, CoreError> {
        Ok(self.client.op(command).await?)
    }
}
