//! Stateful layer between `panos-api` and the command handlers.
//!
//! - **[`ConnectionManager`]** owns the one long-lived device session,
//!   created lazily on first use and shared by every handler.
//! - **[`mirror`]** fetches full, typed [`Snapshot`]s of one entity kind.
//!   Snapshots belong to the call that fetched them and are never cached.
//! - **[`mutation`]** is the read-modify-commit protocol: create, partial
//!   update and delete of a single named entity.
//! - **[`codec`]** converts comma-separated handler arguments into ordered
//!   member lists and renders them back.
//! - **[`device`]** is the remote boundary. Production sessions speak the
//!   XML API; tests substitute [`FakeDevice`] (feature `testing`).

pub mod codec;
pub mod config;
pub mod connection;
pub mod convert;
pub mod device;
pub mod error;
pub mod mirror;
pub mod model;
pub mod mutation;

#[cfg(any(test, feature = "testing"))]
pub mod fake;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::DeviceTarget;
pub use connection::ConnectionManager;
pub use device::{Connector, DeviceSession, XmlApiConnector, XmlApiSession};
pub use error::CoreError;
pub use mirror::Snapshot;
pub use model::{
    AddressKind, AddressObject, Entity, EntityKind, Resource, RuleAction, SecurityRule,
};
pub use mutation::{AddressUpdate, Patch, RuleUpdate};

#[cfg(any(test, feature = "testing"))]
pub use fake::FakeDevice;
