// panos-api: Async Rust client for the PAN-OS firewall XML API

pub mod error;
pub mod transport;
pub mod xmlapi;

pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use xmlapi::XmlApiClient;
pub use xmlapi::models::{AddressEntry, SecurityRuleEntry};
