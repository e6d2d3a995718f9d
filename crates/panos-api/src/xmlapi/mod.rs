// XML API client modules
//
// Hand-written client for the PAN-OS management XML API (`/api/`).
// Configuration reads and writes go through `type=config` requests
// addressed by XPath; diagnostics go through `type=op`. Every response
// is wrapped in `<response status="success|error">`.

pub mod client;
pub mod models;
pub mod objects;
pub mod op;
pub mod policies;
pub mod system;
pub mod xpath;

pub use client::XmlApiClient;
