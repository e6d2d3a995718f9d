//! Command handler units.
//!
//! One unit per command. Each exposes `register`, which defines the
//! command's argument schema and adds it to the registry. Arguments
//! outside the schema (workflow tools send `sessionId`, `chatInput` and
//! friends) are ignored by deserialization.

pub mod address;
pub mod op;
pub mod policy;

use serde::Deserialize;

use crate::registry::HandlerUnit;

/// Every unit discovery runs, in registration order.
pub const UNITS: &[HandlerUnit] = &[
    HandlerUnit {
        module: "address::create",
        register: Some(address::create::register),
    },
    HandlerUnit {
        module: "address::list",
        register: Some(address::list::register),
    },
    HandlerUnit {
        module: "address::update",
        register: Some(address::update::register),
    },
    HandlerUnit {
        module: "address::delete",
        register: Some(address::delete::register),
    },
    HandlerUnit {
        module: "policy::create",
        register: Some(policy::create::register),
    },
    HandlerUnit {
        module: "policy::list",
        register: Some(policy::list::register),
    },
    HandlerUnit {
        module: "policy::update",
        register: Some(policy::update::register),
    },
    HandlerUnit {
        module: "policy::delete",
        register: Some(policy::delete::register),
    },
    HandlerUnit {
        module: "op",
        register: Some(op::register),
    },
];

/// Arguments of a command that takes none.
#[derive(Debug, Deserialize)]
pub(crate) struct NoArgs {}

/// Arguments of a command addressed by entity name only.
#[derive(Debug, Deserialize)]
pub(crate) struct NameArgs {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry;

    #[test]
    fn every_unit_registers_one_command() {
        let (registry, summary) = registry::discover(UNITS);
        assert_eq!(summary.failed(), 0, "{}", summary.render());
        assert_eq!(summary.registered(), UNITS.len());
        assert_eq!(registry.len(), UNITS.len());
    }
}
