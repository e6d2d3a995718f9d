#![allow(dead_code, clippy::unwrap_used)]

use std::sync::Arc;

use secrecy::SecretString;
use serde_json::{Map, Value};
use url::Url;

use panos_core::{ConnectionManager, DeviceTarget, FakeDevice};
use panos_mcp::{Dispatcher, handlers, registry};

pub fn target() -> DeviceTarget {
    DeviceTarget::new(
        Url::parse("https://fw.test").unwrap(),
        SecretString::from("LUFRPT1-test"),
    )
}

/// A dispatcher over every handler unit, backed by `device`.
pub fn dispatcher(device: &FakeDevice) -> Dispatcher {
    let (registry, summary) = registry::discover(handlers::UNITS);
    assert_eq!(summary.failed(), 0, "{}", summary.render());
    let connection = Arc::new(ConnectionManager::new(target(), Arc::new(device.clone())));
    Dispatcher::new(Arc::new(registry), connection)
}

pub fn args(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("arguments must be an object, got {other}"),
    }
}
