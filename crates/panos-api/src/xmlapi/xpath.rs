// XPath builders for the vsys-scoped configuration tree.

/// Device entry every single-device firewall uses.
const DEVICE_ROOT: &str = "/config/devices/entry[@name='localhost.localdomain']";

/// Root of one virtual system's configuration.
pub fn vsys_root(vsys: &str) -> String {
    format!("{DEVICE_ROOT}/vsys/entry[@name={}]", literal(vsys))
}

/// Container holding address objects.
pub fn addresses(vsys: &str) -> String {
    format!("{}/address", vsys_root(vsys))
}

/// Container holding security rules.
pub fn security_rules(vsys: &str) -> String {
    format!("{}/rulebase/security/rules", vsys_root(vsys))
}

/// Every `entry` child of a container.
pub fn all_entries(container: &str) -> String {
    format!("{container}/entry")
}

/// One named `entry` child of a container.
pub fn entry(container: &str, name: &str) -> String {
    format!("{container}/entry[@name={}]", literal(name))
}

/// Quote a string as an XPath 1.0 literal.
///
/// XPath has no escape syntax: a value containing `'` is wrapped in `"`
/// instead. A value containing both quote kinds is split with `concat()`.
fn literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let parts: Vec<String> = value.split('\'').map(|p| format!("'{p}'")).collect();
    format!("concat({})", parts.join(", \"'\", "))
}
