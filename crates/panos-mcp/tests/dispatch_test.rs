#![allow(clippy::unwrap_used)]
// Commands end to end: dispatcher → handler → core → in-memory device.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;

use panos_core::{AddressObject, ConnectionManager, FakeDevice, RuleAction};
use panos_mcp::registry::{Command, CommandRegistry, Context, handler};
use panos_mcp::{DispatchError, Dispatcher, ToolError};

use common::{args, dispatcher, target};

// ── Address objects ─────────────────────────────────────────────────

#[tokio::test]
async fn test_create_then_list_address() {
    let device = FakeDevice::new();
    let d = dispatcher(&device);

    let created = d
        .call(
            "create_address_object",
            args(json!({ "name": "Server1", "ip_address": "192.168.1.10" })),
        )
        .await;
    assert_eq!(
        created.text,
        "✓ Successfully created address object 'Server1' with IP 192.168.1.10"
    );

    let listed = d.call("list_address_objects", args(json!({}))).await;
    assert!(!listed.is_error);
    assert!(listed.text.starts_with("✓ Found 1 object(s):"));
    assert!(listed.text.contains("Name: Server1"));
    assert!(listed.text.contains("Value: 192.168.1.10"));
    assert!(!listed.text.contains("Description"));
}

#[tokio::test]
async fn test_list_without_objects() {
    let device = FakeDevice::new();
    let outcome = dispatcher(&device)
        .call("list_address_objects", args(json!({})))
        .await;
    assert_eq!(outcome.text, "✓ No address objects found.");
}

#[tokio::test]
async fn test_duplicate_create_reports_device_error() {
    let device = FakeDevice::new();
    device.seed_address(AddressObject::ip_netmask("Server1", "192.168.1.10"));

    let outcome = dispatcher(&device)
        .call(
            "create_address_object",
            args(json!({ "name": "Server1", "ip_address": "10.0.0.1" })),
        )
        .await;
    assert!(outcome.is_error);
    assert_eq!(outcome.text, "✗ Error: Server1 already exists");
    assert_eq!(device.addresses()[0].value, "192.168.1.10");
}

#[tokio::test]
async fn test_update_description_only_keeps_value() {
    let device = FakeDevice::new();
    device.seed_address(AddressObject::ip_netmask("Server1", "192.168.1.10"));

    let outcome = dispatcher(&device)
        .call(
            "update_address_object",
            args(json!({ "name": "Server1", "new_description": "edge host" })),
        )
        .await;
    assert_eq!(outcome.text, "✓ Successfully updated address object 'Server1'");

    let stored = &device.addresses()[0];
    assert_eq!(stored.value, "192.168.1.10");
    assert_eq!(stored.description.as_deref(), Some("edge host"));
}

#[tokio::test]
async fn test_update_without_fields_is_rejected() {
    let device = FakeDevice::new();
    device.seed_address(AddressObject::ip_netmask("Server1", "192.168.1.10"));

    let outcome = dispatcher(&device)
        .call("update_address_object", args(json!({ "name": "Server1", "new_ip": null })))
        .await;
    assert!(outcome.is_error);
    assert!(outcome.text.starts_with("✗ Error: Validation failed"));
    assert_eq!(device.commit_count(), 0);
    assert_eq!(device.connect_count(), 0);
}

#[tokio::test]
async fn test_update_missing_object_is_not_found() {
    let device = FakeDevice::new();
    let outcome = dispatcher(&device)
        .call(
            "update_address_object",
            args(json!({ "name": "Ghost", "new_ip": "10.9.9.9" })),
        )
        .await;
    assert_eq!(outcome.text, "✗ Error: Address object 'Ghost' not found");
}

#[tokio::test]
async fn test_delete_address_then_again() {
    let device = FakeDevice::new();
    device.seed_address(AddressObject::ip_netmask("Server1", "192.168.1.10"));
    let d = dispatcher(&device);

    let first = d
        .call("delete_address_object", args(json!({ "name": "Server1" })))
        .await;
    assert_eq!(first.text, "✓ Successfully deleted address object 'Server1'");
    assert!(device.addresses().is_empty());

    let second = d
        .call("delete_address_object", args(json!({ "name": "Server1" })))
        .await;
    assert_eq!(second.text, "✗ Error: Address object 'Server1' not found");
}

// ── Security policies ───────────────────────────────────────────────

#[tokio::test]
async fn test_create_then_list_policy() {
    let device = FakeDevice::new();
    let d = dispatcher(&device);

    let created = d
        .call(
            "create_security_policy",
            args(json!({
                "name": "AllowDNS",
                "source_zone": "trust",
                "destination_zone": "untrust",
                "source_address": "any",
                "destination_address": "8.8.8.8",
                "application": "dns",
                "action": "allow"
            })),
        )
        .await;
    assert_eq!(created.text, "✓ Successfully created security policy 'AllowDNS'");

    let listed = d.call("list_security_policies", args(json!({}))).await;
    assert!(listed.text.starts_with("✓ Security Policies:"));
    assert!(listed.text.contains("from ['trust'] to ['untrust']"));
    assert!(listed.text.contains("application ['dns']"));
    assert!(listed.text.contains("action allow"));
}

#[tokio::test]
async fn test_create_policy_defaults_and_lists() {
    let device = FakeDevice::new();
    let outcome = dispatcher(&device)
        .call(
            "create_security_policy",
            args(json!({
                "name": "Web",
                "source_zone": "trust, dmz",
                "destination_zone": "untrust",
                "source_address": "any",
                "destination_address": "10.0.0.1,10.0.0.2"
            })),
        )
        .await;
    assert!(!outcome.is_error, "{}", outcome.text);

    let rule = &device.rules()[0];
    assert_eq!(rule.source_zones, vec!["trust", "dmz"]);
    assert_eq!(rule.destination_addresses, vec!["10.0.0.1", "10.0.0.2"]);
    assert_eq!(rule.applications, vec!["any"]);
    assert_eq!(rule.action, RuleAction::Allow);
}

#[tokio::test]
async fn test_create_policy_rejects_unknown_action() {
    let device = FakeDevice::new();
    let outcome = dispatcher(&device)
        .call(
            "create_security_policy",
            args(json!({
                "name": "Web",
                "source_zone": "trust",
                "destination_zone": "untrust",
                "source_address": "any",
                "destination_address": "any",
                "action": "permit"
            })),
        )
        .await;
    assert!(outcome.is_error);
    assert!(outcome.text.contains("Validation failed"));
    assert!(device.rules().is_empty());
}

#[tokio::test]
async fn test_update_policy_replaces_only_supplied_lists() {
    let device = FakeDevice::new();
    let d = dispatcher(&device);
    d.call(
        "create_security_policy",
        args(json!({
            "name": "AllowDNS",
            "source_zone": "trust",
            "destination_zone": "untrust",
            "source_address": "any",
            "destination_address": "8.8.8.8",
            "application": "dns"
        })),
    )
    .await;

    let outcome = d
        .call(
            "update_security_policy",
            args(json!({
                "name": "AllowDNS",
                "destination_address": "8.8.8.8,1.1.1.1",
                "action_type": "deny",
                // workflow bookkeeping, not the rule action
                "action": "sendMessage",
                "sessionId": "abc",
                "chatInput": "block dns",
                "toolCallId": "call_1"
            })),
        )
        .await;
    assert_eq!(outcome.text, "✓ Successfully updated security policy 'AllowDNS'");

    let rule = &device.rules()[0];
    assert_eq!(rule.destination_addresses, vec!["8.8.8.8", "1.1.1.1"]);
    assert_eq!(rule.action, RuleAction::Deny);
    assert_eq!(rule.source_zones, vec!["trust"]);
    assert_eq!(rule.applications, vec!["dns"]);
}

#[tokio::test]
async fn test_update_policy_blank_action_is_rejected() {
    let device = FakeDevice::new();
    let outcome = dispatcher(&device)
        .call(
            "update_security_policy",
            args(json!({ "name": "AllowDNS", "action_type": "" })),
        )
        .await;
    assert!(outcome.text.starts_with("✗ Error: Validation failed"));
    assert_eq!(device.connect_count(), 0);
}

#[tokio::test]
async fn test_delete_policy() {
    let device = FakeDevice::new();
    let d = dispatcher(&device);
    let outcome = d
        .call("delete_security_policy", args(json!({ "name": "Missing" })))
        .await;
    assert_eq!(outcome.text, "✗ Error: Security policy 'Missing' not found");
}

// ── Operational commands ────────────────────────────────────────────

#[tokio::test]
async fn test_op_command_output() {
    let device = FakeDevice::new();
    device.set_op_output("show system info", "<hostname>fw01</hostname>");

    let outcome = dispatcher(&device)
        .call("run_op_command", args(json!({ "command": "show system info" })))
        .await;
    assert_eq!(
        outcome.text,
        "✓ Output for 'show system info':\n\n<hostname>fw01</hostname>"
    );
    assert_eq!(device.op_log(), vec!["show system info"]);
}

#[tokio::test]
async fn test_op_command_requires_text() {
    let device = FakeDevice::new();
    let outcome = dispatcher(&device)
        .call("run_op_command", args(json!({ "command": "  " })))
        .await;
    assert!(outcome.is_error);
    assert!(device.op_log().is_empty());
}

// ── Dispatch ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_unknown_command() {
    let device = FakeDevice::new();
    let err = dispatcher(&device)
        .dispatch("drop_all_tables", args(json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::UnknownCommand { ref name } if name == "drop_all_tables"));
    assert_eq!(device.connect_count(), 0);
}

#[tokio::test]
async fn test_missing_required_argument() {
    let device = FakeDevice::new();
    let outcome = dispatcher(&device)
        .call("create_address_object", args(json!({ "name": "Server1" })))
        .await;
    assert!(outcome.is_error);
    assert!(outcome.text.starts_with("✗ Error: Invalid arguments:"));
    assert!(outcome.text.contains("ip_address"));
}

#[tokio::test]
async fn test_connect_failure_then_recovery() {
    let device = FakeDevice::new();
    device.fail_next_connects(1);
    let d = dispatcher(&device);

    let first = d.call("list_address_objects", args(json!({}))).await;
    assert!(first.is_error);
    assert!(first.text.contains("Cannot connect to firewall at fw.test"));

    let second = d.call("list_address_objects", args(json!({}))).await;
    assert!(!second.is_error);
    assert_eq!(device.connect_count(), 2);
}

#[tokio::test]
async fn test_fetch_failure_is_verbatim() {
    let device = FakeDevice::new();
    device.fail_fetches("Session timed out");

    let outcome = dispatcher(&device)
        .call("list_security_policies", args(json!({})))
        .await;
    assert_eq!(outcome.text, "✗ Error: Session timed out");
}

#[tokio::test]
async fn test_handler_panic_is_contained() {
    let device = FakeDevice::new();
    let mut registry = CommandRegistry::new();
    registry
        .register(
            Command::new(
                "explode",
                "always panics",
                json!({ "type": "object", "properties": {} }),
                handler(|ctx: Context, args: serde_json::Map<String, serde_json::Value>| async move {
                    ctx.session().await?;
                    if args.is_empty() {
                        panic!("kaboom");
                    }
                    Ok::<_, ToolError>(String::new())
                }),
            )
            .unwrap(),
        )
        .unwrap();
    let connection = Arc::new(ConnectionManager::new(target(), Arc::new(device.clone())));
    let d = Dispatcher::new(Arc::new(registry), Arc::clone(&connection));

    let err = d.dispatch("explode", args(json!({}))).await.unwrap_err();
    assert!(matches!(err, DispatchError::HandlerCrashed { ref reason, .. } if reason == "kaboom"));
    assert_eq!(d.call("explode", args(json!({}))).await.text, "✗ Error: Command 'explode' crashed: kaboom");

    // The shared session survives both crashes.
    assert!(connection.is_connected());
    assert_eq!(device.connect_count(), 1);
    assert!(d.registry().contains("explode"));
}

#[tokio::test]
async fn test_concurrent_calls_share_one_connection() {
    let device = FakeDevice::new();
    let d = dispatcher(&device);

    let calls = (0..5).map(|i| {
        let d = d.clone();
        tokio::spawn(async move {
            d.call(
                "create_address_object",
                args(json!({ "name": format!("Host{i}"), "ip_address": format!("10.0.0.{i}") })),
            )
            .await
        })
    });
    for call in calls.collect::<Vec<_>>() {
        assert!(!call.await.unwrap().is_error);
    }

    assert_eq!(device.addresses().len(), 5);
    assert_eq!(device.connect_count(), 1);
}
