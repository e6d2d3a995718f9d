#![allow(clippy::unwrap_used)]
// Integration tests for `XmlApiClient` using wiremock.

use secrecy::SecretString;
use url::Url;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use panos_api::{AddressEntry, Error, SecurityRuleEntry, XmlApiClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, XmlApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = XmlApiClient::with_client(
        reqwest::Client::new(),
        base_url,
        SecretString::from("test-key".to_string()),
    );
    (server, client)
}

fn xml(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "application/xml")
}

// ── Address objects ─────────────────────────────────────────────────

#[tokio::test]
async fn test_list_addresses() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/"))
        .and(header("X-PAN-KEY", "test-key"))
        .and(body_string_contains("action=get"))
        .and(body_string_contains("address%2Fentry"))
        .respond_with(xml(
            r#"<response status="success" code="19"><result total-count="1" count="1">
                <entry name="Server1"><ip-netmask>192.168.1.10</ip-netmask></entry>
            </result></response>"#,
        ))
        .mount(&server)
        .await;

    let addresses = client.list_addresses().await.unwrap();

    assert_eq!(addresses.len(), 1);
    assert_eq!(addresses[0].name, "Server1");
    assert_eq!(addresses[0].ip_netmask.as_deref(), Some("192.168.1.10"));
}

#[tokio::test]
async fn test_create_address_sends_set_with_element() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/"))
        .and(body_string_contains("action=set"))
        .and(body_string_contains("element=%3Cip-netmask%3E10.0.0.0%2F24%3C%2Fip-netmask%3E"))
        .respond_with(xml(
            r#"<response status="success" code="20"><msg>command succeeded</msg></response>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    client
        .create_address(&AddressEntry::ip_netmask("lan", "10.0.0.0/24"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_address_targets_named_entry() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/"))
        .and(body_string_contains("action=delete"))
        .and(body_string_contains("entry%5B%40name%3D%27Server1%27%5D"))
        .respond_with(xml(
            r#"<response status="success" code="20"><msg>command succeeded</msg></response>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_address("Server1").await.unwrap();
}

// ── Security rules ──────────────────────────────────────────────────

#[tokio::test]
async fn test_list_security_rules_preserves_member_order() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(body_string_contains("rulebase%2Fsecurity%2Frules%2Fentry"))
        .respond_with(xml(
            r#"<response status="success"><result>
                <entry name="AllowDNS">
                  <from><member>trust</member><member>dmz</member></from>
                  <to><member>untrust</member></to>
                  <source><member>any</member></source>
                  <destination><member>8.8.8.8</member></destination>
                  <application><member>dns</member></application>
                  <action>allow</action>
                </entry>
            </result></response>"#,
        ))
        .mount(&server)
        .await;

    let rules = client.list_security_rules().await.unwrap();

    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].from.member, vec!["trust", "dmz"]);
    assert_eq!(rules[0].destination.member, vec!["8.8.8.8"]);
}

#[tokio::test]
async fn test_edit_security_rule_sends_full_entry() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(body_string_contains("action=edit"))
        .and(body_string_contains("element=%3Centry+name%3D%22AllowDNS%22%3E"))
        .respond_with(xml(r#"<response status="success" code="20"/>"#))
        .expect(1)
        .mount(&server)
        .await;

    let rule = SecurityRuleEntry {
        name: "AllowDNS".into(),
        action: Some("deny".into()),
        ..SecurityRuleEntry::default()
    };
    client.edit_security_rule(&rule).await.unwrap();
}

#[tokio::test]
async fn test_edit_writes_back_unmodelled_rule_elements() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(body_string_contains("action=get"))
        .respond_with(xml(
            r#"<response status="success"><result>
                <entry name="AllowDNS">
                  <from><member>trust</member></from>
                  <action>allow</action>
                  <disabled>yes</disabled>
                  <tag><member>prod</member></tag>
                </entry>
            </result></response>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("action=edit"))
        .and(body_string_contains("%3Caction%3Edeny%3C%2Faction%3E"))
        .and(body_string_contains("%3Cdisabled%3Eyes%3C%2Fdisabled%3E"))
        .and(body_string_contains(
            "%3Ctag%3E%3Cmember%3Eprod%3C%2Fmember%3E%3C%2Ftag%3E",
        ))
        .respond_with(xml(r#"<response status="success" code="20"/>"#))
        .expect(1)
        .mount(&server)
        .await;

    let mut rule = client.list_security_rules().await.unwrap().remove(0);
    assert_eq!(rule.unmodelled.len(), 2);
    rule.action = Some("deny".into());
    client.edit_security_rule(&rule).await.unwrap();
}

#[tokio::test]
async fn test_security_rule_exists_reads_named_entry() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(body_string_contains("action=get"))
        .and(body_string_contains("entry%5B%40name%3D%27AllowDNS%27%5D"))
        .respond_with(xml(
            r#"<response status="success"><result><entry name="AllowDNS"/></result></response>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("action=get"))
        .and(body_string_contains("entry%5B%40name%3D%27Missing%27%5D"))
        .respond_with(xml(r#"<response status="success" code="7"><result/></response>"#))
        .mount(&server)
        .await;

    assert!(client.security_rule_exists("AllowDNS").await.unwrap());
    assert!(!client.security_rule_exists("Missing").await.unwrap());
}

// ── Operational commands ────────────────────────────────────────────

#[tokio::test]
async fn test_op_converts_cli_text() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(body_string_contains("type=op"))
        .and(body_string_contains(
            "cmd=%3Cshow%3E%3Csystem%3E%3Cinfo%2F%3E%3C%2Fsystem%3E%3C%2Fshow%3E",
        ))
        .respond_with(xml(
            r#"<response status="success"><result><system><hostname>fw1</hostname></system></result></response>"#,
        ))
        .mount(&server)
        .await;

    let output = client.op("show system info").await.unwrap();
    assert!(output.contains("<hostname>fw1</hostname>"));
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_device_rejection_is_verbatim() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(xml(
            r#"<response status="error" code="12"><msg><line>lan already exists</line></msg></response>"#,
        ))
        .mount(&server)
        .await;

    let result = client
        .create_address(&AddressEntry::ip_netmask("lan", "10.0.0.0/24"))
        .await;

    match result {
        Err(Error::Api { ref message, ref code }) => {
            assert_eq!(message, "lan already exists");
            assert_eq!(code.as_deref(), Some("12"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_http_forbidden_is_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let result = client.system_info().await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_server_error_without_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let result = client.list_addresses().await;

    match result {
        Err(Error::Http { status, ref message }) => {
            assert_eq!(status, 502);
            assert!(message.contains("Bad Gateway"));
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
}
