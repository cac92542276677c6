#![allow(clippy::unwrap_used)]
// Integration tests for `NitroClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use regent_api::{ConnectionSettings, Error, NitroClient, NitroCredentials};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(auto_login: bool) -> (MockServer, NitroClient) {
    let server = MockServer::start().await;
    let address = server.uri().trim_start_matches("http://").to_owned();
    let settings = ConnectionSettings {
        use_ssl: false,
        auto_login,
        ..ConnectionSettings::default()
    };
    let client = NitroClient::new(
        "ns1",
        &address,
        NitroCredentials::new("nsroot", "nsroot-pass"),
        &settings,
    )
    .unwrap();
    (server, client)
}

fn hanode_body(state: &str) -> serde_json::Value {
    json!({
        "errorcode": 0,
        "message": "Done",
        "severity": "NONE",
        "hanode": [{
            "id": "0",
            "name": "ns1",
            "ipaddress": "10.0.0.11",
            "state": state,
            "hastatus": "UP"
        }]
    })
}

// ── HA status ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_primary_node_with_header_auth() {
    let (server, client) = setup(false).await;

    Mock::given(method("GET"))
        .and(path("/nitro/v1/config/hanode/0"))
        .and(header("X-NITRO-USER", "nsroot"))
        .and(header("X-NITRO-PASS", "nsroot-pass"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hanode_body("Primary")))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.is_primary_node().await.unwrap());
}

#[tokio::test]
async fn test_secondary_node() {
    let (server, client) = setup(false).await;

    Mock::given(method("GET"))
        .and(path("/nitro/v1/config/hanode/0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hanode_body("Secondary")))
        .mount(&server)
        .await;

    assert!(!client.is_primary_node().await.unwrap());
    let node = client.local_ha_node().await.unwrap();
    assert_eq!(node.ipaddress.as_deref(), Some("10.0.0.11"));
}

#[tokio::test]
async fn test_missing_hanode_entry() {
    let (server, client) = setup(false).await;

    Mock::given(method("GET"))
        .and(path("/nitro/v1/config/hanode/0"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"errorcode": 0, "message": "Done"})),
        )
        .mount(&server)
        .await;

    let result = client.is_primary_node().await;
    assert!(
        matches!(result, Err(Error::UnexpectedResponse(_))),
        "expected UnexpectedResponse, got: {result:?}"
    );
}

// ── Error envelopes ─────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let (server, client) = setup(false).await;

    Mock::given(method("GET"))
        .and(path("/nitro/v1/config/hanode/0"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "errorcode": 354,
            "message": "Invalid username or password",
            "severity": "ERROR"
        })))
        .mount(&server)
        .await;

    let err = client.is_primary_node().await.unwrap_err();
    assert!(err.is_auth_error(), "expected auth error, got: {err:?}");
}

#[tokio::test]
async fn test_nitro_errorcode_with_http_200() {
    let (server, client) = setup(false).await;

    Mock::given(method("GET"))
        .and(path("/nitro/v1/config/hanode/0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errorcode": 258,
            "message": "No such resource",
            "severity": "ERROR"
        })))
        .mount(&server)
        .await;

    match client.is_primary_node().await {
        Err(Error::Nitro {
            errorcode,
            status,
            message,
        }) => {
            assert_eq!(errorcode, 258);
            assert_eq!(status, 200);
            assert_eq!(message, "No such resource");
        }
        other => panic!("expected Nitro error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_failure_body() {
    let (server, client) = setup(false).await;

    Mock::given(method("GET"))
        .and(path("/nitro/v1/config/hanode/0"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    match client.is_primary_node().await {
        Err(Error::Nitro {
            errorcode, status, ..
        }) => {
            assert_eq!(errorcode, -1);
            assert_eq!(status, 503);
        }
        other => panic!("expected Nitro error, got: {other:?}"),
    }
}

// ── Session login ───────────────────────────────────────────────────

#[tokio::test]
async fn test_auto_login_opens_session_once() {
    let (server, client) = setup(true).await;

    Mock::given(method("POST"))
        .and(path("/nitro/v1/config/login"))
        .and(body_json(json!({
            "login": { "username": "nsroot", "password": "nsroot-pass" }
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("set-cookie", "NITRO_AUTH_TOKEN=abc123; Path=/nitro/v1")
                .set_body_json(json!({"errorcode": 0, "message": "Done"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/nitro/v1/config/hanode/0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hanode_body("Primary")))
        .expect(2)
        .mount(&server)
        .await;

    assert!(client.is_primary_node().await.unwrap());
    assert!(client.is_primary_node().await.unwrap());
}

#[tokio::test]
async fn test_auto_login_failure() {
    let (server, client) = setup(true).await;

    Mock::given(method("POST"))
        .and(path("/nitro/v1/config/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("denied"))
        .mount(&server)
        .await;

    let result = client.is_primary_node().await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}
