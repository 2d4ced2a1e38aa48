//! End-to-end handshake and status-query scenarios against an in-process stub
//! of the registry API.
//!
//! The stub issues a fixed challenge, verifies the submitted signature by
//! recovering the signer's address from it, sets a session cookie on login,
//! and requires that cookie on status queries — so these tests exercise the
//! full protocol contract, not just the happy-path shapes.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use axum::extract::State;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::HeaderMap;
use axum::response::{AppendHeaders, IntoResponse};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use vigil_client::{ClientConfig, SessionClient};
use vigil_core::{signer, Identity, VigilError};

const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const SESSION_COOKIE: &str = "vigil_session=stub-token";

struct StubRegistry {
    challenge: String,
    login_success: bool,
    last_alive: Option<String>,
    expected_address: String,
    observed: Observed,
}

#[derive(Default)]
struct Observed {
    pre_login_body: Mutex<Option<Value>>,
    signature_valid: AtomicBool,
    cookie_on_status: AtomicBool,
    challenger_hits: AtomicUsize,
}

async fn pre_login(
    State(stub): State<Arc<StubRegistry>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    *stub.observed.pre_login_body.lock().unwrap() = Some(body);
    Json(json!({ "result": { "message": stub.challenge } }))
}

async fn login(State(stub): State<Arc<StubRegistry>>, Json(body): Json<Value>) -> impl IntoResponse {
    let signature = body["signature"].as_str().unwrap_or_default();
    let recovered = signer::recover_address(&stub.challenge, signature)
        .map(|address| address.to_string())
        .unwrap_or_default();

    let valid = recovered == stub.expected_address;
    stub.observed
        .signature_valid
        .store(valid, Ordering::SeqCst);

    let success = valid && stub.login_success;
    let cookie = if success {
        vec![(SET_COOKIE, format!("{}; Path=/", SESSION_COOKIE))]
    } else {
        vec![]
    };
    (
        AppendHeaders(cookie),
        Json(json!({ "result": { "success": success } })),
    )
}

async fn challenger(
    State(stub): State<Arc<StubRegistry>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    stub.observed.challenger_hits.fetch_add(1, Ordering::SeqCst);

    let has_cookie = headers
        .get(COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains(SESSION_COOKIE))
        .unwrap_or(false);
    stub.observed
        .cookie_on_status
        .store(has_cookie, Ordering::SeqCst);

    let id = body["id"].as_str().unwrap_or_default();
    let result = match &stub.last_alive {
        Some(last_alive) => json!({ "id": id, "last_alive": last_alive }),
        None => json!({ "id": id }),
    };
    Json(json!({ "result": result }))
}

/// Start the stub on an ephemeral port and return (base URL, shared state).
async fn spawn_stub(
    login_success: bool,
    last_alive: Option<&str>,
    identity: &Identity,
) -> (String, Arc<StubRegistry>) {
    let stub = Arc::new(StubRegistry {
        challenge: "abc123".to_string(),
        login_success,
        last_alive: last_alive.map(str::to_string),
        expected_address: identity.address().to_string(),
        observed: Observed::default(),
    });

    let app = Router::new()
        .route(ClientConfig::PRE_LOGIN_PATH, post(pre_login))
        .route(ClientConfig::LOGIN_PATH, post(login))
        .route(ClientConfig::CHALLENGER_PATH, post(challenger))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (base_url, stub)
}

fn test_identity() -> Identity {
    Identity::from_hex(TEST_KEY).unwrap()
}

fn pinned_now(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
}

#[tokio::test]
async fn test_handshake_and_live_status() {
    let identity = test_identity();
    let (base_url, stub) = spawn_stub(true, Some("2024-01-01T00:00:00Z"), &identity).await;

    let session = SessionClient::new(ClientConfig::new(base_url))
        .unwrap()
        .establish(&identity)
        .await
        .unwrap();

    // The stub accepted the login only because the signature recovered to the
    // pre-login address — i.e. it was computed over the exact challenge.
    assert!(stub.observed.signature_valid.load(Ordering::SeqCst));

    let record = session.query_status("IPv4/1.2.3.4").await.unwrap();
    assert!(stub.observed.cookie_on_status.load(Ordering::SeqCst));

    let now = pinned_now("2024-01-01T00:00:10Z");
    assert_eq!(record.report_line(now), "IPv4/1.2.3.4 last alive: 10s ago");

    // Same query on the same session: idempotent from the client's side.
    let again = session.query_status("IPv4/1.2.3.4").await.unwrap();
    assert_eq!(again, record);
}

#[tokio::test]
async fn test_pre_login_announces_identity() {
    let identity = test_identity();
    let (base_url, stub) = spawn_stub(true, None, &identity).await;

    SessionClient::new(ClientConfig::new(base_url))
        .unwrap()
        .establish(&identity)
        .await
        .unwrap();

    let body = stub
        .observed
        .pre_login_body
        .lock()
        .unwrap()
        .clone()
        .unwrap();
    let address = identity.address().to_string();
    assert_eq!(body["publicKey"], json!(address));
    assert_eq!(body["keyType"], json!("ethereum"));
    assert_eq!(body["role"], json!("prover"));
    assert_eq!(body["projectName"], json!("witness"));
    assert_eq!(body["walletPublicKey"]["ethereum"], json!(address));
    assert_eq!(body["claims"]["radius"], json!(1_000_000.0));
}

#[tokio::test]
async fn test_never_logged_in_reported_as_status() {
    let identity = test_identity();
    let (base_url, _stub) = spawn_stub(true, None, &identity).await;

    let session = SessionClient::new(ClientConfig::new(base_url))
        .unwrap()
        .establish(&identity)
        .await
        .unwrap();

    let record = session.query_status("IPv4/1.2.3.4").await.unwrap();
    assert_eq!(record.last_alive, None);
    assert_eq!(
        record.report_line(Utc::now()),
        "IPv4/1.2.3.4 has not logged in"
    );
}

#[tokio::test]
async fn test_rejected_login_aborts_before_any_query() {
    let identity = test_identity();
    let (base_url, stub) = spawn_stub(false, None, &identity).await;

    let err = SessionClient::new(ClientConfig::new(base_url))
        .unwrap()
        .establish(&identity)
        .await
        .unwrap_err();

    assert_matches!(err, VigilError::Protocol { .. });
    assert_eq!(stub.observed.challenger_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_malformed_last_alive_is_fatal() {
    let identity = test_identity();
    let (base_url, _stub) = spawn_stub(true, Some("not-a-date"), &identity).await;

    let session = SessionClient::new(ClientConfig::new(base_url))
        .unwrap()
        .establish(&identity)
        .await
        .unwrap();

    let err = session.query_status("IPv4/1.2.3.4").await.unwrap_err();
    assert_matches!(err, VigilError::TimestampParse { .. });
}

#[tokio::test]
async fn test_query_many_preserves_order() {
    let identity = test_identity();
    let (base_url, _stub) = spawn_stub(true, Some("2024-01-01T00:00:00Z"), &identity).await;

    let session = SessionClient::new(ClientConfig::new(base_url))
        .unwrap()
        .establish(&identity)
        .await
        .unwrap();

    let ids = vec!["IPv4/1.2.3.4".to_string(), "IPv6/1.2.3.4".to_string()];
    let records = session.query_many(&ids).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "IPv4/1.2.3.4");
    assert_eq!(records[1].id, "IPv6/1.2.3.4");
}

#[tokio::test]
async fn test_unreachable_registry_is_a_transport_error() {
    let identity = test_identity();
    // Nothing listens here
    let config = ClientConfig::new("http://127.0.0.1:1");

    let err = SessionClient::new(config)
        .unwrap()
        .establish(&identity)
        .await
        .unwrap_err();

    assert_matches!(err, VigilError::Transport { .. });
}
