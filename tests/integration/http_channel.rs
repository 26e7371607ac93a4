//! `HttpChannel` against a local stub of the wagering API.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use rust_decimal_macros::dec;
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

use boleto::channel::http::HttpChannel;
use boleto::channel::SubmissionChannel;
use boleto::engine::gate::{GateState, SubmissionGate};
use boleto::store::SelectionStore;
use boleto::types::{BetRecord, BoletoError, OutcomeKind, Selection};

/// What the stub saw: (authorization, x-request-id, body).
type Seen = Arc<Mutex<Vec<(Option<String>, Option<String>, Value)>>>;

fn record(seen: &Seen, headers: &HeaderMap, body: Value) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    seen.lock()
        .unwrap()
        .push((header("authorization"), header("x-request-id"), body));
}

async fn accept(State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    let bets: Vec<Value> = body["bets"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, mut bet)| {
            bet["id"] = json!(format!("BET-{i}"));
            bet
        })
        .collect();
    record(&seen, &headers, body);
    Json(json!({ "success": true, "batch_id": "B-1", "bets": bets }))
}

async fn reject(State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    record(&seen, &headers, body);
    Json(json!({ "success": false, "message": "Cuota modificada" }))
}

async fn down(State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, String) {
    record(&seen, &headers, body);
    (StatusCode::SERVICE_UNAVAILABLE, "maintenance".to_string())
}

/// Start the stub on an ephemeral port and return its base address.
async fn spawn_stub() -> (String, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/ok/bets/batch", post(accept))
        .route("/reject/bets/batch", post(reject))
        .route("/down/bets/batch", post(down))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), seen)
}

fn channel(base: &str, path: &str) -> HttpChannel {
    HttpChannel::new(
        &format!("{base}/{path}/"),
        Some(SecretString::new("test-token".to_string())),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn bets() -> Vec<BetRecord> {
    vec![
        BetRecord {
            selection_id: "home".into(),
            event_id: "1".into(),
            stake: dec!(10),
            odds: dec!(2.10),
            outcome_kind: OutcomeKind::Home,
        },
        BetRecord {
            selection_id: "away".into(),
            event_id: "2".into(),
            stake: dec!(5),
            odds: dec!(3.20),
            outcome_kind: OutcomeKind::Away,
        },
    ]
}

#[tokio::test]
async fn batch_is_posted_with_auth_and_request_id() {
    let (base, seen) = spawn_stub().await;
    let receipt = assert_ok!(channel(&base, "ok").create_batch(&bets()).await);

    assert_eq!(receipt.batch_id, "B-1");
    assert_eq!(receipt.created.len(), 2);
    assert_eq!(receipt.created[1].bet_id, "BET-1");
    assert_eq!(receipt.total_staked(), dec!(15));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (auth, request_id, body) = &seen[0];
    assert_eq!(auth.as_deref(), Some("Bearer test-token"));
    assert!(request_id.as_deref().is_some_and(|id| !id.is_empty()));
    assert_eq!(body["bets"][0]["outcome_kind"], "home");
    assert_eq!(body["bets"][1]["stake"].as_f64(), Some(5.0));
}

#[tokio::test]
async fn business_rejection_is_typed() {
    let (base, seen) = spawn_stub().await;
    let err = assert_err!(channel(&base, "reject").create_batch(&bets()).await);

    match err.downcast_ref::<BoletoError>() {
        Some(BoletoError::Rejected { message, .. }) => assert_eq!(message, "Cuota modificada"),
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn error_status_is_reported_without_retry() {
    let (base, seen) = spawn_stub().await;
    let err = assert_err!(channel(&base, "down").create_batch(&bets()).await);

    let msg = err.to_string();
    assert!(msg.contains("503"));
    assert!(msg.contains("maintenance"));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn unreachable_api_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let channel = HttpChannel::new(&format!("http://{addr}"), None, Duration::from_secs(2)).unwrap();
    let err = assert_err!(channel.create_batch(&bets()).await);
    assert!(matches!(
        err.downcast_ref::<BoletoError>(),
        Some(BoletoError::Transport { .. })
    ));
}

#[tokio::test]
async fn gate_submits_through_http() {
    let (base, seen) = spawn_stub().await;
    let mut store = SelectionStore::default();
    let mut gate = SubmissionGate::new();
    store.add_selection(Selection::new("home", "1", "A vs B", OutcomeKind::Home, dec!(2.10), dec!(10)));
    store.add_selection(Selection::new("draw", "3", "C vs D", OutcomeKind::Draw, dec!(3.00), dec!(10)));

    // Rejected: slip survives with the server's message.
    assert_err!(gate.submit(&mut store, &channel(&base, "reject")).await);
    assert_eq!(store.len(), 2);
    assert!(gate.last_error().unwrap().contains("Cuota modificada"));

    // Accepted: slip cleared and gate idle.
    let receipt = assert_ok!(gate.submit(&mut store, &channel(&base, "ok")).await);
    assert_eq!(receipt.created.len(), 2);
    assert!(store.is_empty());
    assert_eq!(gate.state(), &GateState::Idle);
    assert_eq!(seen.lock().unwrap().len(), 2);
}
