//! Integration tests for the HTTP gateway client.
//!
//! Covers network error handling against unreachable hosts and full
//! request/response behavior against a stub gateway on an ephemeral port.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use pokersync::api_client::{ApiClient, Gateway, GatewayError};
use pokersync::entities::{GameStatus, PlayerAction};
use pokersync::store::{GameStore, RetryPolicy};

/// Serve `app` on an ephemeral port and return its base URL.
async fn spawn_gateway(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral port should bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn table_json() -> Value {
    json!({
        "status": "PREFLOP",
        "my_hand": [
            {"suit": "SPADES", "value": 1, "display": "ACE of SPADES ♠"},
            {"suit": "HEARTS", "value": 13, "display": "KING of HEARTS ♥"}
        ],
        "community_cards": [],
        "pot": 60,
        "highest_bet": 40,
        "min_raise": 20,
        "valid_actions": ["FOLD", "CALL", "RAISE"],
        "is_my_turn": true,
        "my_stack": 960,
        "current_turn_id": 1,
        "my_player_id": 1,
        "dealer_id": 2,
        "small_blind": 10,
        "big_blind": 20
    })
}

fn players_json() -> Value {
    json!({
        "players": [
            {
                "player_id": 1, "listen_addr": "localhost:3000",
                "stack": 960, "current_bet": 20,
                "is_active": true, "is_folded": false, "is_all_in": false,
                "is_dealer": false, "is_small_blind": true, "is_big_blind": false,
                "is_current_turn": true
            },
            {
                "player_id": 2, "listen_addr": "localhost:3001",
                "stack": 1000, "current_bet": 40,
                "is_active": true, "is_folded": false, "is_all_in": false,
                "is_dealer": true, "is_small_blind": false, "is_big_blind": true,
                "is_current_turn": false
            }
        ],
        "total_players": 2,
        "active_players": 2
    })
}

fn stub_app() -> Router {
    Router::new()
        .route(
            "/api/health",
            get(|| async { Json(json!({"status": "ok", "game_status": "PREFLOP"})) }),
        )
        .route("/api/table", get(|| async { Json(table_json()) }))
        .route("/api/players", get(|| async { Json(players_json()) }))
        .route(
            "/api/bet",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "status": "BET",
                    "value": body["value"],
                    "player": "localhost:3000"
                }))
            }),
        )
        .route(
            "/api/call",
            post(|| async { Json(json!({"status": "CALL", "player": "localhost:3000"})) }),
        )
        .route(
            "/api/fold",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "not your turn"})),
                )
            }),
        )
        .route(
            "/api/check",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, String::new()) }),
        )
        .route(
            "/api/connect",
            post(|Json(body): Json<Value>| async move {
                Json(json!({"status": "connected", "peer": body["addr"]}))
            }),
        )
}

// ============================================================================
// Network error scenarios
// ============================================================================

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // No server on this port.
    let client = ApiClient::new("http://127.0.0.1:19999");

    let err = client.table_state().await.unwrap_err();
    assert!(err.is_transport(), "expected transport error, got: {err}");
    assert!(err.to_string().starts_with("Connection failed:"));
}

#[tokio::test]
async fn test_malformed_url() {
    let client = ApiClient::new("not-a-valid-url");

    assert!(client.players().await.is_err());
}

#[tokio::test]
async fn test_multiple_clients_are_independent() {
    let client1 = ApiClient::new("http://127.0.0.1:19999");
    let client2 = ApiClient::new("http://127.0.0.1:19998");

    assert!(client1.table_state().await.is_err());
    assert!(client2.table_state().await.is_err());
}

// ============================================================================
// Stub gateway round trips
// ============================================================================

#[tokio::test]
async fn test_table_read_end_to_end() {
    let base_url = spawn_gateway(stub_app()).await;
    let client = ApiClient::new(base_url);

    let table = client.table_state().await.unwrap();
    assert_eq!(table.status, GameStatus::Preflop);
    assert_eq!(table.highest_bet, 40);
    assert_eq!(table.my_hand.len(), 2);
    assert_eq!(table.my_hand[0].to_string(), "A♠");
    assert!(table.can(PlayerAction::Call));
    assert!(table.turn_consistent());
}

#[tokio::test]
async fn test_players_read_end_to_end() {
    let base_url = spawn_gateway(stub_app()).await;
    let client = ApiClient::new(base_url);

    let players = client.players().await.unwrap();
    assert_eq!(players.players.len(), 2);
    assert!(players.counts_consistent());
}

#[tokio::test]
async fn test_health_end_to_end() {
    let base_url = spawn_gateway(stub_app()).await;
    let client = ApiClient::new(base_url);

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.game_status, GameStatus::Preflop);
}

#[tokio::test]
async fn test_bet_round_trips_value() {
    let base_url = spawn_gateway(stub_app()).await;
    let client = ApiClient::new(base_url);

    let ack = client.bet(50).await.unwrap();
    assert_eq!(ack.status, "BET");
    assert_eq!(ack.value, Some(50));
    assert_eq!(ack.player, "localhost:3000");
}

#[tokio::test]
async fn test_action_ack_without_value() {
    let base_url = spawn_gateway(stub_app()).await;
    let client = ApiClient::new(base_url);

    let ack = client.call().await.unwrap();
    assert_eq!(ack.status, "CALL");
    assert_eq!(ack.value, None);
}

#[tokio::test]
async fn test_connect_peer_ack() {
    let base_url = spawn_gateway(stub_app()).await;
    let client = ApiClient::new(base_url);

    client.connect_peer("localhost:3001").await.unwrap();
}

// ============================================================================
// Rejection surfacing
// ============================================================================

#[tokio::test]
async fn test_rejection_surfaces_error_body() {
    let base_url = spawn_gateway(stub_app()).await;
    let client = ApiClient::new(base_url);

    let err = client.fold().await.unwrap_err();
    match err {
        GatewayError::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "not your turn");
        }
        other => panic!("expected rejection, got: {other}"),
    }
}

#[tokio::test]
async fn test_rejection_without_body_reports_status_code() {
    let base_url = spawn_gateway(stub_app()).await;
    let client = ApiClient::new(base_url);

    let err = client.check().await.unwrap_err();
    assert_eq!(err.to_string(), "Connection failed: 500");
}

// ============================================================================
// Store against a live gateway
// ============================================================================

#[tokio::test]
async fn test_store_reconciles_against_gateway() {
    let base_url = spawn_gateway(stub_app()).await;
    let gateway: Arc<dyn Gateway> = Arc::new(ApiClient::new(base_url));
    let store = GameStore::with_retry(gateway, RetryPolicy::none());

    store.refresh().await.unwrap();

    let snapshot = store.snapshot();
    assert!(snapshot.connected);
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.table.unwrap().pot, 60);
    assert_eq!(snapshot.players.unwrap().total_players, 2);
}
