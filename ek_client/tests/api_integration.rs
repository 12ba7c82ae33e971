//! Integration tests for the score service client.
//!
//! Each test serves a small mock of the score service with axum on an
//! ephemeral port and points the client at it.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use ek_client::api_client::{ApiClient, RequestError};
use ek_client::score_sync::{self, apply_event};
use exploding_kittens::{
    GameState, LeaderboardEntry, SyncField,
    messages::{LeaderboardUpdate, ScoreResponse, ScoreUpdate, UsernameRequest},
};
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

/// Request bodies the mock received, in order.
#[derive(Clone, Default)]
struct Recorded(Arc<Mutex<Vec<Value>>>);

impl Recorded {
    fn push(&self, value: Value) {
        self.0.lock().unwrap().push(value);
    }

    fn all(&self) -> Vec<Value> {
        self.0.lock().unwrap().clone()
    }
}

fn sample_leaderboard() -> Vec<LeaderboardEntry> {
    vec![
        LeaderboardEntry {
            username: "alice".to_string(),
            score: 9,
        },
        LeaderboardEntry {
            username: "bob".to_string(),
            score: 4,
        },
    ]
}

fn mock_service(recorded: Recorded) -> Router {
    Router::new()
        .route(
            "/leaderboard",
            get(|| async { Json(sample_leaderboard()) }),
        )
        .route(
            "/getScore",
            post(
                |State(rec): State<Recorded>, Json(body): Json<UsernameRequest>| async move {
                    rec.push(json!({ "getScore": body.username }));
                    Json(ScoreResponse { score: 3 })
                },
            ),
        )
        .route(
            "/updateScore",
            post(
                |State(rec): State<Recorded>, Json(body): Json<ScoreUpdate>| async move {
                    rec.push(json!({ "updateScore": body.username, "score": body.score }));
                    Json(ScoreResponse { score: body.score })
                },
            ),
        )
        .route(
            "/register",
            post(|Json(body): Json<UsernameRequest>| async move {
                Json(json!({ "message": format!("{} registered", body.username) }))
            }),
        )
        .route(
            "/login",
            post(|Json(body): Json<UsernameRequest>| async move {
                Json(json!({ "user": body.username }))
            }),
        )
        .route(
            "/start",
            post(|Query(q): Query<HashMap<String, String>>| async move {
                Json(json!({ "started": q.get("username") }))
            }),
        )
        .route(
            "/draw",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                Json(json!({ "drawFor": q.get("username"), "card": "cat" }))
            }),
        )
        .route(
            "/updateLeaderboard",
            post(|Json(body): Json<LeaderboardUpdate>| async move {
                Json(json!({ "username": body.username, "points": body.points }))
            }),
        )
        .with_state(recorded)
}

fn failing_service() -> Router {
    async fn boom() -> (StatusCode, &'static str) {
        (StatusCode::INTERNAL_SERVER_ERROR, "boom")
    }
    Router::new()
        .route("/leaderboard", get(boom))
        .route("/getScore", post(boom))
        .route("/updateScore", post(boom))
        .route("/register", post(boom))
}

fn garbled_service() -> Router {
    Router::new().route("/leaderboard", get(|| async { "<html>not json</html>" }))
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Generate unique username for tests
fn unique_username(prefix: &str) -> String {
    let rand_id: u32 = rand::random();
    format!("{}_{}", prefix, rand_id % 100000)
}

// ============================================================================
// Success Path Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_leaderboard() {
    let client = ApiClient::new(serve(mock_service(Recorded::default())).await);
    let board = client.fetch_leaderboard().await.unwrap();
    assert_eq!(board, sample_leaderboard());
}

#[tokio::test]
async fn test_fetch_score_sends_username() {
    let recorded = Recorded::default();
    let client = ApiClient::new(serve(mock_service(recorded.clone())).await);
    let name = unique_username("score");

    let resp = client.fetch_score(&name).await.unwrap();

    assert_eq!(resp.score, 3);
    assert_eq!(recorded.all(), vec![json!({ "getScore": name })]);
}

#[tokio::test]
async fn test_submit_score_increment_adds_one() {
    let recorded = Recorded::default();
    let client = ApiClient::new(serve(mock_service(recorded.clone())).await);

    let resp = client.submit_score_increment("carol", 6).await.unwrap();

    assert_eq!(resp.score, 7);
    assert_eq!(
        recorded.all(),
        vec![json!({ "updateScore": "carol", "score": 7 })]
    );
}

#[tokio::test]
async fn test_user_service_endpoints() {
    let base = serve(mock_service(Recorded::default())).await;
    let client = ApiClient::with_timeout(format!("{base}/"), Duration::from_secs(5)).unwrap();

    let registered = client.register("dave").await.unwrap();
    assert_eq!(registered.message_or_default(), "dave registered");

    let login = client.login("dave").await.unwrap();
    assert_eq!(login["user"], "dave");

    let started = client.start_game("dave").await.unwrap();
    assert_eq!(started["started"], "dave");

    let drawn = client.draw("dave").await.unwrap();
    assert_eq!(drawn["drawFor"], "dave");

    let updated = client.update_leaderboard("dave", 10).await.unwrap();
    assert_eq!(updated["points"], 10);
}

// ============================================================================
// HTTP Error Response Tests
// ============================================================================

#[tokio::test]
async fn test_leaderboard_http_500_leaves_state() {
    let client = ApiClient::new(serve(failing_service()).await);
    let mut state = GameState::new();
    let prior = sample_leaderboard();
    let ticket = state.issue_ticket(SyncField::Leaderboard);
    assert!(state.apply_leaderboard(ticket, prior.clone()));

    let ticket = state.issue_ticket(SyncField::Leaderboard);
    let event = score_sync::fetch_leaderboard(&client, ticket).await;

    match &event {
        score_sync::SyncEvent::Leaderboard { result: Err(err), .. } => {
            assert!(matches!(err, RequestError::Status { status: 500, .. }));
            assert!(err.to_string().contains("boom"));
        }
        other => panic!("expected a failed leaderboard event, got {other:?}"),
    }
    assert!(!apply_event(&mut state, event));
    assert_eq!(state.leaderboard(), prior.as_slice());
}

#[tokio::test]
async fn test_score_endpoints_http_500() {
    let client = ApiClient::new(serve(failing_service()).await);

    let err = client.fetch_score("erin").await.unwrap_err();
    assert_eq!(err.status(), Some(500));

    let err = client.submit_score_increment("erin", 1).await.unwrap_err();
    assert_eq!(err.status(), Some(500));

    let err = client.register("erin").await.unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_missing_endpoint_is_status_error() {
    let client = ApiClient::new(serve(garbled_service()).await);
    let err = client.login("frank").await.unwrap_err();
    assert!(matches!(err, RequestError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_invalid_json_response() {
    let client = ApiClient::new(serve(garbled_service()).await);
    let err = client.fetch_leaderboard().await.unwrap_err();
    assert!(matches!(err, RequestError::Decode { .. }));
}

// ============================================================================
// Network Error Scenario Tests
// ============================================================================

#[tokio::test]
async fn test_connection_refused() {
    let client = ApiClient::new("http://127.0.0.1:19997");
    let err = client.fetch_leaderboard().await.unwrap_err();
    assert!(matches!(err, RequestError::Transport { .. }));
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let router = Router::new().route(
        "/leaderboard",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(Vec::<LeaderboardEntry>::new())
        }),
    );
    let base = serve(router).await;
    let client = ApiClient::with_timeout(base, Duration::from_millis(100)).unwrap();

    let err = client.fetch_leaderboard().await.unwrap_err();
    assert!(matches!(err, RequestError::Transport { .. }));
}
