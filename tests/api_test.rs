//! HTTP API tests against the router, no socket involved.

mod support;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use strictly_codenames::{
    ApiError, ApiState, Clue, Event, GameState, Phase, Role, StateError, Team, TurnRequest,
    router, transition,
};
use support::{ScriptedAdapter, failure, finished_state, fixed_state, word};
use tower::ServiceExt;

async fn post(adapter: ScriptedAdapter, path: &str, body: Value) -> (StatusCode, Value) {
    let app = router(ApiState::new(Arc::new(adapter)));
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");
    let response = app.oneshot(request).await.expect("infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn clued_state() -> GameState {
    transition(fixed_state(), Event::ClueGiven(Clue::new("SEA", 2))).state
}

#[tokio::test]
async fn test_clue_endpoint_returns_clue() {
    let adapter = ScriptedAdapter::new().clue("OCEAN", 2);
    let (status, body) = post(
        adapter,
        "/api/clue",
        json!({"team": "red", "state": fixed_state()}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["word"], "OCEAN");
    assert_eq!(body["response"]["number"], 2);
}

#[tokio::test]
async fn test_guess_endpoint_returns_guess() {
    let adapter = ScriptedAdapter::new().guess(word("R3"));
    let (status, body) = post(
        adapter,
        "/api/guess",
        json!({"team": "red", "state": clued_state()}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["kind"], "word");
    assert_eq!(body["response"]["word"], "R3");
}

#[tokio::test]
async fn test_wrong_team_is_bad_request() {
    let (status, body) = post(
        ScriptedAdapter::new().clue("OCEAN", 2),
        "/api/clue",
        json!({"team": "blue", "state": fixed_state()}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("red")));
}

#[tokio::test]
async fn test_finished_game_is_bad_request() {
    let (status, body) = post(
        ScriptedAdapter::new(),
        "/api/clue",
        json!({"team": "blue", "state": finished_state()}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "game is over");
}

#[tokio::test]
async fn test_guess_without_clue_is_bad_request() {
    let (status, _) = post(
        ScriptedAdapter::new().guess(word("R0")),
        "/api/guess",
        json!({"team": "red", "state": fixed_state()}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_inconsistent_state_is_bad_request() {
    let mut state = serde_json::to_value(fixed_state()).expect("serialize");
    state["redScore"] = json!(4);
    let (status, body) = post(
        ScriptedAdapter::new().clue("OCEAN", 2),
        "/api/clue",
        json!({"team": "red", "state": state}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "inconsistent state: red score 4 does not match 0 revealed red cards"
    );
}

#[test]
fn test_validate_wraps_state_error() {
    let mut json = serde_json::to_value(fixed_state()).expect("serialize");
    json["winner"] = json!("blue");
    let state: GameState = serde_json::from_value(json).expect("deserialize");
    let request = TurnRequest {
        team: Team::Red,
        state,
    };
    assert!(matches!(
        request.validate(Phase::AwaitingClue),
        Err(ApiError::InconsistentState(StateError::OutcomeMismatch))
    ));
}

#[tokio::test]
async fn test_malformed_body_gets_error_payload() {
    let (status, body) = post(
        ScriptedAdapter::new(),
        "/api/clue",
        json!({"team": "green"}),
    )
    .await;
    assert!(status.is_client_error());
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_provider_failure_is_bad_gateway() {
    let adapter = ScriptedAdapter::new().push_clue(Err(failure(Role::ClueGiver)));
    let (status, body) = post(
        adapter,
        "/api/clue",
        json!({"team": "red", "state": fixed_state()}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(
        body["error"]
            .as_str()
            .is_some_and(|e| e.contains("3 attempt"))
    );
}
