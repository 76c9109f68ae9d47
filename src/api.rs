//! HTTP surface: one clue or guess request per call.

use crate::games::codenames::{GameState, Phase, StateError, Team};
use crate::provider::{ModelAdapter, ProviderFailure};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Adapters serving each team.
#[derive(Clone)]
pub struct ApiState {
    red: Arc<dyn ModelAdapter>,
    blue: Arc<dyn ModelAdapter>,
}

impl ApiState {
    /// One adapter for both teams.
    pub fn new(adapter: Arc<dyn ModelAdapter>) -> Self {
        Self::with_teams(Arc::clone(&adapter), adapter)
    }

    /// A separate adapter per team.
    pub fn with_teams(red: Arc<dyn ModelAdapter>, blue: Arc<dyn ModelAdapter>) -> Self {
        Self { red, blue }
    }

    fn adapter_for(&self, team: Team) -> &Arc<dyn ModelAdapter> {
        match team {
            Team::Red => &self.red,
            Team::Blue => &self.blue,
        }
    }
}

/// Body of `POST /api/clue` and `POST /api/guess`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRequest {
    /// Team the request is for.
    pub team: Team,
    /// Current game state.
    pub state: GameState,
}

impl TurnRequest {
    /// Checks that the request can be served in `phase`.
    pub fn validate(&self, phase: Phase) -> Result<(), ApiError> {
        if self.state.is_over() {
            return Err(ApiError::BadRequest("game is over".to_string()));
        }
        if self.team != self.state.current_team() {
            return Err(ApiError::BadRequest(format!(
                "it is {}'s turn, not {}'s",
                self.state.current_team(),
                self.team
            )));
        }
        self.state
            .check_consistency()
            .map_err(ApiError::InconsistentState)?;
        if self.state.phase() != phase {
            return Err(ApiError::BadRequest(format!(
                "game is in phase {}, expected {}",
                self.state.phase(),
                phase
            )));
        }
        Ok(())
    }
}

/// Successful reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResponse<T> {
    /// The clue or guess.
    pub response: T,
}

/// Error reply body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// What went wrong.
    pub error: String,
}

/// Failure of an API call.
#[derive(Debug, Clone, derive_more::Display)]
pub enum ApiError {
    /// The request cannot be served in the given state.
    #[display("{}", _0)]
    BadRequest(String),
    /// The supplied state contradicts itself.
    #[display("inconsistent state: {}", _0)]
    InconsistentState(StateError),
    /// The provider gave up.
    #[display("{}", _0)]
    Provider(ProviderFailure),
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) | ApiError::InconsistentState(_) => StatusCode::BAD_REQUEST,
            ApiError::Provider(_) => StatusCode::BAD_GATEWAY,
        };
        warn!(%status, error = %self, "Request failed");
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Builds the router.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/clue", post(clue_handler))
        .route("/api/guess", post(guess_handler))
        .with_state(state)
}

#[instrument(skip_all)]
async fn clue_handler(
    State(api): State<ApiState>,
    payload: Result<Json<TurnRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    request.validate(Phase::AwaitingClue)?;
    let clue = api
        .adapter_for(request.team)
        .request_clue(&request.state)
        .await
        .map_err(ApiError::Provider)?;
    info!(clue = %clue, "Clue served");
    Ok(Json(TurnResponse { response: clue }).into_response())
}

#[instrument(skip_all)]
async fn guess_handler(
    State(api): State<ApiState>,
    payload: Result<Json<TurnRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    request.validate(Phase::AwaitingGuess)?;
    let guess = api
        .adapter_for(request.team)
        .request_guess(&request.state)
        .await
        .map_err(ApiError::Provider)?;
    info!(?guess, "Guess served");
    Ok(Json(TurnResponse { response: guess }).into_response())
}

/// Serves the router on `addr` until ctrl-c.
#[instrument(skip(state))]
pub async fn serve(addr: std::net::SocketAddr, state: ApiState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down API");
        })
        .await
}
