//! HTTP API endpoints.
//!
//! Every handler is a thin wrapper over an `AppState` operation; this module
//! only deals with identity headers, JSON bodies and status codes.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::error::{GameError, RenderError};
use crate::protocol::*;
use crate::render::render_caption_png;
use crate::state::{AppState, NextRound};
use crate::types::*;

/// Error returned from a handler
#[derive(Debug)]
pub enum ApiError {
    Game(GameError),
    Render(RenderError),
    Internal(String),
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        ApiError::Game(err)
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        ApiError::Render(err)
    }
}

pub fn status_for(err: &GameError) -> StatusCode {
    match err {
        GameError::UnknownPlayer | GameError::Unnamed => StatusCode::FORBIDDEN,
        GameError::WrongPhase { .. }
        | GameError::GameInProgress
        | GameError::AlreadySubmitted
        | GameError::AlreadyVoted
        | GameError::NotEnoughPlayers { .. } => StatusCode::CONFLICT,
        GameError::DeadlinePassed => StatusCode::GONE,
        GameError::InvalidTarget | GameError::EmptySubmission | GameError::EmptyName => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        GameError::NoPosters => StatusCode::SERVICE_UNAVAILABLE,
        GameError::CaptionNotFound | GameError::NoPosterSelected => StatusCode::NOT_FOUND,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Game(err) => (status_for(&err), ErrorBody::from(&err)),
            ApiError::Render(err) => {
                tracing::error!("Caption render failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "RENDER_FAILED".to_string(),
                        msg: err.to_string(),
                    },
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL".to_string(),
                        msg,
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn header_player_id(headers: &HeaderMap) -> Option<PlayerId> {
    headers
        .get(PLAYER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Caller identity; a request without one is treated as an unknown player
fn require_player_id(headers: &HeaderMap) -> ApiResult<PlayerId> {
    header_player_id(headers).ok_or(ApiError::Game(GameError::UnknownPlayer))
}

/// GET /api/status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusView> {
    Json(state.status().await)
}

/// POST /api/join
///
/// A client that already holds an id sends it in the header to rejoin.
pub async fn join(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<JoinResponse>> {
    let player = state.join(header_player_id(&headers)).await?;
    Ok(Json(JoinResponse {
        player_id: player.id.clone(),
        player,
    }))
}

/// POST /api/name
pub async fn set_name(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<NameRequest>,
) -> ApiResult<Json<Player>> {
    let player_id = require_player_id(&headers)?;
    Ok(Json(state.set_name(&player_id, &req.name).await?))
}

/// GET /api/players
pub async fn list_players(State(state): State<Arc<AppState>>) -> Json<Roster> {
    Json(state.list_players().await)
}

/// POST /api/start
pub async fn start_game(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<RoundStart>> {
    let player_id = require_player_id(&headers)?;
    Ok(Json(state.start_game(&player_id).await?))
}

/// POST /api/captions
pub async fn submit_caption(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CaptionRequest>,
) -> ApiResult<Json<ActionOutcome>> {
    let player_id = require_player_id(&headers)?;
    let outcome = state
        .submit_caption(&player_id, &req.line1, &req.line2)
        .await?;
    Ok(Json(outcome))
}

/// GET /api/ballot
pub async fn ballot(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Ballot>> {
    let player_id = require_player_id(&headers)?;
    Ok(Json(state.ballot(&player_id).await?))
}

/// POST /api/votes
pub async fn submit_vote(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<VoteRequest>,
) -> ApiResult<Json<ActionOutcome>> {
    let player_id = require_player_id(&headers)?;
    Ok(Json(state.submit_vote(&player_id, &req.target).await?))
}

/// GET /api/results
pub async fn round_results(State(state): State<Arc<AppState>>) -> ApiResult<Json<RoundResults>> {
    Ok(Json(state.round_results().await?))
}

/// POST /api/next
pub async fn next_round(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<NextRound>> {
    let player_id = require_player_id(&headers)?;
    Ok(Json(state.next_round(&player_id).await?))
}

/// GET /api/standings
pub async fn final_standings(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<StandingsResponse>> {
    let standings = state.final_standings().await?;
    Ok(Json(StandingsResponse { standings }))
}

/// POST /api/reset
pub async fn reset(State(state): State<Arc<AppState>>) -> Json<StatusView> {
    state.reset().await;
    Json(state.status().await)
}

/// GET /api/captions/{author}/image
///
/// PNG of the author's caption drawn over the current poster.
pub async fn caption_image(
    State(state): State<Arc<AppState>>,
    Path(author): Path<PlayerId>,
) -> ApiResult<Response> {
    let (poster, caption) = state.caption_for_render(&author).await?;
    let assets = state.assets.clone();
    let config = state.render_config.clone();

    let png = tokio::task::spawn_blocking(move || {
        render_caption_png(assets.as_ref(), &poster, &caption, &config)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("render task failed: {}", e)))??;

    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        png,
    )
        .into_response())
}

/// All API routes plus static files from `static_dir`
pub fn router(state: Arc<AppState>, static_dir: impl AsRef<std::path::Path>) -> Router {
    Router::new()
        .route("/api/status", get(status))
        .route("/api/join", post(join))
        .route("/api/name", post(set_name))
        .route("/api/players", get(list_players))
        .route("/api/start", post(start_game))
        .route("/api/captions", post(submit_caption))
        .route("/api/captions/{author}/image", get(caption_image))
        .route("/api/ballot", get(ballot))
        .route("/api/votes", post(submit_vote))
        .route("/api/results", get(round_results))
        .route("/api/next", post(next_round))
        .route("/api/standings", get(final_standings))
        .route("/api/reset", post(reset))
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
