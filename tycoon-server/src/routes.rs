use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use tycoon_api::{ApiResponse, CreateUserRequest, FinishGameRequest, PlayerRecord};

use crate::AppState;
use crate::error::{ApiError, ApiResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/user", post(create_or_get_user))
        .route("/api/user/{user_id}", get(get_user))
        .route("/api/game/finish", post(finish_game))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<ApiResponse<()>> {
    Json(ApiResponse::acknowledged("Pizza Tycoon API is up"))
}

async fn create_or_get_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<PlayerRecord> {
    if request.id.trim().is_empty() {
        return Err(ApiError::bad_request("user id is required"));
    }

    let record = state.players.create_or_get(&request).await?;
    Ok(Json(ApiResponse::ok(record)))
}

async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<PlayerRecord> {
    match state.players.get(&user_id).await? {
        Some(record) => Ok(Json(ApiResponse::ok(record))),
        None => Err(ApiError::not_found("user not found")),
    }
}

async fn finish_game(
    State(state): State<AppState>,
    Json(request): Json<FinishGameRequest>,
) -> ApiResult<PlayerRecord> {
    if request.user_id.trim().is_empty() {
        return Err(ApiError::bad_request("user id is required"));
    }

    let Some((record, resolved)) = state
        .players
        .credit(&request.user_id, request.coins, request.xp)
        .await?
    else {
        return Err(ApiError::not_found("user not found"));
    };

    info!(
        user_id = %request.user_id,
        coins = request.coins,
        xp = request.xp,
        level = record.level,
        levels_gained = resolved.levels_gained,
        "game finished"
    );

    Ok(Json(
        ApiResponse::ok(record).with_level_up(resolved.levels_gained),
    ))
}
