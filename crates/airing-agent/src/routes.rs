//! HTTP control surface over the command handler.

use std::sync::Arc;

use airing_core::{
    MediaDetails, MediaId, MediaSummary, NewTrackedItem, Settings, SettingsPatch, TrackedItem,
    WatchError,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tower_http::trace::TraceLayer;

use crate::commands::{CommandHandler, CommandResponse};
use crate::engine::RefreshOutcome;

#[derive(Clone)]
pub struct AppState {
    pub commands: Arc<CommandHandler>,
}

impl AppState {
    pub fn new(commands: Arc<CommandHandler>) -> Self {
        Self { commands }
    }
}

/// Error response carrying the same envelope as successful calls.
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<WatchError> for AppError {
    fn from(e: WatchError) -> Self {
        let status = match &e {
            WatchError::NotFound(_) => StatusCode::NOT_FOUND,
            WatchError::InvalidSettings(_) => StatusCode::BAD_REQUEST,
            WatchError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            WatchError::Network(_) | WatchError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            WatchError::Storage(_) | WatchError::Display(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::with_status(status, e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "{}", self.message);
        }
        (self.status, Json(CommandResponse::<Value>::failure(self.message))).into_response()
    }
}

type ApiResult<T> = Result<Json<CommandResponse<T>>, AppError>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/search", get(search))
        .route("/api/media/:id", get(get_details))
        .route("/api/watchlist", get(get_watchlist).post(add_to_watchlist))
        .route("/api/watchlist/:id", delete(remove_from_watchlist))
        .route("/api/settings", get(get_settings).patch(update_settings))
        .route("/api/refresh", post(force_refresh))
        .route("/api/notifications/:id/click", post(notification_clicked))
        .route("/api/command", post(command))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<Vec<MediaSummary>> {
    let results = state.commands.search(&params.q).await?;
    Ok(Json(CommandResponse::success(results)))
}

async fn get_details(
    State(state): State<AppState>,
    Path(id): Path<MediaId>,
) -> ApiResult<MediaDetails> {
    let details = state.commands.get_details(id).await?;
    Ok(Json(CommandResponse::success(details)))
}

async fn get_watchlist(State(state): State<AppState>) -> ApiResult<Vec<TrackedItem>> {
    Ok(Json(CommandResponse::success(state.commands.get_watchlist().await?)))
}

async fn add_to_watchlist(
    State(state): State<AppState>,
    Json(item): Json<NewTrackedItem>,
) -> ApiResult<bool> {
    Ok(Json(CommandResponse::success(
        state.commands.add_to_watchlist(item).await?,
    )))
}

async fn remove_from_watchlist(
    State(state): State<AppState>,
    Path(id): Path<MediaId>,
) -> ApiResult<bool> {
    Ok(Json(CommandResponse::success(
        state.commands.remove_from_watchlist(id).await?,
    )))
}

async fn get_settings(State(state): State<AppState>) -> ApiResult<Settings> {
    Ok(Json(CommandResponse::success(state.commands.get_settings().await?)))
}

async fn update_settings(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> ApiResult<Settings> {
    Ok(Json(CommandResponse::success(
        state.commands.update_settings(&patch).await?,
    )))
}

async fn force_refresh(State(state): State<AppState>) -> ApiResult<RefreshOutcome> {
    Ok(Json(CommandResponse::success(state.commands.force_refresh().await?)))
}

async fn notification_clicked(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<String> {
    state.commands.notification_clicked(&id).await?;
    Ok(Json(CommandResponse::success(id)))
}

async fn command(State(state): State<AppState>, Json(message): Json<Value>) -> Json<CommandResponse<Value>> {
    Json(state.commands.dispatch_value(message).await)
}
