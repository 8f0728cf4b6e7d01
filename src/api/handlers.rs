//! API Handlers
//!
//! Read handlers answer from a cache facade and fall back to the repository
//! on a miss, caching what they fetched. Write handlers update the
//! repository first and then bring the matching facade in line.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use tracing::error;

use crate::cache::CacheRegistry;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    valid_board_uri, BanInsert, BanResponse, BoardCreate, BoardCreatedResponse, HealthResponse,
    PageQuery, StatsResponse,
};
use crate::repository::Repository;

/// Application state shared across all handlers.
///
/// Facades and repository are injected here rather than reached through
/// globals, so handlers can be exercised against any repository.
#[derive(Clone)]
pub struct AppState {
    /// Cache facades
    pub cache: Arc<CacheRegistry>,
    /// Authoritative backing store
    pub repo: Arc<dyn Repository>,
}

impl AppState {
    /// Creates a new AppState from an existing registry.
    pub fn new(cache: Arc<CacheRegistry>, repo: Arc<dyn Repository>) -> Self {
        Self { cache, repo }
    }

    /// Starts a registry for `repo` using the configured policies.
    pub async fn start(repo: Arc<dyn Repository>, config: &Config) -> Self {
        let cache = CacheRegistry::start(Arc::clone(&repo), &config.cache).await;
        Self::new(Arc::new(cache), repo)
    }
}

fn json_payload(payload: Bytes) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], payload).into_response()
}

fn log_repo_error(event: &'static str) -> impl FnOnce(CacheError) -> CacheError {
    move |err| {
        error!(event, error = %err, "Repository call failed");
        err
    }
}

/// Handler for GET /boards
pub async fn list_boards_handler(State(state): State<AppState>) -> Result<Response> {
    if let Some(payload) = state.cache.boards.get_boards() {
        return Ok(json_payload(payload));
    }

    let boards = state
        .repo
        .get_boards()
        .await
        .map_err(log_repo_error("list boards"))?;
    let payload = state.cache.boards.insert_boards(&boards)?;
    Ok(json_payload(payload))
}

/// Handler for POST /boards
///
/// Flushes the board list so the next read picks up the new board.
pub async fn create_board_handler(
    State(state): State<AppState>,
    Json(board): Json<BoardCreate>,
) -> Result<(StatusCode, Json<BoardCreatedResponse>)> {
    if let Some(error_msg) = board.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let created = state
        .repo
        .create_board(board)
        .await
        .map_err(log_repo_error("create board"))?;
    state.cache.boards.flush();

    Ok((StatusCode::CREATED, Json(BoardCreatedResponse::new(created))))
}

/// Handler for GET /home/trending
pub async fn trending_handler(State(state): State<AppState>) -> Result<Response> {
    if let Some(payload) = state.cache.trending.get_threads() {
        return Ok(json_payload(payload));
    }

    let threads = state
        .repo
        .get_trending_threads()
        .await
        .map_err(log_repo_error("trending threads"))?;
    let payload = state.cache.trending.insert_threads(&threads)?;
    Ok(json_payload(payload))
}

/// Handler for GET /boards/:uri/threads?page=N
pub async fn threads_page_handler(
    State(state): State<AppState>,
    Path(board_uri): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response> {
    if !valid_board_uri(&board_uri) {
        return Err(CacheError::InvalidRequest(format!(
            "Invalid board uri: {board_uri}"
        )));
    }
    let page = query.page().map_err(CacheError::InvalidRequest)?;

    if let Some(payload) = state.cache.threads_page.get_page(&board_uri, page) {
        return Ok(json_payload(payload));
    }

    let threads = state
        .repo
        .get_threads_page(&board_uri, page)
        .await
        .map_err(log_repo_error("list threads"))?;
    let payload = state.cache.threads_page.insert_page(&board_uri, page, &threads)?;
    Ok(json_payload(payload))
}

/// Handler for GET /threads/:id
pub async fn thread_handler(
    State(state): State<AppState>,
    Path(thread_id): Path<i64>,
) -> Result<Response> {
    if let Some(payload) = state.cache.thread.get_thread(thread_id) {
        return Ok(json_payload(payload));
    }

    let thread = state
        .repo
        .get_thread(thread_id)
        .await
        .map_err(log_repo_error("get thread"))?
        .ok_or_else(|| CacheError::NotFound(format!("thread {thread_id}")))?;
    let payload = state.cache.thread.insert_thread(thread_id, &thread)?;
    Ok(json_payload(payload))
}

/// Handler for POST /bans/ip
///
/// The address is stored in canonical form. The ban takes effect in the
/// gate immediately, without waiting for the next scheduled refresh.
pub async fn ban_ip_handler(
    State(state): State<AppState>,
    Json(ban): Json<BanInsert>,
) -> Result<Json<BanResponse>> {
    if let Some(error_msg) = ban.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }
    let ban = ban.canonicalized();

    state
        .repo
        .ban_ip(ban.clone())
        .await
        .map_err(log_repo_error("ban ip"))?;
    state.cache.bans.insert_ban(ban.ip.clone(), ban.reason);

    Ok(Json(BanResponse::new(ban.ip)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(state.cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
