//! API Routes
//!
//! Configures the Axum router with every board endpoint.

use axum::{middleware, routing::get, routing::post, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::gate::block_banned;
use super::handlers::{
    ban_ip_handler, create_board_handler, health_handler, list_boards_handler, stats_handler,
    thread_handler, threads_page_handler, trending_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - Ban gate: rejects mutating requests from banned addresses
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
///
/// The gate reads the peer address from `ConnectInfo`, so the router has to
/// be served with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/boards", get(list_boards_handler).post(create_board_handler))
        .route("/boards/:uri/threads", get(threads_page_handler))
        .route("/home/trending", get(trending_handler))
        .route("/threads/:id", get(thread_handler))
        .route("/bans/ip", post(ban_ip_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(middleware::from_fn_with_state(state.clone(), block_banned))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
