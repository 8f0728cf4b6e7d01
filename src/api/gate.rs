//! Request gate
//!
//! Rejects state-changing requests from banned addresses before they reach
//! a handler. Read-only requests are never checked.

use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use super::handlers::AppState;
use crate::error::CacheError;

fn is_read_only(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Peer address of the connection, with IPv4-mapped IPv6 folded back to
/// IPv4 so it matches how bans are recorded.
fn client_ip(request: &Request) -> Option<IpAddr> {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_canonical())
}

/// Middleware consulting the ban cache on every mutating request.
pub async fn block_banned(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if is_read_only(request.method()) {
        return next.run(request).await;
    }

    let Some(ip) = client_ip(&request) else {
        warn!(method = %request.method(), uri = %request.uri(), "Mutating request without peer address");
        return CacheError::InvalidRequest("Client address unavailable".to_string()).into_response();
    };

    if let Some(reason) = state.cache.bans.is_banned(&ip.to_string()) {
        info!(%ip, method = %request.method(), uri = %request.uri(), "Rejected request from banned address");
        return CacheError::Banned(reason).into_response();
    }

    next.run(request).await
}
