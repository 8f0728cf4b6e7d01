//! Response DTOs for the board API
//!
//! Cached read paths return their stored JSON payload directly; these are
//! the bodies for everything else.

use serde::Serialize;

use crate::cache::{CacheStats, RegistryStats};
use crate::models::Board;

/// Response body for board creation (POST /boards)
#[derive(Debug, Clone, Serialize)]
pub struct BoardCreatedResponse {
    /// Success message
    pub message: String,
    /// The created board
    pub board: Board,
}

impl BoardCreatedResponse {
    pub fn new(board: Board) -> Self {
        Self {
            message: format!("Board '{}' created successfully", board.uri),
            board,
        }
    }
}

/// Response body for an IP ban (POST /bans/ip)
#[derive(Debug, Clone, Serialize)]
pub struct BanResponse {
    /// Success message
    pub message: String,
    /// The banned address
    pub ip: String,
}

impl BanResponse {
    pub fn new(ip: impl Into<String>) -> Self {
        let ip = ip.into();
        Self {
            message: format!("IP '{}' banned successfully", ip),
            ip,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Per-facade counters
    pub caches: RegistryStats,
    /// Hit rate across every expiring facade
    pub hit_rate: f64,
}

impl StatsResponse {
    pub fn new(caches: RegistryStats) -> Self {
        let combined = [
            &caches.boards,
            &caches.trending,
            &caches.threads_page,
            &caches.thread,
        ]
        .into_iter()
        .fold(CacheStats::default(), |acc, stats| CacheStats {
            hits: acc.hits + stats.hits,
            misses: acc.misses + stats.misses,
            ..acc
        });
        let hit_rate = combined.hit_rate();
        Self { caches, hit_rate }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
