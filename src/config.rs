//! Configuration Module
//!
//! Handles loading and managing server and cache configuration from environment variables.

use std::env;
use std::time::Duration;

use tracing::warn;

/// Time-to-live and sweep period for one expiring cache facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    /// How long an inserted payload stays eligible to be served
    pub ttl: Duration,
    /// How often the sweeper removes expired payloads
    pub sweep_every: Duration,
}

impl ExpiryPolicy {
    /// Builds a policy from whole seconds.
    pub const fn from_secs(ttl: u64, sweep_every: u64) -> Self {
        Self {
            ttl: Duration::from_secs(ttl),
            sweep_every: Duration::from_secs(sweep_every),
        }
    }

    fn or_default(self, facade: &'static str, default: ExpiryPolicy) -> Self {
        Self {
            ttl: nonzero_or(facade, self.ttl, default.ttl),
            sweep_every: nonzero_or(facade, self.sweep_every, default.sweep_every),
        }
    }

    /// Whether a payload can outlive its TTL by more than one sweep period.
    pub fn sweep_lags_ttl(&self) -> bool {
        self.sweep_every > self.ttl
    }
}

/// Cache layer configuration, one policy per facade.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub boards: ExpiryPolicy,
    pub trending: ExpiryPolicy,
    pub threads_page: ExpiryPolicy,
    pub thread: ExpiryPolicy,
    /// Interval between full ban list refreshes
    pub ban_refresh_every: Duration,
    /// Interval between deletions of aged-out bans
    pub ban_prune_every: Duration,
    /// Age in days after which a ban is deleted from the backing store
    pub ban_max_age_days: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            boards: ExpiryPolicy::from_secs(2 * 60 * 60, 60 * 60),
            trending: ExpiryPolicy::from_secs(2 * 60, 60),
            threads_page: ExpiryPolicy::from_secs(6, 3),
            thread: ExpiryPolicy::from_secs(7, 4),
            ban_refresh_every: Duration::from_secs(30 * 60),
            ban_prune_every: Duration::from_secs(24 * 60 * 60),
            ban_max_age_days: 15,
        }
    }
}

impl CacheConfig {
    /// Loads cache policies from environment variables, falling back to defaults.
    ///
    /// # Environment Variables
    /// - `BOARDS_TTL_SECS` / `BOARDS_SWEEP_SECS` (default: 7200 / 3600)
    /// - `TRENDING_TTL_SECS` / `TRENDING_SWEEP_SECS` (default: 120 / 60)
    /// - `THREADS_PAGE_TTL_SECS` / `THREADS_PAGE_SWEEP_SECS` (default: 6 / 3)
    /// - `THREAD_TTL_SECS` / `THREAD_SWEEP_SECS` (default: 7 / 4)
    /// - `BAN_REFRESH_SECS` (default: 1800)
    /// - `BAN_PRUNE_SECS` (default: 86400)
    /// - `BAN_MAX_AGE_DAYS` (default: 15)
    ///
    /// Zero values are replaced by their defaults, see [`CacheConfig::validated`].
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            boards: policy_from_env("BOARDS", defaults.boards),
            trending: policy_from_env("TRENDING", defaults.trending),
            threads_page: policy_from_env("THREADS_PAGE", defaults.threads_page),
            thread: policy_from_env("THREAD", defaults.thread),
            ban_refresh_every: Duration::from_secs(
                env_or("BAN_REFRESH_SECS", defaults.ban_refresh_every.as_secs()),
            ),
            ban_prune_every: Duration::from_secs(
                env_or("BAN_PRUNE_SECS", defaults.ban_prune_every.as_secs()),
            ),
            ban_max_age_days: env_or("BAN_MAX_AGE_DAYS", defaults.ban_max_age_days),
        }
        .validated()
    }

    /// Replaces every zero TTL, period or age with its default.
    ///
    /// A zero TTL would store payloads without expiry and a zero period
    /// cannot drive a timer, so neither is accepted.
    pub fn validated(self) -> Self {
        let defaults = Self::default();
        Self {
            boards: self.boards.or_default("boards", defaults.boards),
            trending: self.trending.or_default("trending", defaults.trending),
            threads_page: self
                .threads_page
                .or_default("threads_page", defaults.threads_page),
            thread: self.thread.or_default("thread", defaults.thread),
            ban_refresh_every: nonzero_or(
                "ban_refresh_every",
                self.ban_refresh_every,
                defaults.ban_refresh_every,
            ),
            ban_prune_every: nonzero_or(
                "ban_prune_every",
                self.ban_prune_every,
                defaults.ban_prune_every,
            ),
            ban_max_age_days: if self.ban_max_age_days == 0 {
                warn!(
                    setting = "ban_max_age_days",
                    default = defaults.ban_max_age_days,
                    "Zero ban age rejected, using default"
                );
                defaults.ban_max_age_days
            } else {
                self.ban_max_age_days
            },
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Cache facade policies
    pub cache: CacheConfig,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - see [`CacheConfig::from_env`] for the cache variables
    pub fn from_env() -> Self {
        Self {
            server_port: env_or("SERVER_PORT", 3000),
            cache: CacheConfig::from_env(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cache: CacheConfig::default(),
        }
    }
}

fn policy_from_env(prefix: &str, default: ExpiryPolicy) -> ExpiryPolicy {
    ExpiryPolicy::from_secs(
        env_or(&format!("{prefix}_TTL_SECS"), default.ttl.as_secs()),
        env_or(&format!("{prefix}_SWEEP_SECS"), default.sweep_every.as_secs()),
    )
}

fn nonzero_or(setting: &'static str, value: Duration, default: Duration) -> Duration {
    if value.is_zero() {
        warn!(
            setting,
            default_secs = default.as_secs(),
            "Zero duration rejected, using default"
        );
        default
    } else {
        value
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
