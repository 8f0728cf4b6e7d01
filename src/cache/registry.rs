//! Cache Registry Module
//!
//! Builds every facade and owns their background tasks.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::bans::BanCache;
use super::boards::BoardsCache;
use super::stats::CacheStats;
use super::store::Sweep;
use super::threads::{ThreadCache, ThreadsPageCache, TrendingThreadsCache};
use crate::config::{CacheConfig, ExpiryPolicy};
use crate::repository::Repository;
use crate::tasks::{spawn_ban_pruner, spawn_ban_refresh, spawn_sweeper};

// == Registry Stats ==
/// Stats for every facade, as served by `/stats`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegistryStats {
    pub boards: CacheStats,
    pub trending: CacheStats,
    pub threads_page: CacheStats,
    pub thread: CacheStats,
    pub bans: CacheStats,
}

// == Cache Registry ==
/// Every cache facade plus the tasks that keep them fresh.
pub struct CacheRegistry {
    pub boards: BoardsCache,
    pub trending: TrendingThreadsCache,
    pub threads_page: ThreadsPageCache,
    pub thread: ThreadCache,
    pub bans: BanCache,
    shutdown_tx: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl CacheRegistry {
    // == Build ==
    /// Builds the facades without starting any background task.
    ///
    /// Zero TTLs and periods in `config` are replaced by their defaults.
    pub fn build(repo: Arc<dyn Repository>, config: &CacheConfig) -> Self {
        let config = config.clone().validated();
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            boards: BoardsCache::new(config.boards.ttl),
            trending: TrendingThreadsCache::new(config.trending.ttl),
            threads_page: ThreadsPageCache::new(config.threads_page.ttl),
            thread: ThreadCache::new(config.thread.ttl),
            bans: BanCache::new(repo),
            shutdown_tx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    // == Start ==
    /// Builds the facades, starts one sweeper per expiring facade, the ban
    /// refresh task and the ban pruner.
    ///
    /// Returns only after the first ban refresh has been attempted, so the
    /// request gate never runs against a ban list that was never loaded. If
    /// that refresh fails the registry still starts, with an empty ban list,
    /// and the scheduler keeps retrying.
    pub async fn start(repo: Arc<dyn Repository>, config: &CacheConfig) -> Self {
        let config = config.clone().validated();
        let mut registry = Self::build(Arc::clone(&repo), &config);

        let sweepable: [(Arc<dyn Sweep>, ExpiryPolicy); 4] = [
            (registry.boards.store() as Arc<dyn Sweep>, config.boards),
            (registry.trending.store() as Arc<dyn Sweep>, config.trending),
            (registry.threads_page.store() as Arc<dyn Sweep>, config.threads_page),
            (registry.thread.store() as Arc<dyn Sweep>, config.thread),
        ];

        let mut handles = Vec::with_capacity(sweepable.len() + 2);
        for (store, policy) in sweepable {
            if policy.sweep_lags_ttl() {
                warn!(
                    store = store.name(),
                    ttl_secs = policy.ttl.as_secs(),
                    sweep_secs = policy.sweep_every.as_secs(),
                    "Sweep period exceeds TTL; expired payloads may be served for longer than their TTL"
                );
            }
            handles.push(spawn_sweeper(store, policy.sweep_every, registry.shutdown_tx.subscribe()));
        }

        let (refresh_handle, first_refresh) = spawn_ban_refresh(
            registry.bans.clone(),
            config.ban_refresh_every,
            registry.shutdown_tx.subscribe(),
        );
        handles.push(refresh_handle);

        match first_refresh.await {
            Ok(Ok(count)) => info!(bans = count, "Ban cache primed"),
            Ok(Err(err)) => {
                error!(error = %err, "Initial ban refresh failed; starting with an empty ban list")
            }
            Err(_) => error!("Ban refresh task exited before its first refresh"),
        }

        handles.push(spawn_ban_pruner(
            repo,
            registry.bans.clone(),
            config.ban_prune_every,
            config.ban_max_age_days,
            registry.shutdown_tx.subscribe(),
        ));

        *registry.tasks.get_mut() = handles;
        info!("Cache registry started");
        registry
    }

    // == Shutdown ==
    /// Signals every background task to stop and waits for them to exit.
    pub async fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);

        let handles = std::mem::take(&mut *self.tasks.lock().await);
        for handle in handles {
            if let Err(err) = handle.await {
                warn!(error = %err, "Cache task ended abnormally");
            }
        }
        info!("Cache registry stopped");
    }

    // == Stats ==
    /// Counters for every facade.
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            boards: self.boards.stats(),
            trending: self.trending.stats(),
            threads_page: self.threads_page.stats(),
            thread: self.thread.stats(),
            bans: self.bans.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ban, Board, ThreadWithPosts};
    use crate::repository::MemoryRepository;
    use std::time::Duration;

    fn seeded_repo() -> Arc<MemoryRepository> {
        Arc::new(MemoryRepository::new())
    }

    #[tokio::test]
    async fn test_start_primes_ban_cache() {
        let repo = seeded_repo();
        repo.replace_bans(vec![Ban {
            ip: "1.2.3.4".to_string(),
            reason: "spam".to_string(),
        }])
        .await;

        let registry = CacheRegistry::start(repo, &CacheConfig::default()).await;

        // no waiting: the gate can rely on the list as soon as start returns
        assert_eq!(registry.bans.is_banned("1.2.3.4").as_deref(), Some("spam"));
        registry.shutdown().await;
    }

    #[tokio::test]
    async fn test_start_survives_unavailable_store() {
        let repo = seeded_repo();
        repo.set_available(false);

        let registry = CacheRegistry::start(repo, &CacheConfig::default()).await;

        assert!(registry.bans.is_empty());
        registry.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_every_task() {
        let registry = CacheRegistry::start(seeded_repo(), &CacheConfig::default()).await;
        assert_eq!(registry.tasks.lock().await.len(), 6);

        tokio::time::timeout(Duration::from_secs(5), registry.shutdown())
            .await
            .expect("shutdown should complete");

        assert!(registry.tasks.lock().await.is_empty());
        // a second shutdown is a no-op
        registry.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweepers_follow_configured_periods() {
        let registry = CacheRegistry::start(seeded_repo(), &CacheConfig::default()).await;
        let boards = vec![Board {
            id: 1,
            title: "Technology".to_string(),
            uri: "g".to_string(),
        }];
        registry.boards.insert_boards(&boards).unwrap();
        registry.threads_page.insert_page("g", 1, &[]).unwrap();

        // page TTL 6s, swept every 3s: gone by 9s
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(registry.threads_page.get_page("g", 1).is_none());
        assert!(registry.boards.get_boards().is_some());

        registry.shutdown().await;
    }

    #[tokio::test]
    async fn test_zero_refresh_period_still_primes_bans() {
        let repo = seeded_repo();
        repo.replace_bans(vec![Ban {
            ip: "1.2.3.4".to_string(),
            reason: "spam".to_string(),
        }])
        .await;
        let config = CacheConfig {
            ban_refresh_every: Duration::ZERO,
            ban_prune_every: Duration::ZERO,
            ..CacheConfig::default()
        };

        let registry = CacheRegistry::start(repo, &config).await;

        assert_eq!(registry.bans.is_banned("1.2.3.4").as_deref(), Some("spam"));
        registry.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_thread_cache_still_expires() {
        let config = CacheConfig {
            thread: ExpiryPolicy::from_secs(0, 4),
            threads_page: ExpiryPolicy::from_secs(6, 0),
            ..CacheConfig::default()
        };
        let registry = CacheRegistry::start(seeded_repo(), &config).await;
        let thread = ThreadWithPosts {
            subject: "hello".to_string(),
            is_locked: false,
            is_sticky: false,
            tripcode: String::new(),
            posts: vec![],
        };
        registry.thread.insert_thread(1, &thread).unwrap();
        registry.threads_page.insert_page("g", 1, &[]).unwrap();

        tokio::time::sleep(Duration::from_secs(60 * 60)).await;

        assert!(registry.thread.get_thread(1).is_none());
        assert!(registry.threads_page.get_page("g", 1).is_none());
        registry.shutdown().await;
    }

    #[test]
    fn test_build_has_empty_facades() {
        let registry = CacheRegistry::build(seeded_repo(), &CacheConfig::default());
        let stats = registry.stats();
        assert_eq!(stats.boards.total_entries, 0);
        assert_eq!(stats.bans.total_entries, 0);
    }
}
