//! TTL Sweeper Task
//!
//! Background task that periodically removes expired entries from one store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::Sweep;

/// Spawns a background task that sweeps `store` every `period`.
///
/// The first sweep runs one full period after spawning. The task exits when
/// `shutdown` turns `true` or its sender is dropped.
///
/// # Example
/// ```ignore
/// let (shutdown_tx, shutdown_rx) = watch::channel(false);
/// let handle = spawn_sweeper(pages.store(), Duration::from_secs(3), shutdown_rx);
/// // Later, during shutdown:
/// let _ = shutdown_tx.send(true);
/// handle.await?;
/// ```
pub fn spawn_sweeper(
    store: Arc<dyn Sweep>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let name = store.name();
        info!(store = name, period_ms = period.as_millis() as u64, "Starting sweeper");

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let removed = store.sweep();
                    if removed > 0 {
                        info!(store = name, removed, "Swept expired entries");
                    } else {
                        debug!(store = name, "Sweep found no expired entries");
                    }
                }
            }
        }

        info!(store = name, "Sweeper stopped");
    })
}
