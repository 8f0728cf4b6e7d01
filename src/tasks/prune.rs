//! Ban Pruning Task
//!
//! Deletes aged-out bans from the repository and reloads the ban cache so
//! the gate stops enforcing them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::cache::BanCache;
use crate::repository::Repository;

/// Spawns the periodic ban pruning.
///
/// Runs once immediately and then every `period`. Bans older than
/// `max_age_days` are deleted; when any were, the ban cache is refreshed
/// right away instead of waiting for the next scheduled refresh.
pub fn spawn_ban_pruner(
    repo: Arc<dyn Repository>,
    bans: BanCache,
    period: Duration,
    max_age_days: u32,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(period_secs = period.as_secs(), max_age_days, "Starting ban pruner");

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    match repo.delete_old_bans(max_age_days).await {
                        Ok(0) => debug!("No aged-out bans"),
                        Ok(deleted) => {
                            info!(deleted, "Deleted aged-out bans");
                            if let Err(err) = bans.refresh().await {
                                error!(error = %err, "Ban refresh after pruning failed");
                            }
                        }
                        Err(err) => error!(error = %err, "Deleting aged-out bans failed"),
                    }
                }
            }
        }

        info!("Ban pruner stopped");
    })
}
