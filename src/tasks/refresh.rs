//! Ban Refresh Task
//!
//! Reloads the ban cache from the repository on a fixed interval.

use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::cache::BanCache;
use crate::error::Result;

/// Spawns the periodic ban refresh.
///
/// The first refresh runs immediately; later ones every `period`. A failed
/// refresh keeps the previous ban list and is retried on the next tick.
///
/// Returns the task handle and a receiver that resolves with the outcome of
/// the first refresh, so callers can wait until the gate has real data.
pub fn spawn_ban_refresh(
    bans: BanCache,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> (JoinHandle<()>, oneshot::Receiver<Result<usize>>) {
    let (first_tx, first_rx) = oneshot::channel();

    let handle = tokio::spawn(async move {
        info!(period_secs = period.as_secs(), "Starting ban refresh task");

        let mut first = Some(first_tx);
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
                    let outcome = bans.refresh().await;
                    if let Err(err) = &outcome {
                        error!(error = %err, "Ban refresh failed, keeping previous ban list");
                    }
                    if let Some(tx) = first.take() {
                        let _ = tx.send(outcome);
                    }
                }
            }
        }

        info!("Ban refresh task stopped");
    });

    (handle, first_rx)
}
