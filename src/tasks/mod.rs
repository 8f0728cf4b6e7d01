//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Sweeper: Removes expired entries from one cache store at a fixed interval
//! - Ban refresh: Reloads the ban cache from the repository
//! - Ban pruner: Deletes aged-out bans and reloads the ban cache
//!
//! Every task takes a `watch::Receiver<bool>` and exits once it reads `true`.

mod prune;
mod refresh;
mod sweeper;

pub use prune::spawn_ban_pruner;
pub use refresh::spawn_ban_refresh;
pub use sweeper::spawn_sweeper;
