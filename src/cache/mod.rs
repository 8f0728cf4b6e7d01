//! Cache Module
//!
//! In-process caches sitting in front of the repository: a generic expiring
//! store, the typed facades built on it, and the registry that wires them up.

mod bans;
mod boards;
mod entry;
mod facade;
mod lock;
mod registry;
mod stats;
mod store;
mod threads;


// Re-export public types
pub use bans::BanCache;
pub use boards::BoardsCache;
pub use entry::CacheEntry;
pub use facade::JsonCache;
pub use registry::{CacheRegistry, RegistryStats};
pub use stats::CacheStats;
pub use store::{ExpiringStore, Sweep};
pub use threads::{PageKey, ThreadCache, ThreadsPageCache, TrendingThreadsCache};
