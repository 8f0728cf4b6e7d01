//! Modernboard - caching layer and HTTP surface for an imageboard backend
//!
//! Keeps board lists, trending threads, thread pages, single threads and the
//! IP ban list in process memory, in front of a slower repository.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod tasks;

pub use api::AppState;
pub use cache::CacheRegistry;
pub use config::Config;
pub use repository::{MemoryRepository, Repository};
