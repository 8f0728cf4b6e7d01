//! Repository Module
//!
//! The authoritative backing store behind every cache facade. Handlers fall
//! back to it on a cache miss; the ban refresh scheduler re-reads the whole
//! ban list from it.

mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Ban, BanInsert, Board, BoardCreate, ThreadWithOp, ThreadWithPosts, TrendingThread,
};

pub use memory::MemoryRepository;

/// Number of threads on one board page.
pub const PAGE_SIZE: usize = 30;

/// Number of threads in the trending list.
pub const TRENDING_LIMIT: usize = 6;

/// Async access to the backing store.
///
/// Implementations must be safe to share across request tasks and the
/// background refresh task. Failures are reported as
/// [`CacheError::BackingStore`](crate::error::CacheError::BackingStore).
#[async_trait]
pub trait Repository: Send + Sync {
    /// Every active ban.
    async fn list_bans(&self) -> Result<Vec<Ban>>;

    /// Records a new ban.
    async fn ban_ip(&self, ban: BanInsert) -> Result<()>;

    /// Deletes bans created more than `max_age_days` days ago, returning
    /// how many were deleted.
    async fn delete_old_bans(&self, max_age_days: u32) -> Result<usize>;

    /// All boards, ordered for display.
    async fn get_boards(&self) -> Result<Vec<Board>>;

    /// Creates a board and returns it with its assigned id.
    async fn create_board(&self, board: BoardCreate) -> Result<Board>;

    /// The most recently active threads across every board.
    async fn get_trending_threads(&self) -> Result<Vec<TrendingThread>>;

    /// One page of thread summaries for a board, pages numbered from 1.
    async fn get_threads_page(&self, board_uri: &str, page: u32) -> Result<Vec<ThreadWithOp>>;

    /// A thread with all its posts, or None if it does not exist.
    async fn get_thread(&self, thread_id: i64) -> Result<Option<ThreadWithPosts>>;
}
