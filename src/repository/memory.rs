//! In-memory backing store.
//!
//! Holds boards, threads and bans behind a tokio RwLock. It can be switched
//! into an unavailable state to reproduce a database outage.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::{Repository, PAGE_SIZE, TRENDING_LIMIT};
use crate::error::{CacheError, Result};
use crate::models::{
    Ban, BanInsert, Board, BoardCreate, Post, ThreadWithOp, ThreadWithPosts, TrendingThread,
};

#[derive(Debug, Clone)]
struct StoredThread {
    board_uri: String,
    summary: ThreadWithOp,
    posts: Vec<Post>,
}

impl StoredThread {
    /// Creation time of the newest post, falling back to the thread itself.
    fn last_activity(&self) -> DateTime<Utc> {
        self.posts
            .iter()
            .map(|post| post.created)
            .max()
            .unwrap_or(self.summary.created)
    }
}

#[derive(Debug, Clone)]
struct StoredBan {
    ban: Ban,
    created: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Data {
    boards: Vec<(i32, Board)>,
    threads: BTreeMap<i64, StoredThread>,
    bans: Vec<StoredBan>,
}

/// Backing store kept entirely in process memory.
#[derive(Debug)]
pub struct MemoryRepository {
    data: RwLock<Data>,
    available: AtomicBool,
    reads: AtomicU64,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(Data::default()),
            available: AtomicBool::new(true),
            reads: AtomicU64::new(0),
        }
    }

    /// Simulates the store going down (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of read queries served so far. Lets callers observe whether a
    /// request was answered from cache.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    /// Adds a thread and its posts under `board_uri`.
    pub async fn insert_thread(&self, board_uri: &str, summary: ThreadWithOp, posts: Vec<Post>) {
        let mut data = self.data.write().await;
        data.threads.insert(
            summary.id,
            StoredThread {
                board_uri: board_uri.to_string(),
                summary,
                posts,
            },
        );
    }

    /// Replaces the stored ban list wholesale, every ban created now.
    pub async fn replace_bans(&self, bans: Vec<Ban>) {
        let created = Utc::now();
        self.data.write().await.bans = bans
            .into_iter()
            .map(|ban| StoredBan { ban, created })
            .collect();
    }

    /// Adds a ban with an explicit creation time.
    pub async fn insert_ban_created_at(&self, ban: Ban, created: DateTime<Utc>) {
        self.data.write().await.bans.push(StoredBan { ban, created });
    }

    fn check_available(&self, op: &str) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            debug!(op, "Backing store unavailable");
            Err(CacheError::BackingStore(format!("{op}: store unavailable")))
        }
    }

    fn begin_read(&self, op: &str) -> Result<()> {
        self.check_available(op)?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn list_bans(&self) -> Result<Vec<Ban>> {
        self.begin_read("list_bans")?;
        let data = self.data.read().await;
        Ok(data.bans.iter().map(|stored| stored.ban.clone()).collect())
    }

    async fn ban_ip(&self, ban: BanInsert) -> Result<()> {
        self.check_available("ban_ip")?;
        self.data.write().await.bans.push(StoredBan {
            ban: Ban {
                ip: ban.ip,
                reason: ban.reason,
            },
            created: Utc::now(),
        });
        Ok(())
    }

    async fn delete_old_bans(&self, max_age_days: u32) -> Result<usize> {
        self.check_available("delete_old_bans")?;
        let cutoff = Utc::now() - chrono::Duration::days(i64::from(max_age_days));
        let mut data = self.data.write().await;
        let before = data.bans.len();
        data.bans.retain(|stored| stored.created >= cutoff);
        Ok(before - data.bans.len())
    }

    async fn get_boards(&self) -> Result<Vec<Board>> {
        self.begin_read("get_boards")?;
        let data = self.data.read().await;
        let mut boards = data.boards.clone();
        // higher priority first, then creation order
        boards.sort_by_key(|(priority, board)| (std::cmp::Reverse(*priority), board.id));
        Ok(boards.into_iter().map(|(_, board)| board).collect())
    }

    async fn create_board(&self, board: BoardCreate) -> Result<Board> {
        self.check_available("create_board")?;
        let mut data = self.data.write().await;
        if data.boards.iter().any(|(_, b)| b.uri == board.uri) {
            return Err(CacheError::InvalidRequest(format!(
                "Board uri '{}' already exists",
                board.uri
            )));
        }
        let created = Board {
            id: data.boards.iter().map(|(_, b)| b.id).max().unwrap_or(0) + 1,
            title: board.title,
            uri: board.uri,
        };
        data.boards.push((board.priority, created.clone()));
        Ok(created)
    }

    async fn get_trending_threads(&self) -> Result<Vec<TrendingThread>> {
        self.begin_read("get_trending_threads")?;
        let data = self.data.read().await;
        let mut threads: Vec<&StoredThread> = data.threads.values().collect();
        threads.sort_by_key(|thread| std::cmp::Reverse(thread.last_activity()));
        Ok(threads
            .into_iter()
            .take(TRENDING_LIMIT)
            .map(|thread| TrendingThread {
                id: thread.summary.id,
                board_uri: thread.board_uri.clone(),
                subject: thread.summary.subject.clone(),
                thumbnail_name: thread.summary.thumbnail_name.clone(),
            })
            .collect())
    }

    async fn get_threads_page(&self, board_uri: &str, page: u32) -> Result<Vec<ThreadWithOp>> {
        self.begin_read("get_threads_page")?;
        let data = self.data.read().await;
        let mut threads: Vec<&StoredThread> = data
            .threads
            .values()
            .filter(|thread| thread.board_uri == board_uri)
            .collect();
        // stickies first, then most recently bumped
        threads.sort_by_key(|thread| {
            (
                std::cmp::Reverse(thread.summary.is_sticky),
                std::cmp::Reverse(thread.last_activity()),
            )
        });
        let skip = (page.max(1) as usize - 1) * PAGE_SIZE;
        Ok(threads
            .into_iter()
            .skip(skip)
            .take(PAGE_SIZE)
            .map(|thread| thread.summary.clone())
            .collect())
    }

    async fn get_thread(&self, thread_id: i64) -> Result<Option<ThreadWithPosts>> {
        self.begin_read("get_thread")?;
        let data = self.data.read().await;
        Ok(data.threads.get(&thread_id).map(|thread| ThreadWithPosts {
            subject: thread.summary.subject.clone(),
            is_locked: thread.summary.is_locked,
            is_sticky: thread.summary.is_sticky,
            tripcode: thread.summary.tripcode.clone(),
            posts: thread.posts.clone(),
        }))
    }
}
