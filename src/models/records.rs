//! Domain records exchanged with the backing store and cached as JSON.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counts characters rather than bytes, so multi-byte titles are measured fairly.
pub(crate) fn valid_length(value: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&value.chars().count())
}

/// Board uris are 1 to 10 ASCII letters or digits.
pub fn valid_board_uri(uri: &str) -> bool {
    (1..=10).contains(&uri.len()) && uri.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Parses `raw` as an IP address and renders it the way the gate sees peers:
/// IPv4-mapped IPv6 folded to IPv4, IPv6 lowercased and compressed.
pub fn canonical_ip(raw: &str) -> Option<String> {
    raw.trim()
        .parse::<IpAddr>()
        .ok()
        .map(|ip| ip.to_canonical().to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: i64,
    pub title: String,
    pub uri: String,
}

/// A board as submitted for creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardCreate {
    pub title: String,
    pub uri: String,
    #[serde(default)]
    pub priority: i32,
}

impl BoardCreate {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if !valid_length(&self.title, 1, 15) {
            return Some("Board title must be 1 to 15 characters".to_string());
        }
        if !valid_board_uri(&self.uri) {
            return Some("Board uri must be 1 to 10 letters or digits".to_string());
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingThread {
    pub id: i64,
    pub board_uri: String,
    pub subject: String,
    pub thumbnail_name: String,
}

/// Thread summary shown on a board page: the thread plus its opening post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadWithOp {
    pub id: i64,
    pub post_id: i64,
    pub subject: String,
    pub is_locked: bool,
    pub is_sticky: bool,
    pub author: String,
    pub tripcode: String,
    pub body_html: String,
    pub thumbnail_name: String,
    pub file_name: String,
    pub created: DateTime<Utc>,
    pub posts_count: i64,
    pub images_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub author: String,
    pub tripcode: String,
    pub body_html: String,
    pub thumbnail_name: String,
    pub file_name: String,
    pub file_original_name: String,
    pub created: DateTime<Utc>,
    /// Ids of posts in the same thread that reply to this one
    pub replies: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadWithPosts {
    pub subject: String,
    pub is_locked: bool,
    pub is_sticky: bool,
    pub tripcode: String,
    pub posts: Vec<Post>,
}

/// An active ban as listed by the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ban {
    pub ip: String,
    pub reason: String,
}

/// A ban as submitted by a moderator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanInsert {
    pub ip: String,
    pub reason: String,
}

impl BanInsert {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if canonical_ip(&self.ip).is_none() {
            return Some("Ban ip must be a valid IP address".to_string());
        }
        if !valid_length(&self.reason, 1, 100) {
            return Some("Ban reason must be 1 to 100 characters".to_string());
        }
        None
    }

    /// Rewrites `ip` into its canonical form. Addresses that do not parse
    /// are left as they are.
    pub fn canonicalized(self) -> Self {
        match canonical_ip(&self.ip) {
            Some(ip) => Self { ip, ..self },
            None => self,
        }
    }
}
