/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - ENTROPY Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Layout of the `before` pagination cursor. Sortable, second resolution, always UTC.
pub const CURSOR_FORMAT: &str = "%Y%m%dT%H%M%S";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ReactionCount {
    pub emoji: String,
    pub count: u32,
    pub user_reacted: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Post {
    pub post_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub user_display_name: String,
    pub created_at: DateTime<Utc>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reactions: Vec<ReactionCount>,
    pub reply_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replying_to_post_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replying_to_user_display_name: Option<String>,
    /// Follow-graph hops from the viewer to the author, capped. 0 for the viewer's own posts.
    pub distance_from_user: u8,
}

impl Post {
    /// A freshly loaded, undecorated post.
    pub fn new(
        post_id: i64,
        user_id: i64,
        user_name: String,
        user_display_name: String,
        created_at: DateTime<Utc>,
        content: String,
    ) -> Self {
        Self {
            post_id,
            user_id,
            user_name,
            user_display_name,
            created_at,
            content,
            reactions: Vec::new(),
            reply_count: 0,
            replying_to_post_id: None,
            replying_to_user_display_name: None,
            distance_from_user: 0,
        }
    }

    pub fn is_followed_by_viewer(&self) -> bool {
        self.distance_from_user == 1
    }

    pub fn post_url(&self) -> String {
        format!("/p/{}/", self.post_id)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FeedPage {
    pub posts: Vec<Post>,
    /// Cursor for the next (older) page. Only set when the page came back full.
    pub next_before: Option<String>,
}

impl FeedPage {
    pub fn new(posts: Vec<Post>, limit: usize) -> Self {
        let next_before = if limit > 0 && posts.len() == limit {
            posts.last().map(|p| format_cursor(p.created_at))
        } else {
            None
        };
        Self { posts, next_before }
    }
}

pub fn format_cursor(ts: DateTime<Utc>) -> String {
    ts.format(CURSOR_FORMAT).to_string()
}

/// Lenient cursor parsing: a missing or malformed value means "no time filter",
/// which is an hour past `now`.
pub fn parse_cursor(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    raw.and_then(try_parse_cursor)
        .unwrap_or_else(|| default_before(now))
}

/// Strict form of [`parse_cursor`]: `None` for empty or malformed input.
pub fn try_parse_cursor(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(raw, CURSOR_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn default_before(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::hours(1)
}
