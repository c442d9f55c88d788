/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - ENTROPY Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::Result;
use chrono::{DateTime, Utc};
use entropy_protocol::{default_before, try_parse_cursor, FeedPage, Post};
use rusqlite::Connection;
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::EntropyConfig;
use crate::feed;
use crate::pages::{self, PostPage, UserPage};
use crate::social_db::{self, SocialDb, User};

/// Async entry point. Every call checks out a pooled connection and runs the
/// query on the blocking pool. Reads go through the read-only pool; writes
/// are serialized on the single write connection.
#[derive(Clone)]
pub struct Entropy {
    db: SocialDb,
    cfg: EntropyConfig,
}

impl Entropy {
    pub fn open(cfg: EntropyConfig) -> Result<Self> {
        let db = SocialDb::open(&cfg)?;
        Ok(Self { db, cfg })
    }

    pub fn config(&self) -> &EntropyConfig {
        &self.cfg
    }

    pub fn db(&self) -> &SocialDb {
        &self.db
    }

    async fn with_read<T, F>(&self, op: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let started = Instant::now();
        let conn = self.db.read().await?;
        let out = tokio::task::spawn_blocking(move || f(&*conn)).await??;
        debug!(op, elapsed_ms = started.elapsed().as_millis() as u64, "read done");
        Ok(out)
    }

    async fn with_write<T, F>(&self, op: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let started = Instant::now();
        let mut conn = self.db.write().await?;
        let out = tokio::task::spawn_blocking(move || f(&mut *conn)).await??;
        debug!(op, elapsed_ms = started.elapsed().as_millis() as u64, "write done");
        Ok(out)
    }

    /// Home feed posts strictly older than `before`.
    pub async fn recommend(&self, viewer: Option<User>, before: DateTime<Utc>, limit: usize) -> Result<Vec<Post>> {
        self.with_read("recommend", move |conn| {
            feed::recommended_posts(conn, viewer.as_ref(), before, limit, &mut rand::thread_rng())
        })
        .await
    }

    /// One page of the home feed. A missing or malformed cursor starts from the
    /// top; `limit` falls back to the configured page size.
    pub async fn feed_page(&self, viewer: Option<User>, cursor: Option<&str>, limit: Option<usize>) -> Result<FeedPage> {
        let before = before_from_cursor(cursor);
        let limit = limit.filter(|n| *n > 0).unwrap_or(self.cfg.feed_page_size);
        let posts = self.recommend(viewer, before, limit).await?;
        Ok(FeedPage::new(posts, limit))
    }

    pub async fn user_posts(
        &self,
        viewer: Option<User>,
        author_id: i64,
        before: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Post>> {
        self.with_read("user_posts", move |conn| {
            feed::user_posts(conn, viewer.as_ref(), author_id, before, limit, &mut rand::thread_rng())
        })
        .await
    }

    /// Profile page for `user_name`, or `None` if no such user.
    pub async fn user_page(&self, viewer: Option<User>, user_name: &str, cursor: Option<&str>) -> Result<Option<UserPage>> {
        let before = before_from_cursor(cursor);
        let limit = self.cfg.feed_page_size;
        let user_name = user_name.to_string();
        self.with_read("user_page", move |conn| {
            let Some(user) = social_db::get_user_by_name(conn, &user_name)? else {
                return Ok(None);
            };
            let page = pages::user_page(conn, viewer.as_ref(), user, before, limit, &mut rand::thread_rng())?;
            Ok(Some(page))
        })
        .await
    }

    pub async fn post_page(&self, viewer: Option<User>, post_id: i64) -> Result<Option<PostPage>> {
        let limit = self.cfg.feed_page_size;
        self.with_read("post_page", move |conn| {
            pages::post_page(conn, viewer.as_ref(), post_id, limit, &mut rand::thread_rng())
        })
        .await
    }

    pub async fn user_by_name(&self, user_name: &str) -> Result<Option<User>> {
        let user_name = user_name.to_string();
        self.with_read("user_by_name", move |conn| social_db::get_user_by_name(conn, &user_name))
            .await
    }

    pub async fn create_user(&self, user_name: &str) -> Result<User> {
        let user_name = user_name.to_string();
        self.with_write("create_user", move |conn| social_db::create_user(conn, &user_name))
            .await
    }

    /// Self-follows are refused with [`crate::error::EntropyError::SelfFollow`].
    pub async fn follow_user(&self, user_id: i64, followed_user_id: i64) -> Result<bool> {
        self.with_write("follow_user", move |conn| {
            social_db::follow_user(conn, user_id, followed_user_id)
        })
        .await
    }

    pub async fn unfollow_user(&self, user_id: i64, followed_user_id: i64) -> Result<bool> {
        self.with_write("unfollow_user", move |conn| {
            social_db::unfollow_user(conn, user_id, followed_user_id)
        })
        .await
    }

    pub async fn create_post(&self, user_id: i64, content: &str) -> Result<i64> {
        let content = content.to_string();
        self.with_write("create_post", move |conn| social_db::create_post(conn, user_id, &content))
            .await
    }

    /// `None` if the parent post does not exist.
    pub async fn reply_to_post(&self, parent_post_id: i64, user_id: i64, content: &str) -> Result<Option<i64>> {
        let content = content.to_string();
        self.with_write("reply_to_post", move |conn| {
            social_db::reply_to_post(conn, parent_post_id, user_id, &content)
        })
        .await
    }

    pub async fn react(&self, user_id: i64, post_id: i64, emoji: &str) -> Result<bool> {
        let emoji = emoji.to_string();
        self.with_write("react", move |conn| {
            social_db::react_to_post_if_exists(conn, user_id, post_id, &emoji)
        })
        .await
    }

    pub async fn unreact(&self, user_id: i64, post_id: i64) -> Result<bool> {
        self.with_write("unreact", move |conn| {
            social_db::unreact_to_post_if_exists(conn, user_id, post_id)
        })
        .await
    }
}

fn before_from_cursor(cursor: Option<&str>) -> DateTime<Utc> {
    let now = Utc::now();
    match cursor.map(str::trim).filter(|c| !c.is_empty()) {
        None => default_before(now),
        Some(raw) => try_parse_cursor(raw).unwrap_or_else(|| {
            warn!(cursor = raw, "malformed cursor, starting from the top");
            default_before(now)
        }),
    }
}
