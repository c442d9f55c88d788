/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - ENTROPY Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::Result;
use chrono::{DateTime, Utc};
use entropy_protocol::Post;
use rand::Rng;
use rusqlite::Connection;

use crate::decorate::decorate_posts;
use crate::social_db::{self, User};

/// Chance of drawing from the followed stream when both streams have posts left.
pub const FOLLOWED_SHARE: f64 = 0.6;

/// Home feed for `viewer`: posts strictly older than `before`, newest first,
/// at most `limit`, decorated.
///
/// Anonymous viewers get the plain recency feed. Signed-in viewers get a random
/// mix of the followed stream (including their own posts) and the chaos stream
/// (everyone else).
pub fn recommended_posts<R: Rng + ?Sized>(
    conn: &Connection,
    viewer: Option<&User>,
    before: DateTime<Utc>,
    limit: usize,
    rng: &mut R,
) -> Result<Vec<Post>> {
    let Some(user) = viewer else {
        let mut posts = social_db::recent_posts(conn, before, limit)?;
        decorate_posts(conn, None, &mut posts, rng)?;
        return Ok(posts);
    };

    let followed = social_db::recent_posts_from_followed_users(conn, user.user_id, before, limit)?;
    let chaos = social_db::recent_posts_from_randos(conn, user.user_id, before, limit)?;
    let mut posts = interleave(followed, chaos, limit, rng);
    sort_newest_first(&mut posts);
    decorate_posts(conn, Some(user), &mut posts, rng)?;
    Ok(posts)
}

/// Posts by one author, as seen by `viewer`.
pub fn user_posts<R: Rng + ?Sized>(
    conn: &Connection,
    viewer: Option<&User>,
    author_id: i64,
    before: DateTime<Utc>,
    limit: usize,
    rng: &mut R,
) -> Result<Vec<Post>> {
    let mut posts = social_db::recent_posts_from_user(conn, author_id, before, limit)?;
    decorate_posts(conn, viewer, &mut posts, rng)?;
    Ok(posts)
}

/// Draws up to `limit` items, always taking the head of the chosen stream.
/// When both streams are non-empty the followed one wins with `FOLLOWED_SHARE`.
pub fn interleave<T, R: Rng + ?Sized>(followed: Vec<T>, chaos: Vec<T>, limit: usize, rng: &mut R) -> Vec<T> {
    let mut out = Vec::with_capacity(limit.min(followed.len() + chaos.len()));
    let mut followed = followed.into_iter();
    let mut chaos = chaos.into_iter();
    while out.len() < limit {
        let take_followed = match (followed.len(), chaos.len()) {
            (0, 0) => break,
            (_, 0) => true,
            (0, _) => false,
            _ => rng.gen_bool(FOLLOWED_SHARE),
        };
        out.extend(if take_followed { followed.next() } else { chaos.next() });
    }
    out
}

pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.post_id.cmp(&a.post_id))
    });
}
