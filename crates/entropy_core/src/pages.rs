/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - ENTROPY Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::Result;
use chrono::{DateTime, Utc};
use entropy_protocol::Post;
use rand::Rng;
use rusqlite::Connection;
use serde::Serialize;

use crate::decorate::decorate_posts;
use crate::distort::MAX_DISTORTION_LEVEL;
use crate::feed::user_posts;
use crate::graph::distances_from_user;
use crate::social_db::{self, User, UserFollowStats};

/// A profile as seen by a viewer.
#[derive(Debug, Clone, Serialize)]
pub struct UserPage {
    pub user: User,
    pub stats: UserFollowStats,
    pub posts: Vec<Post>,
    pub is_following: bool,
    pub distance_from_user: u8,
}

/// A post with the first page of its replies, decorated together.
#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    pub post: Post,
    pub replies: Vec<Post>,
}

pub fn user_page<R: Rng + ?Sized>(
    conn: &Connection,
    viewer: Option<&User>,
    user: User,
    before: DateTime<Utc>,
    limit: usize,
    rng: &mut R,
) -> Result<UserPage> {
    let posts = user_posts(conn, viewer, user.user_id, before, limit, rng)?;
    let stats = social_db::user_follow_stats(conn, user.user_id)?;
    let (is_following, distance_from_user) = match viewer {
        None => (false, MAX_DISTORTION_LEVEL),
        Some(v) if v.user_id == user.user_id => (false, 0),
        Some(v) => {
            let following = social_db::is_following(conn, v.user_id, user.user_id)?;
            let distance = distances_from_user(conn, v.user_id, &[user.user_id])?
                .get(&user.user_id)
                .copied()
                .unwrap_or(MAX_DISTORTION_LEVEL);
            (following, distance)
        }
    };
    Ok(UserPage {
        user,
        stats,
        posts,
        is_following,
        distance_from_user,
    })
}

/// `None` if the post does not exist.
pub fn post_page<R: Rng + ?Sized>(
    conn: &Connection,
    viewer: Option<&User>,
    post_id: i64,
    reply_limit: usize,
    rng: &mut R,
) -> Result<Option<PostPage>> {
    let Some(post) = social_db::get_post(conn, post_id)? else {
        return Ok(None);
    };
    let replies = social_db::get_post_replies(conn, post_id, DateTime::<Utc>::default(), reply_limit)?;

    let mut all = Vec::with_capacity(replies.len() + 1);
    all.push(post);
    all.extend(replies);
    decorate_posts(conn, viewer, &mut all, rng)?;

    let mut all = all.into_iter();
    let Some(post) = all.next() else {
        return Ok(None);
    };
    Ok(Some(PostPage {
        post,
        replies: all.collect(),
    }))
}
