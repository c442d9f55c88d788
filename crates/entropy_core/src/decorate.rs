/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - ENTROPY Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::{Context, Result};
use entropy_protocol::Post;
use rand::Rng;
use rusqlite::Connection;
use std::collections::HashMap;
use tracing::debug;

use crate::distort::{distort_content, MAX_DISTORTION_LEVEL};
use crate::graph::{distances_from_user, FollowGraph};
use crate::social_db::{self, User};

/// Fills in reactions, reply counts, parent links and distance, and distorts
/// content by distance. Every lookup runs before any post is touched, so on
/// error `posts` is left exactly as it was.
pub fn decorate_posts<R: Rng + ?Sized>(
    conn: &Connection,
    viewer: Option<&User>,
    posts: &mut [Post],
    rng: &mut R,
) -> Result<()> {
    decorate_posts_with_graph(conn, conn, viewer, posts, rng)
}

/// [`decorate_posts`] with the follow graph read through `graph` instead of
/// the store connection.
pub fn decorate_posts_with_graph<G, R>(
    conn: &Connection,
    graph: &G,
    viewer: Option<&User>,
    posts: &mut [Post],
    rng: &mut R,
) -> Result<()>
where
    G: FollowGraph + ?Sized,
    R: Rng + ?Sized,
{
    if posts.is_empty() {
        return Ok(());
    }
    let viewer_id = viewer.map(|u| u.user_id);
    let post_ids: Vec<i64> = posts.iter().map(|p| p.post_id).collect();

    let reactions = social_db::reaction_counts_for_posts(conn, viewer_id, &post_ids).context("reaction counts")?;
    let reply_counts = social_db::reply_counts_for_posts(conn, &post_ids).context("reply counts")?;
    let distances = author_distances(graph, viewer_id, posts).context("author distances")?;
    let parents = social_db::parents_for_posts(conn, &post_ids).context("parent posts")?;

    for post in posts.iter_mut() {
        post.reactions = reactions.get(&post.post_id).cloned().unwrap_or_default();
        post.reply_count = reply_counts.get(&post.post_id).copied().unwrap_or(0);

        let distance = match viewer_id {
            None => MAX_DISTORTION_LEVEL,
            Some(v) if v == post.user_id => 0,
            Some(_) => distances
                .get(&post.user_id)
                .copied()
                .unwrap_or(MAX_DISTORTION_LEVEL),
        };
        post.distance_from_user = distance;
        post.content = distort_content(&post.content, distance, rng);

        if let Some((parent_id, parent_name)) = parents.get(&post.post_id) {
            post.replying_to_post_id = Some(*parent_id);
            post.replying_to_user_display_name = Some(parent_name.clone());
        }
    }
    debug!(
        posts = posts.len(),
        authors = distances.len(),
        anonymous = viewer_id.is_none(),
        "decorated posts"
    );
    Ok(())
}

/// One distance lookup for the whole batch, never per post.
fn author_distances<G: FollowGraph + ?Sized>(graph: &G, viewer_id: Option<i64>, posts: &[Post]) -> Result<HashMap<i64, u8>> {
    let Some(viewer_id) = viewer_id else {
        return Ok(HashMap::new());
    };
    let mut authors: Vec<i64> = posts
        .iter()
        .map(|p| p.user_id)
        .filter(|id| *id != viewer_id)
        .collect();
    authors.sort_unstable();
    authors.dedup();
    distances_from_user(graph, viewer_id, &authors)
}
