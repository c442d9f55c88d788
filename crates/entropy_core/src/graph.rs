/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - ENTROPY Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::Result;
use rusqlite::Connection;
use std::collections::{HashMap, HashSet};

use crate::distort::MAX_DISTORTION_LEVEL;
use crate::error::EntropyError;
use crate::social_db;

/// Hops explored before a target is considered far.
pub const MAX_HOPS: u8 = 4;

/// Forward edges of the follow graph.
pub trait FollowGraph {
    /// Distinct users followed by anyone in `frontier`.
    fn followed_by(&self, frontier: &[i64]) -> Result<Vec<i64>>;
}

impl FollowGraph for Connection {
    fn followed_by(&self, frontier: &[i64]) -> Result<Vec<i64>> {
        social_db::followed_user_ids(self, frontier)
    }
}

/// Follow distance from `user_id` to each of `targets`.
///
/// Breadth-first over forward edges, one lookup per hop, at most `MAX_HOPS`
/// lookups. The visited set spans every earlier round, so cycles and
/// follow-backs never re-enter the frontier. Targets not reached within
/// `MAX_HOPS` get `MAX_DISTORTION_LEVEL`, which means "far", not a hop count.
/// `user_id` itself, if asked for, is at 0.
pub fn distances_from_user<G>(graph: &G, user_id: i64, targets: &[i64]) -> Result<HashMap<i64, u8>>
where
    G: FollowGraph + ?Sized,
{
    let mut result = HashMap::with_capacity(targets.len());
    if targets.is_empty() {
        return Ok(result);
    }
    let wanted: HashSet<i64> = targets.iter().copied().filter(|id| *id != user_id).collect();
    if targets.contains(&user_id) {
        result.insert(user_id, 0);
    }

    let mut visited: HashSet<i64> = HashSet::from([user_id]);
    let mut frontier = vec![user_id];
    let mut found = 0usize;
    for hop in 1..=MAX_HOPS {
        if frontier.is_empty() || found == wanted.len() {
            break;
        }
        let next: Vec<i64> = graph
            .followed_by(&frontier)?
            .into_iter()
            .filter(|id| visited.insert(*id))
            .collect();
        for id in &next {
            if !wanted.contains(id) {
                continue;
            }
            if result.insert(*id, hop).is_some() {
                return Err(EntropyError::DuplicateDistance(*id).into());
            }
            found += 1;
        }
        frontier = next;
    }

    for id in wanted {
        result.entry(id).or_insert(MAX_DISTORTION_LEVEL);
    }
    Ok(result)
}
