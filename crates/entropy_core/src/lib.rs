/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - ENTROPY Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod config;
pub mod decorate;
pub mod distort;
pub mod error;
pub mod feed;
pub mod graph;
pub mod pages;
pub mod pool;
pub mod service;
pub mod social_db;

pub use config::EntropyConfig;
pub use entropy_protocol::{FeedPage, Post, ReactionCount};
pub use error::EntropyError;
pub use service::Entropy;
pub use social_db::{User, UserFollowStats};

pub fn entropy_core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
