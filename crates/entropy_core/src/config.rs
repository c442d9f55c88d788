/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - ENTROPY Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use serde::Serialize;
use std::path::PathBuf;

#[derive(Clone, Debug, Serialize)]
pub struct EntropyConfig {
    pub db_path: PathBuf,
    pub read_pool_size: usize,
    pub db_busy_timeout_ms: u64,
    /// Upper bound on waiting for a pooled connection. `None` waits forever.
    pub pool_wait_ms: Option<u64>,
    pub feed_page_size: usize,
}

impl Default for EntropyConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("entropy.db"),
            read_pool_size: 10,
            db_busy_timeout_ms: 2000,
            pool_wait_ms: Some(5000),
            feed_page_size: 50,
        }
    }
}

impl EntropyConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn with_db_path(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: path.into(),
            ..Self::default()
        }
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let db_path = get("ENTROPY_DB")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);
        let read_pool_size = get("ENTROPY_READ_POOL_SIZE")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(defaults.read_pool_size)
            .max(1)
            .min(256);
        let db_busy_timeout_ms = get("ENTROPY_DB_BUSY_TIMEOUT_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(defaults.db_busy_timeout_ms)
            .min(60_000);
        // 0 disables the bound.
        let pool_wait_ms = match get("ENTROPY_POOL_WAIT_MS").and_then(|v| v.trim().parse::<u64>().ok()) {
            Some(0) => None,
            Some(v) => Some(v.min(300_000)),
            None => defaults.pool_wait_ms,
        };
        let feed_page_size = get("ENTROPY_FEED_PAGE_SIZE")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(defaults.feed_page_size)
            .max(1)
            .min(200);
        Self {
            db_path,
            read_pool_size,
            db_busy_timeout_ms,
            pool_wait_ms,
            feed_page_size,
        }
    }
}
