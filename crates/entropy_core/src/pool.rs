/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - ENTROPY Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use deadpool::managed::{self, Metrics, RecycleError, RecycleResult};
use deadpool::Runtime;
use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

/// Opens rusqlite connections for a deadpool pool.
pub struct SqliteManager {
    path: PathBuf,
    mode: AccessMode,
    busy_timeout: Duration,
}

impl SqliteManager {
    pub fn new(path: impl Into<PathBuf>, mode: AccessMode, busy_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            mode,
            busy_timeout,
        }
    }

    fn flags(&self) -> OpenFlags {
        let base = OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        match self.mode {
            AccessMode::ReadOnly => base | OpenFlags::SQLITE_OPEN_READ_ONLY,
            AccessMode::ReadWrite => {
                base | OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
            }
        }
    }

    fn open(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open_with_flags(&self.path, self.flags())?;
        conn.busy_timeout(self.busy_timeout)?;
        if self.mode == AccessMode::ReadWrite {
            conn.pragma_update(None, "synchronous", "NORMAL")?;
        }
        Ok(conn)
    }
}

#[async_trait]
impl managed::Manager for SqliteManager {
    type Type = Connection;
    type Error = rusqlite::Error;

    async fn create(&self) -> Result<Connection, rusqlite::Error> {
        self.open()
    }

    async fn recycle(&self, conn: &mut Connection, _: &Metrics) -> RecycleResult<rusqlite::Error> {
        if !conn.is_autocommit() {
            return Err(RecycleError::StaticMessage("connection returned inside a transaction"));
        }
        conn.query_row("SELECT 1", [], |_| Ok(()))
            .map_err(RecycleError::Backend)
    }
}

pub type SqlitePool = managed::Pool<SqliteManager>;
pub type PooledConn = managed::Object<SqliteManager>;

pub fn build_pool(manager: SqliteManager, max_size: usize, wait: Option<Duration>) -> Result<SqlitePool> {
    managed::Pool::builder(manager)
        .max_size(max_size.max(1))
        .wait_timeout(wait)
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| anyhow!("build sqlite pool: {e}"))
}

/// Waits for a pooled connection. Dropping the returned future abandons the wait.
pub async fn acquire(pool: &SqlitePool) -> Result<PooledConn> {
    pool.get()
        .await
        .map_err(|e| anyhow!("acquire sqlite connection: {e}"))
}
