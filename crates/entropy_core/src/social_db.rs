/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - ENTROPY Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use entropy_protocol::{Post, ReactionCount};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::EntropyConfig;
use crate::error::EntropyError;
use crate::pool::{acquire, build_pool, AccessMode, PooledConn, SqliteManager, SqlitePool};

/// Content longer than this (in bytes) is truncated on insert.
pub const MAX_POST_LENGTH: usize = 256;

const SCHEMA: &str = r#"
    PRAGMA journal_mode=WAL;
    CREATE TABLE IF NOT EXISTS users (
      user_id INTEGER PRIMARY KEY,
      user_name TEXT NOT NULL UNIQUE,
      display_name TEXT NOT NULL,
      created_at INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS user_follow (
      user_id INTEGER NOT NULL,
      followed_user_id INTEGER NOT NULL,
      followed_at INTEGER NOT NULL,
      PRIMARY KEY(user_id, followed_user_id),
      CHECK (user_id != followed_user_id)
    );
    CREATE INDEX IF NOT EXISTS idx_user_follow_followed ON user_follow(followed_user_id);

    CREATE TABLE IF NOT EXISTS posts (
      post_id INTEGER PRIMARY KEY,
      user_id INTEGER NOT NULL,
      created_at INTEGER NOT NULL,
      content TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_posts_created ON posts(created_at DESC);
    CREATE INDEX IF NOT EXISTS idx_posts_user_created ON posts(user_id, created_at DESC);

    -- A reply has exactly one parent.
    CREATE TABLE IF NOT EXISTS post_reply (
      reply_post_id INTEGER PRIMARY KEY,
      post_id INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_post_reply_parent ON post_reply(post_id);

    CREATE TABLE IF NOT EXISTS reactions (
      post_id INTEGER NOT NULL,
      user_id INTEGER NOT NULL,
      reacted_at INTEGER NOT NULL,
      emoji TEXT NOT NULL,
      PRIMARY KEY(post_id, user_id)
    );
"#;

const POST_SELECT: &str = r#"
    SELECT p.post_id, u.user_id, u.user_name, u.display_name, p.created_at, p.content
    FROM posts p
    JOIN users u ON u.user_id = p.user_id
"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub user_id: i64,
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserFollowStats {
    pub user_id: i64,
    pub following_count: u64,
    pub follower_count: u64,
}

/// Handle on the database file: a read-only pool for queries and a
/// single-connection read-write pool for mutations.
#[derive(Clone)]
pub struct SocialDb {
    path: PathBuf,
    read_pool: SqlitePool,
    write_pool: SqlitePool,
}

impl SocialDb {
    pub fn open(cfg: &EntropyConfig) -> Result<Self> {
        let path = cfg.db_path.clone();
        let conn = Connection::open(&path).with_context(|| format!("open db: {}", path.display()))?;
        init_schema(&conn)?;
        drop(conn);

        let busy = Duration::from_millis(cfg.db_busy_timeout_ms);
        let wait = cfg.pool_wait_ms.map(Duration::from_millis);
        let write_pool = build_pool(SqliteManager::new(&path, AccessMode::ReadWrite, busy), 1, wait)?;
        let read_pool = build_pool(
            SqliteManager::new(&path, AccessMode::ReadOnly, busy),
            cfg.read_pool_size,
            wait,
        )?;
        Ok(Self {
            path,
            read_pool,
            write_pool,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> Result<PooledConn> {
        acquire(&self.read_pool).await.context("read pool")
    }

    pub async fn write(&self) -> Result<PooledConn> {
        acquire(&self.write_pool).await.context("write pool")
    }

    pub async fn health_check(&self) -> Result<()> {
        let conn = self.read().await?;
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA).context("init schema")?;
    Ok(())
}

pub fn create_user(conn: &Connection, name: &str) -> Result<User> {
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("user name is required");
    }
    conn.execute(
        "INSERT INTO users(user_name, display_name, created_at) VALUES (?1, ?1, ?2)",
        params![name, now_secs()],
    )
    .with_context(|| format!("create user {name}"))?;
    Ok(User {
        user_id: conn.last_insert_rowid(),
        name: name.to_string(),
        display_name: name.to_string(),
    })
}

pub fn get_user(conn: &Connection, user_id: i64) -> Result<Option<User>> {
    conn.query_row(
        "SELECT user_id, user_name, display_name FROM users WHERE user_id=?1",
        params![user_id],
        map_user,
    )
    .optional()
    .map_err(Into::into)
}

pub fn get_user_by_name(conn: &Connection, name: &str) -> Result<Option<User>> {
    conn.query_row(
        "SELECT user_id, user_name, display_name FROM users WHERE user_name=?1 LIMIT 1",
        params![name],
        map_user,
    )
    .optional()
    .map_err(Into::into)
}

/// Returns `true` when a new edge was written, `false` when it already existed.
pub fn follow_user(conn: &Connection, user_id: i64, followed_user_id: i64) -> Result<bool> {
    if user_id == followed_user_id {
        return Err(EntropyError::SelfFollow(user_id).into());
    }
    let n = conn.execute(
        "INSERT INTO user_follow(user_id, followed_user_id, followed_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id, followed_user_id) DO NOTHING",
        params![user_id, followed_user_id, now_secs()],
    )?;
    Ok(n > 0)
}

/// Returns `true` when an edge was removed.
pub fn unfollow_user(conn: &Connection, user_id: i64, followed_user_id: i64) -> Result<bool> {
    let n = conn.execute(
        "DELETE FROM user_follow WHERE user_id=?1 AND followed_user_id=?2",
        params![user_id, followed_user_id],
    )?;
    Ok(n > 0)
}

pub fn is_following(conn: &Connection, user_id: i64, followed_user_id: i64) -> Result<bool> {
    let v: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM user_follow WHERE user_id=?1 AND followed_user_id=?2",
            params![user_id, followed_user_id],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v.is_some())
}

pub fn user_follow_stats(conn: &Connection, user_id: i64) -> Result<UserFollowStats> {
    let (following, followers): (i64, i64) = conn.query_row(
        r#"
        SELECT
          (SELECT COUNT(*) FROM user_follow WHERE user_id=?1),
          (SELECT COUNT(*) FROM user_follow WHERE followed_user_id=?1)
        "#,
        params![user_id],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    Ok(UserFollowStats {
        user_id,
        following_count: following.max(0) as u64,
        follower_count: followers.max(0) as u64,
    })
}

/// Distinct ids followed by any user in `frontier`, in one query. The frontier
/// is bound as a single JSON array, so its width is not limited by SQLite's
/// bind-variable cap.
pub fn followed_user_ids(conn: &Connection, frontier: &[i64]) -> Result<Vec<i64>> {
    if frontier.is_empty() {
        return Ok(Vec::new());
    }
    let mut stmt = conn.prepare_cached(
        "SELECT DISTINCT followed_user_id FROM user_follow
         WHERE user_id IN (SELECT value FROM json_each(?1))",
    )?;
    let rows = stmt.query_map(params![id_list(frontier)?], |r| r.get::<_, i64>(0))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Cuts `content` to at most `MAX_POST_LENGTH` bytes without splitting a character.
pub fn truncate_content(content: &str) -> &str {
    if content.len() <= MAX_POST_LENGTH {
        return content;
    }
    let mut end = MAX_POST_LENGTH;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    &content[..end]
}

pub fn create_post(conn: &Connection, user_id: i64, content: &str) -> Result<i64> {
    create_post_at(conn, user_id, content, Utc::now())
}

pub fn create_post_at(conn: &Connection, user_id: i64, content: &str, created_at: DateTime<Utc>) -> Result<i64> {
    conn.execute(
        "INSERT INTO posts(user_id, created_at, content) VALUES (?1, ?2, ?3)",
        params![user_id, created_at.timestamp(), truncate_content(content)],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Creates a reply to `parent_post_id`. `None` if the parent does not exist.
pub fn reply_to_post(conn: &mut Connection, parent_post_id: i64, user_id: i64, content: &str) -> Result<Option<i64>> {
    let tx = conn.transaction()?;
    if !post_exists(&tx, parent_post_id)? {
        return Ok(None);
    }
    let reply_id = create_post(&tx, user_id, content)?;
    tx.execute(
        "INSERT INTO post_reply(reply_post_id, post_id) VALUES (?1, ?2)",
        params![reply_id, parent_post_id],
    )?;
    tx.commit()?;
    Ok(Some(reply_id))
}

pub fn get_post(conn: &Connection, post_id: i64) -> Result<Option<Post>> {
    let sql = format!("{POST_SELECT} WHERE p.post_id=?1");
    conn.query_row(&sql, params![post_id], map_post)
        .optional()
        .map_err(Into::into)
}

/// Replies to `post_id` created after `after`, oldest first.
pub fn get_post_replies(conn: &Connection, post_id: i64, after: DateTime<Utc>, limit: usize) -> Result<Vec<Post>> {
    let sql = format!(
        "{POST_SELECT}
         JOIN post_reply r ON r.reply_post_id = p.post_id
         WHERE r.post_id=?1 AND p.created_at > ?2
         ORDER BY p.created_at ASC, p.post_id ASC
         LIMIT ?3"
    );
    query_posts(conn, &sql, params![post_id, after.timestamp(), limit as i64])
}

/// Returns `false` if the post does not exist. A repeated reaction is a no-op.
pub fn react_to_post_if_exists(conn: &Connection, user_id: i64, post_id: i64, emoji: &str) -> Result<bool> {
    if !post_exists(conn, post_id)? {
        return Ok(false);
    }
    conn.execute(
        "INSERT INTO reactions(post_id, user_id, reacted_at, emoji) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(post_id, user_id) DO NOTHING",
        params![post_id, user_id, now_secs(), emoji],
    )?;
    Ok(true)
}

pub fn unreact_to_post_if_exists(conn: &Connection, user_id: i64, post_id: i64) -> Result<bool> {
    if !post_exists(conn, post_id)? {
        return Ok(false);
    }
    conn.execute(
        "DELETE FROM reactions WHERE post_id=?1 AND user_id=?2",
        params![post_id, user_id],
    )?;
    Ok(true)
}

pub fn recent_posts(conn: &Connection, before: DateTime<Utc>, limit: usize) -> Result<Vec<Post>> {
    let sql = format!(
        "{POST_SELECT}
         WHERE p.created_at < ?1
         ORDER BY p.created_at DESC, p.post_id DESC
         LIMIT ?2"
    );
    query_posts(conn, &sql, params![before.timestamp(), limit as i64])
}

/// Recent posts by users `user_id` follows, plus `user_id`'s own posts.
pub fn recent_posts_from_followed_users(
    conn: &Connection,
    user_id: i64,
    before: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<Post>> {
    let sql = format!(
        "{POST_SELECT}
         WHERE (p.user_id IN (SELECT followed_user_id FROM user_follow WHERE user_id=?1) OR p.user_id=?1)
           AND p.created_at < ?2
         ORDER BY p.created_at DESC, p.post_id DESC
         LIMIT ?3"
    );
    query_posts(conn, &sql, params![user_id, before.timestamp(), limit as i64])
}

/// Recent posts by users `user_id` does not follow (and who are not `user_id`).
pub fn recent_posts_from_randos(
    conn: &Connection,
    user_id: i64,
    before: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<Post>> {
    let sql = format!(
        "{POST_SELECT}
         WHERE p.created_at < ?2
           AND p.user_id != ?1
           AND p.user_id NOT IN (SELECT followed_user_id FROM user_follow WHERE user_id=?1)
         ORDER BY p.created_at DESC, p.post_id DESC
         LIMIT ?3"
    );
    query_posts(conn, &sql, params![user_id, before.timestamp(), limit as i64])
}

pub fn recent_posts_from_user(
    conn: &Connection,
    user_id: i64,
    before: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<Post>> {
    let sql = format!(
        "{POST_SELECT}
         WHERE p.user_id=?1 AND p.created_at < ?2
         ORDER BY p.created_at DESC, p.post_id DESC
         LIMIT ?3"
    );
    query_posts(conn, &sql, params![user_id, before.timestamp(), limit as i64])
}

/// Reaction tallies per post, grouped by emoji. `user_reacted` is only ever set
/// when a viewer is given.
pub fn reaction_counts_for_posts(
    conn: &Connection,
    viewer_id: Option<i64>,
    post_ids: &[i64],
) -> Result<HashMap<i64, Vec<ReactionCount>>> {
    let mut out: HashMap<i64, Vec<ReactionCount>> = HashMap::new();
    if post_ids.is_empty() {
        return Ok(out);
    }
    let mut stmt = conn.prepare_cached(
        "SELECT post_id, emoji, COUNT(*) AS c, SUM(CASE WHEN user_id=?1 THEN 1 ELSE 0 END) AS me
         FROM reactions
         WHERE post_id IN (SELECT value FROM json_each(?2))
         GROUP BY post_id, emoji
         ORDER BY post_id, c DESC, emoji",
    )?;
    let mut rows = stmt.query(params![viewer_id, id_list(post_ids)?])?;
    while let Some(row) = rows.next()? {
        let post_id: i64 = row.get(0)?;
        let count: i64 = row.get(2)?;
        let me: Option<i64> = row.get(3)?;
        out.entry(post_id).or_default().push(ReactionCount {
            emoji: row.get(1)?,
            count: count.max(0) as u32,
            user_reacted: viewer_id.is_some() && me.unwrap_or(0) > 0,
        });
    }
    Ok(out)
}

pub fn reply_counts_for_posts(conn: &Connection, post_ids: &[i64]) -> Result<HashMap<i64, u32>> {
    if post_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let mut stmt = conn.prepare_cached(
        "SELECT r.post_id, COUNT(*)
         FROM post_reply r
         JOIN posts p ON p.post_id = r.reply_post_id
         WHERE r.post_id IN (SELECT value FROM json_each(?1))
         GROUP BY r.post_id",
    )?;
    let rows = stmt.query_map(params![id_list(post_ids)?], |r| {
        Ok((r.get::<_, i64>(0)?, r.get::<_, i64>(1)?.max(0) as u32))
    })?;
    Ok(rows.collect::<rusqlite::Result<HashMap<_, _>>>()?)
}

/// For each reply among `post_ids`: (parent post id, parent author's display name).
pub fn parents_for_posts(conn: &Connection, post_ids: &[i64]) -> Result<HashMap<i64, (i64, String)>> {
    if post_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let mut stmt = conn.prepare_cached(
        "SELECT r.reply_post_id, r.post_id, u.display_name
         FROM post_reply r
         JOIN posts p ON p.post_id = r.post_id
         JOIN users u ON u.user_id = p.user_id
         WHERE r.reply_post_id IN (SELECT value FROM json_each(?1))",
    )?;
    let rows = stmt.query_map(params![id_list(post_ids)?], |r| {
        Ok((r.get::<_, i64>(0)?, (r.get::<_, i64>(1)?, r.get::<_, String>(2)?)))
    })?;
    Ok(rows.collect::<rusqlite::Result<HashMap<_, _>>>()?)
}

fn post_exists(conn: &Connection, post_id: i64) -> Result<bool> {
    let v: Option<i64> = conn
        .query_row("SELECT 1 FROM posts WHERE post_id=?1", params![post_id], |r| r.get(0))
        .optional()?;
    Ok(v.is_some())
}

fn query_posts<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Post>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map_post)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn map_post(r: &rusqlite::Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post::new(
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        from_secs(r.get(4)?),
        r.get(5)?,
    ))
}

fn map_user(r: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        user_id: r.get(0)?,
        name: r.get(1)?,
        display_name: r.get(2)?,
    })
}

/// Id batch as one JSON array parameter, unpacked in SQL with `json_each`.
fn id_list(ids: &[i64]) -> Result<String> {
    serde_json::to_string(ids).context("encode id list")
}

fn from_secs(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}

fn now_secs() -> i64 {
    Utc::now().timestamp()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::is_refusal;

    pub(crate) fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    pub(crate) fn at(secs: i64) -> DateTime<Utc> {
        from_secs(1_700_000_000 + secs)
    }

    #[test]
    fn follow_is_idempotent_and_self_follow_is_refused() {
        let conn = test_conn();
        let max = create_user(&conn, "Max").unwrap();
        let luna = create_user(&conn, "Luna").unwrap();

        assert!(follow_user(&conn, max.user_id, luna.user_id).unwrap());
        assert!(!follow_user(&conn, max.user_id, luna.user_id).unwrap());
        assert!(is_following(&conn, max.user_id, luna.user_id).unwrap());
        assert!(!is_following(&conn, luna.user_id, max.user_id).unwrap());

        let err = follow_user(&conn, max.user_id, max.user_id).unwrap_err();
        assert!(is_refusal(&err));
        assert_eq!(
            err.downcast_ref::<EntropyError>(),
            Some(&EntropyError::SelfFollow(max.user_id))
        );
    }

    #[test]
    fn unfollow_twice_is_fine() {
        let conn = test_conn();
        let max = create_user(&conn, "Max").unwrap();
        let luna = create_user(&conn, "Luna").unwrap();
        follow_user(&conn, max.user_id, luna.user_id).unwrap();

        assert!(unfollow_user(&conn, max.user_id, luna.user_id).unwrap());
        assert!(!unfollow_user(&conn, max.user_id, luna.user_id).unwrap());
        assert!(!is_following(&conn, max.user_id, luna.user_id).unwrap());
    }

    #[test]
    fn schema_rejects_self_edges_too() {
        let conn = test_conn();
        let max = create_user(&conn, "Max").unwrap();
        let res = conn.execute(
            "INSERT INTO user_follow(user_id, followed_user_id, followed_at) VALUES (?1, ?1, 0)",
            params![max.user_id],
        );
        assert!(res.is_err());
    }

    #[test]
    fn follower_stats() {
        let conn = test_conn();
        let max = create_user(&conn, "Max").unwrap();
        let luna = create_user(&conn, "Luna").unwrap();
        follow_user(&conn, max.user_id, luna.user_id).unwrap();

        let s = user_follow_stats(&conn, max.user_id).unwrap();
        assert_eq!((s.following_count, s.follower_count), (1, 0));
        let s = user_follow_stats(&conn, luna.user_id).unwrap();
        assert_eq!((s.following_count, s.follower_count), (0, 1));
    }

    #[test]
    fn users_by_name() {
        let conn = test_conn();
        let max = create_user(&conn, "Max").unwrap();
        assert_eq!(get_user_by_name(&conn, "Max").unwrap(), Some(max.clone()));
        assert_eq!(get_user(&conn, max.user_id).unwrap(), Some(max));
        assert!(get_user_by_name(&conn, "Nobody").unwrap().is_none());
        assert!(create_user(&conn, "Max").is_err());
        assert!(create_user(&conn, "  ").is_err());
    }

    #[test]
    fn long_content_is_truncated_on_a_char_boundary() {
        let conn = test_conn();
        let max = create_user(&conn, "Max").unwrap();
        let long = "é".repeat(200);
        let id = create_post(&conn, max.user_id, &long).unwrap();
        let post = get_post(&conn, id).unwrap().unwrap();
        assert_eq!(post.content.len(), MAX_POST_LENGTH);
        assert_eq!(post.content.chars().count(), 128);

        let odd = format!("a{}", "é".repeat(200));
        assert_eq!(truncate_content(&odd).len(), MAX_POST_LENGTH - 1);
        assert_eq!(truncate_content("short"), "short");
    }

    #[test]
    fn feed_queries_split_followed_and_randos() {
        let conn = test_conn();
        let max = create_user(&conn, "Max").unwrap();
        let luna = create_user(&conn, "Luna").unwrap();
        let rando = create_user(&conn, "Rando").unwrap();
        follow_user(&conn, max.user_id, luna.user_id).unwrap();

        let own = create_post_at(&conn, max.user_id, "mine", at(1)).unwrap();
        let followed = create_post_at(&conn, luna.user_id, "luna", at(2)).unwrap();
        let chaos = create_post_at(&conn, rando.user_id, "rando", at(3)).unwrap();

        let ids = |posts: Vec<Post>| posts.into_iter().map(|p| p.post_id).collect::<Vec<_>>();
        let before = at(100);
        assert_eq!(
            ids(recent_posts_from_followed_users(&conn, max.user_id, before, 10).unwrap()),
            vec![followed, own]
        );
        assert_eq!(ids(recent_posts_from_randos(&conn, max.user_id, before, 10).unwrap()), vec![chaos]);
        assert_eq!(ids(recent_posts(&conn, before, 10).unwrap()), vec![chaos, followed, own]);
        assert_eq!(ids(recent_posts(&conn, before, 2).unwrap()), vec![chaos, followed]);
        assert_eq!(ids(recent_posts_from_user(&conn, luna.user_id, before, 10).unwrap()), vec![followed]);
        // strictly older than the cursor
        assert_eq!(ids(recent_posts(&conn, at(2), 10).unwrap()), vec![own]);
    }

    #[test]
    fn frontier_lookup_is_distinct() {
        let conn = test_conn();
        let a = create_user(&conn, "a").unwrap().user_id;
        let b = create_user(&conn, "b").unwrap().user_id;
        let c = create_user(&conn, "c").unwrap().user_id;
        follow_user(&conn, a, c).unwrap();
        follow_user(&conn, b, c).unwrap();
        follow_user(&conn, b, a).unwrap();

        let mut next = followed_user_ids(&conn, &[a, b]).unwrap();
        next.sort();
        assert_eq!(next, vec![a, c]);
        assert!(followed_user_ids(&conn, &[]).unwrap().is_empty());
    }

    #[test]
    fn reactions_tally_with_viewer_flag() {
        let conn = test_conn();
        let max = create_user(&conn, "Max").unwrap();
        let luna = create_user(&conn, "Luna").unwrap();
        let bird = create_user(&conn, "Bird").unwrap();
        let post = create_post(&conn, luna.user_id, "hello").unwrap();

        assert!(react_to_post_if_exists(&conn, max.user_id, post, "🔥").unwrap());
        assert!(react_to_post_if_exists(&conn, bird.user_id, post, "🔥").unwrap());
        assert!(react_to_post_if_exists(&conn, luna.user_id, post, "🙂").unwrap());
        // one reaction per user per post
        assert!(react_to_post_if_exists(&conn, max.user_id, post, "🙂").unwrap());
        assert!(!react_to_post_if_exists(&conn, max.user_id, 9999, "🔥").unwrap());

        let counts = reaction_counts_for_posts(&conn, Some(max.user_id), &[post]).unwrap();
        let tally = &counts[&post];
        assert_eq!(tally.len(), 2);
        assert_eq!(tally[0], ReactionCount { emoji: "🔥".into(), count: 2, user_reacted: true });
        assert_eq!(tally[1], ReactionCount { emoji: "🙂".into(), count: 1, user_reacted: false });

        let anon = reaction_counts_for_posts(&conn, None, &[post]).unwrap();
        assert!(anon[&post].iter().all(|r| !r.user_reacted));

        assert!(unreact_to_post_if_exists(&conn, max.user_id, post).unwrap());
        let counts = reaction_counts_for_posts(&conn, Some(max.user_id), &[post]).unwrap();
        assert_eq!(counts[&post][0].count, 1);
        assert!(counts[&post].iter().all(|r| !r.user_reacted));
    }

    #[test]
    fn replies_counts_and_parents() {
        let mut conn = test_conn();
        let max = create_user(&conn, "Max").unwrap();
        let luna = create_user(&conn, "Luna").unwrap();
        let parent = create_post_at(&conn, luna.user_id, "question", at(1)).unwrap();
        let r1 = reply_to_post(&mut conn, parent, max.user_id, "answer").unwrap().unwrap();
        let r2 = reply_to_post(&mut conn, parent, luna.user_id, "thanks").unwrap().unwrap();
        assert!(reply_to_post(&mut conn, 4242, max.user_id, "void").unwrap().is_none());

        let counts = reply_counts_for_posts(&conn, &[parent, r1]).unwrap();
        assert_eq!(counts.get(&parent), Some(&2));
        assert_eq!(counts.get(&r1), None);

        let parents = parents_for_posts(&conn, &[parent, r1, r2]).unwrap();
        assert_eq!(parents.get(&r1), Some(&(parent, "Luna".to_string())));
        assert_eq!(parents.get(&r2), Some(&(parent, "Luna".to_string())));
        assert!(!parents.contains_key(&parent));

        let replies = get_post_replies(&conn, parent, at(0), 10).unwrap();
        assert_eq!(replies.iter().map(|p| p.post_id).collect::<Vec<_>>(), vec![r1, r2]);
    }

    #[test]
    fn batch_aggregates_accept_huge_id_lists() {
        let mut conn = test_conn();
        let max = create_user(&conn, "Max").unwrap();
        let parent = create_post(&conn, max.user_id, "root").unwrap();
        let reply = reply_to_post(&mut conn, parent, max.user_id, "re").unwrap().unwrap();
        react_to_post_if_exists(&conn, max.user_id, parent, "🔥").unwrap();

        let mut ids: Vec<i64> = (100_000..140_000).collect();
        ids.push(parent);
        ids.push(reply);

        let reactions = reaction_counts_for_posts(&conn, Some(max.user_id), &ids).unwrap();
        assert_eq!(reactions.len(), 1);
        assert!(reactions[&parent][0].user_reacted);
        assert_eq!(reply_counts_for_posts(&conn, &ids).unwrap().get(&parent), Some(&1));
        assert_eq!(
            parents_for_posts(&conn, &ids).unwrap().get(&reply),
            Some(&(parent, "Max".to_string()))
        );
        assert!(followed_user_ids(&conn, &ids).unwrap().is_empty());
    }
}
