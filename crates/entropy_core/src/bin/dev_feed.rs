/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - ENTROPY Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::{Context, Result};
use entropy_core::{Entropy, EntropyConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cfg = EntropyConfig::from_env();
    let viewer_name = std::env::var("ENTROPY_VIEWER").ok().filter(|v| !v.trim().is_empty());
    let cursor = std::env::var("ENTROPY_BEFORE").ok();
    let limit = std::env::var("ENTROPY_LIMIT")
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok());

    let entropy = Entropy::open(cfg).context("open entropy db")?;
    let viewer = match viewer_name.as_deref() {
        Some(name) => Some(
            entropy
                .user_by_name(name)
                .await?
                .with_context(|| format!("unknown viewer: {name}"))?,
        ),
        None => None,
    };

    let page = entropy.feed_page(viewer, cursor.as_deref(), limit).await?;
    tracing::info!(posts = page.posts.len(), next = ?page.next_before, "feed page");
    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}
