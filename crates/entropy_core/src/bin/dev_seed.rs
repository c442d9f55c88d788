/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - ENTROPY Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::{Context, Result};
use entropy_core::{Entropy, EntropyConfig};
use rand::seq::SliceRandom;
use rand::Rng;

const WORDS: &[&str] = &[
    "signal", "noise", "static", "drift", "echo", "tide", "ember", "glass", "orbit", "moss", "wire",
    "lantern", "fog", "cinder", "river", "hollow", "bloom",
];

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
        .max(1)
        .min(10_000)
}

fn sentence<R: Rng + ?Sized>(rng: &mut R) -> String {
    let n = rng.gen_range(3..12);
    (0..n)
        .filter_map(|_| WORDS.choose(rng).copied())
        .collect::<Vec<_>>()
        .join(" ")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let users = env_usize("ENTROPY_SEED_USERS", 20);
    let follows = env_usize("ENTROPY_SEED_FOLLOWS", 3);
    let posts = env_usize("ENTROPY_SEED_POSTS", 10);

    let entropy = Entropy::open(EntropyConfig::from_env()).context("open entropy db")?;

    let mut ids = Vec::with_capacity(users);
    for i in 0..users {
        let name = format!("bot{i}");
        let user = match entropy.user_by_name(&name).await? {
            Some(u) => u,
            None => entropy.create_user(&name).await?,
        };
        ids.push(user.user_id);
    }

    let mut edges = 0usize;
    for &id in &ids {
        let targets: Vec<i64> = {
            let mut rng = rand::thread_rng();
            ids.choose_multiple(&mut rng, follows.min(ids.len())).copied().collect()
        };
        for target in targets.into_iter().filter(|t| *t != id) {
            if entropy.follow_user(id, target).await? {
                edges += 1;
            }
        }
    }

    let mut written = 0usize;
    for &id in &ids {
        for _ in 0..posts {
            let content = sentence(&mut rand::thread_rng());
            entropy.create_post(id, &content).await?;
            written += 1;
        }
    }

    tracing::info!(users = ids.len(), follows = edges, posts = written, "seeded");
    Ok(())
}
