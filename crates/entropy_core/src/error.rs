/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - ENTROPY Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use thiserror::Error;

/// Failures that are not store/IO errors. They travel inside `anyhow::Error`;
/// callers recover them with `downcast_ref::<EntropyError>()`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntropyError {
    /// A rejected user action, not a server fault.
    #[error("user {0} cannot follow itself")]
    SelfFollow(i64),
    #[error("user {0} returned at more than one distance")]
    DuplicateDistance(i64),
}

impl EntropyError {
    pub fn is_refusal(&self) -> bool {
        matches!(self, EntropyError::SelfFollow(_))
    }
}

/// True when `err` is an operation the caller should report as refused rather than failed.
pub fn is_refusal(err: &anyhow::Error) -> bool {
    err.downcast_ref::<EntropyError>()
        .map(EntropyError::is_refusal)
        .unwrap_or(false)
}
