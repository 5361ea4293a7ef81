// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process write serialization for the roster.
//!
//! The backing store has no compare-and-swap, so two awards for the same
//! member that read the same balance would lose one update. Single-member
//! writers take the shared side of a roster-wide lock plus that member's
//! mutex; roster-wide writers (reconciliation, join, board sync) take the
//! exclusive side.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Held while one member's balance is read, changed, and written.
pub struct MemberGuard<'a> {
    _roster: RwLockReadGuard<'a, ()>,
    _member: OwnedMutexGuard<()>,
}

/// Lock table keyed by member identity.
#[derive(Default)]
pub struct WriteGate {
    roster: RwLock<()>,
    members: DashMap<String, Arc<Mutex<()>>>,
}

impl WriteGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize with other writers of `identity` and with roster-wide writers.
    pub async fn member(&self, identity: &str) -> MemberGuard<'_> {
        let roster = self.roster.read().await;
        // Clone the Arc out so no DashMap shard lock is held across the await.
        let slot = self
            .members
            .entry(identity.trim().to_string())
            .or_default()
            .clone();
        MemberGuard {
            _roster: roster,
            _member: slot.lock_owned().await,
        }
    }

    /// Exclude every other roster writer.
    pub async fn roster(&self) -> RwLockWriteGuard<'_, ()> {
        self.roster.write().await
    }
}
