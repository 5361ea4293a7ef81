// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily word-puzzle share parsing and claims.

use std::sync::LazyLock;

use guildxp_core::GuildXpError;
use regex::Regex;
use tracing::{info, warn};

use crate::award::AwardEngine;

static SHARE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bWordle\s+(\d+)\s+([1-6X])/6\b").expect("share header pattern is valid")
});

/// A parsed share: puzzle number and attempts (`None` when unsolved).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PuzzleShare {
    pub puzzle: u32,
    pub attempts: Option<u8>,
}

/// Find a `Wordle <n> <k>/6` header anywhere in `text`.
///
/// Thousands separators in the puzzle number are ignored and `X` means the
/// puzzle was not solved.
pub fn parse_share(text: &str) -> Option<PuzzleShare> {
    let cleaned = text.replace(',', "");
    let caps = SHARE_HEADER.captures(&cleaned)?;
    let puzzle = caps.get(1)?.as_str().parse().ok()?;
    let attempts = match caps.get(2)?.as_str() {
        "x" | "X" => None,
        digit => Some(digit.parse().ok()?),
    };
    Some(PuzzleShare { puzzle, attempts })
}

/// XP for a solve in `attempts` guesses. Only 1 through 6 are solves.
fn puzzle_reward(attempts: u8, xp_by_attempts: &[u64]) -> Result<u64, GuildXpError> {
    if !(1..=6).contains(&attempts) {
        return Err(GuildXpError::Validation(format!(
            "a solve takes 1 to 6 attempts, not {attempts}"
        )));
    }
    xp_by_attempts
        .get(usize::from(attempts) - 1)
        .copied()
        .ok_or_else(|| GuildXpError::Validation(format!("no puzzle reward for {attempts} attempts")))
}

/// Result of a puzzle claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleOutcome {
    Awarded {
        xp: u64,
        new_total: u64,
        rank: String,
    },
    /// This member already claimed this puzzle.
    AlreadyClaimed,
    /// Unsolved share: recorded, no XP.
    Incomplete,
    MemberNotFound,
}

impl AwardEngine {
    /// Reward a puzzle share at most once per (puzzle, identity).
    ///
    /// The claim is recorded before XP is applied. An unsolved share is
    /// recorded too, so a later re-share of the same puzzle earns nothing.
    pub async fn claim_daily_puzzle(
        &self,
        share: PuzzleShare,
        identity: &str,
        xp_by_attempts: &[u64],
    ) -> Result<PuzzleOutcome, GuildXpError> {
        let identity = identity.trim();
        let xp = share
            .attempts
            .map(|attempts| puzzle_reward(attempts, xp_by_attempts))
            .transpose()?;
        let _guard = self.gate.member(identity).await;

        if self.audit.has_claimed_puzzle(share.puzzle, identity).await? {
            warn!(puzzle = share.puzzle, identity, "puzzle already claimed");
            return Ok(PuzzleOutcome::AlreadyClaimed);
        }
        let Some((layout, member)) = self.directory.find_for_update(identity).await? else {
            return Ok(PuzzleOutcome::MemberNotFound);
        };

        let Some(xp) = xp else {
            self.audit.record_puzzle_claim(share.puzzle, identity).await?;
            info!(puzzle = share.puzzle, identity, "unsolved puzzle recorded");
            return Ok(PuzzleOutcome::Incomplete);
        };

        self.audit.record_puzzle_claim(share.puzzle, identity).await?;
        let (new_total, rank) = self.credit(&layout, &member, xp).await?;
        Ok(PuzzleOutcome::Awarded {
            xp,
            new_total,
            rank,
        })
    }
}
