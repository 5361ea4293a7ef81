// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rank ladder: XP thresholds mapped to labels.

use guildxp_config::model::RankTier;
use guildxp_core::GuildXpError;

/// Where a balance sits on the ladder.
#[derive(Debug, Clone, PartialEq)]
pub struct RankProgress {
    /// Threshold of the rank currently held.
    pub current_threshold: u64,
    /// Label of the rank currently held.
    pub current_label: String,
    /// Next threshold and its label, absent at the top rank.
    pub next: Option<(u64, String)>,
    /// Progress from the current threshold to the next, in `0.0..=1.0`.
    /// Always `1.0` at the top rank.
    pub fraction: f64,
}

/// Ascending XP thresholds with a mandatory 0 entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankTable {
    tiers: Vec<(u64, String)>,
}

impl RankTable {
    /// Build from configured tiers in any order.
    ///
    /// Fails if there is no 0 threshold, a threshold repeats, or a label is blank.
    pub fn from_tiers(tiers: &[RankTier]) -> Result<Self, GuildXpError> {
        let mut sorted: Vec<(u64, String)> = tiers
            .iter()
            .map(|t| (t.threshold, t.label.trim().to_string()))
            .collect();
        sorted.sort_by_key(|(threshold, _)| *threshold);

        if sorted.first().is_none_or(|(threshold, _)| *threshold != 0) {
            return Err(GuildXpError::Config(
                "rank table needs a tier at threshold 0".to_string(),
            ));
        }
        if let Some(pair) = sorted.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(GuildXpError::Config(format!(
                "rank threshold {} is defined twice",
                pair[0].0
            )));
        }
        if let Some((threshold, _)) = sorted.iter().find(|(_, label)| label.is_empty()) {
            return Err(GuildXpError::Config(format!(
                "rank at threshold {threshold} has no label"
            )));
        }
        Ok(Self { tiers: sorted })
    }

    /// Label of the baseline (threshold 0) rank.
    pub fn baseline(&self) -> &str {
        &self.tiers[0].1
    }

    /// Label of the highest threshold not above `xp`.
    pub fn rank_for(&self, xp: u64) -> &str {
        &self.tiers[self.tier_index(xp)].1
    }

    /// Progress toward the next rank, for progress bars.
    pub fn progress_for(&self, xp: u64) -> RankProgress {
        let index = self.tier_index(xp);
        let (current_threshold, current_label) = self.tiers[index].clone();
        match self.tiers.get(index + 1) {
            Some((next_threshold, next_label)) => {
                let span = next_threshold - current_threshold;
                let gained = xp - current_threshold;
                RankProgress {
                    current_threshold,
                    current_label,
                    next: Some((*next_threshold, next_label.clone())),
                    fraction: (gained as f64 / span as f64).clamp(0.0, 1.0),
                }
            }
            None => RankProgress {
                current_threshold,
                current_label,
                next: None,
                fraction: 1.0,
            },
        }
    }

    fn tier_index(&self, xp: u64) -> usize {
        // tiers[0] is 0, so at least one threshold is <= xp
        self.tiers
            .partition_point(|(threshold, _)| *threshold <= xp)
            .saturating_sub(1)
    }
}
