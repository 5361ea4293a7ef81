// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use std::collections::HashSet;
use std::str::FromStr;

use crate::diagnostic::ConfigError;
use crate::model::{GuildXpConfig, StoreBackend};

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &GuildXpConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    // Rank ladder must be total over u64.
    if !config.ranks.iter().any(|r| r.threshold == 0) {
        fail("ranks must include a tier with threshold = 0".to_string());
    }
    let mut seen = HashSet::new();
    for tier in &config.ranks {
        if !seen.insert(tier.threshold) {
            fail(format!("duplicate rank threshold {}", tier.threshold));
        }
        if tier.label.trim().is_empty() {
            fail(format!("rank at threshold {} has an empty label", tier.threshold));
        }
    }

    if config.sheets.spreadsheet_id.trim().is_empty() {
        fail("sheets.spreadsheet_id must not be empty".to_string());
    }

    match config.storage.backend {
        StoreBackend::Sheets => {
            if config
                .sheets
                .access_token
                .as_deref()
                .is_none_or(|t| t.trim().is_empty())
            {
                fail("sheets.access_token is required when storage.backend = \"sheets\"".to_string());
            }
            if config.sheets.base_url.trim().is_empty() {
                fail("sheets.base_url must not be empty".to_string());
            }
        }
        StoreBackend::Sqlite => {
            if config.storage.database_path.trim().is_empty() {
                fail("storage.database_path must not be empty".to_string());
            }
        }
    }

    let worksheet_names = [
        ("roster_sheet", &config.sheets.roster_sheet),
        ("events_sheet", &config.sheets.events_sheet),
        ("approvals_sheet", &config.sheets.approvals_sheet),
        ("puzzle_sheet", &config.sheets.puzzle_sheet),
        ("board_sheet", &config.sheets.board_sheet),
        ("quests_sheet", &config.sheets.quests_sheet),
    ];
    let mut titles = HashSet::new();
    for (key, title) in worksheet_names {
        if title.trim().is_empty() {
            fail(format!("sheets.{key} must not be empty"));
        } else if !titles.insert(title.trim()) {
            fail(format!("sheets.{key} `{title}` is used by another worksheet"));
        }
    }

    if config.discord.command_prefix.is_empty() {
        fail("discord.command_prefix must not be empty".to_string());
    }

    if config.leaderboard.default_top == 0 {
        fail("leaderboard.default_top must be at least 1".to_string());
    }

    if config.puzzle.xp_by_attempts.len() != 6 {
        fail(format!(
            "puzzle.xp_by_attempts must have 6 entries (one per attempt count), got {}",
            config.puzzle.xp_by_attempts.len()
        ));
    }

    for (key, expr) in [
        ("daily_cron", &config.quests.daily_cron),
        ("weekly_cron", &config.quests.weekly_cron),
    ] {
        if let Some(expr) = expr.as_deref().filter(|e| !e.trim().is_empty())
            && let Err(e) = croner::Cron::from_str(expr)
        {
            fail(format!("quests.{key} `{expr}` is not a valid cron expression: {e}"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
