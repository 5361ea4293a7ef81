// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cron-driven quest announcements.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};
use croner::Cron;
use guildxp_core::GuildXpError;
use guildxp_discord::DiscordChannel;
use guildxp_ledger::QuestCadence;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub fn parse_cron(expr: &str) -> Result<Cron, GuildXpError> {
    Cron::from_str(expr)
        .map_err(|e| GuildXpError::Config(format!("invalid cron expression `{expr}`: {e}")))
}

/// The first occurrence strictly after `after`.
pub fn next_fire<Tz: TimeZone>(cron: &Cron, after: &DateTime<Tz>) -> Result<DateTime<Tz>, GuildXpError> {
    cron.find_next_occurrence(after, false)
        .map_err(|e| GuildXpError::Internal(format!("no next occurrence: {e}")))
}

/// Post a `cadence` quest at every occurrence of `expr` until `shutdown` fires.
///
/// A failed post is logged and the schedule carries on.
pub async fn run_quest_schedule(
    channel: Arc<DiscordChannel>,
    cadence: QuestCadence,
    expr: String,
    shutdown: CancellationToken,
) -> Result<(), GuildXpError> {
    let cron = parse_cron(&expr)?;
    info!(%cadence, cron = %expr, "quest schedule started");
    loop {
        let now = Local::now();
        let next = next_fire(&cron, &now)?;
        let wait = (next - now).to_std().unwrap_or_default();
        debug!(%cadence, next = %next, "next quest announcement");

        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!(%cadence, "quest schedule stopped");
                return Ok(());
            }
            _ = tokio::time::sleep(wait) => {}
        }

        if let Err(e) = channel.post_quest(cadence).await {
            warn!(%cadence, error = %e, "quest announcement failed");
        }
    }
}
