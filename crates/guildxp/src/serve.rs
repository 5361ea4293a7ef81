// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `guildxp serve` command implementation.
//!
//! Opens the configured store, connects the Discord adapter, and runs the
//! quest schedules until SIGINT/SIGTERM or the gateway stops.

use std::sync::Arc;

use guildxp_config::GuildXpConfig;
use guildxp_core::{GuildXpError, PluginAdapter};
use guildxp_discord::DiscordChannel;
use guildxp_ledger::QuestCadence;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{backend, schedule};

/// Cancels the returned token on SIGINT or SIGTERM.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => info!("received SIGINT (Ctrl+C), initiating shutdown"),
                        _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "SIGTERM handler unavailable, waiting for Ctrl+C only");
                    let _ = ctrl_c.await;
                    info!("received Ctrl+C, initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

pub async fn run_serve(config: GuildXpConfig) -> Result<(), GuildXpError> {
    info!(name = %config.bot.name, backend = ?config.storage.backend, "starting guildxp serve");

    let (store, ledger) = backend::open_ledger(&config).await?;
    let channel = Arc::new(DiscordChannel::new(
        config.discord.clone(),
        ledger,
        &config.bot.name,
    )?);
    let shutdown = install_signal_handler();

    let mut schedules = Vec::new();
    for (cadence, expr) in [
        (QuestCadence::Daily, &config.quests.daily_cron),
        (QuestCadence::Weekly, &config.quests.weekly_cron),
    ] {
        let Some(expr) = expr.as_deref().map(str::trim).filter(|e| !e.is_empty()) else {
            debug!(%cadence, "quest schedule disabled");
            continue;
        };
        schedules.push(tokio::spawn(schedule::run_quest_schedule(
            channel.clone(),
            cadence,
            expr.to_string(),
            shutdown.clone(),
        )));
    }

    let mut gateway = {
        let channel = channel.clone();
        tokio::spawn(async move { channel.run().await })
    };

    let outcome = tokio::select! {
        _ = shutdown.cancelled() => Ok(()),
        joined = &mut gateway => match joined {
            Ok(result) => result,
            Err(e) => Err(GuildXpError::Internal(format!("gateway task failed: {e}"))),
        },
    };
    if let Err(e) = &outcome {
        error!(error = %e, "gateway stopped");
    }

    shutdown.cancel();
    channel.shutdown().await?;
    for handle in schedules {
        match handle.await {
            Ok(Err(e)) => warn!(error = %e, "quest schedule ended with an error"),
            Err(e) => warn!(error = %e, "quest schedule task failed"),
            Ok(Ok(())) => {}
        }
    }
    if !gateway.is_finished() {
        gateway.abort();
    }
    store.shutdown().await?;
    info!("guildxp stopped");
    outcome
}
