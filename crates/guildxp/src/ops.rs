// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator subcommands that run ledger operations without the gateway.

use std::path::Path;

use guildxp_config::GuildXpConfig;
use guildxp_config::model::StoreBackend;
use guildxp_core::GuildXpError;
use guildxp_ledger::{LedgerService, LeaderboardMode, messages};
use tracing::info;

use crate::backend;

pub async fn process_event(
    ledger: &LedgerService,
    source: &str,
    xp: u64,
) -> Result<String, GuildXpError> {
    ledger.process_event(source, xp).await
}

pub async fn sync_board(ledger: &LedgerService) -> Result<String, GuildXpError> {
    ledger.sync_board_flags().await.map(messages::board_synced)
}

pub async fn leaderboard(
    ledger: &LedgerService,
    community: &str,
    mode: LeaderboardMode,
    top: Option<usize>,
    json: bool,
) -> Result<String, GuildXpError> {
    let board = ledger.get_leaderboard(mode, top).await?;
    if json {
        serde_json::to_string_pretty(&board)
            .map_err(|e| GuildXpError::Internal(format!("failed to encode leaderboard: {e}")))
    } else {
        Ok(guildxp_discord::render::leaderboard(&board, community))
    }
}

pub async fn balance(ledger: &LedgerService, discord_id: &str) -> Result<String, GuildXpError> {
    ledger.get_balance(discord_id).await
}

/// Replace a worksheet of the local mirror with a JSON array of rows.
pub async fn import_grid(
    config: &GuildXpConfig,
    workbook: &str,
    title: &str,
    file: &Path,
) -> Result<String, GuildXpError> {
    if config.storage.backend != StoreBackend::Sqlite {
        return Err(GuildXpError::Config(
            "import-grid only applies to storage.backend = \"sqlite\"".into(),
        ));
    }
    let content = std::fs::read_to_string(file).map_err(|e| {
        GuildXpError::Validation(format!("cannot read {}: {e}", file.display()))
    })?;
    let grid = parse_grid(&content)?;
    let rows = grid.len();
    let store = backend::open_sqlite(config).await?;
    store.import_grid(workbook, title, grid).await?;
    info!(workbook, title, rows, "grid imported");
    Ok(format!("Imported {rows} row(s) into {workbook}/{title}."))
}

/// Rows as a JSON array of arrays; numbers and booleans become their text.
pub fn parse_grid(content: &str) -> Result<Vec<Vec<String>>, GuildXpError> {
    let rows: Vec<Vec<serde_json::Value>> = serde_json::from_str(content)
        .map_err(|e| GuildXpError::Validation(format!("expected a JSON array of rows: {e}")))?;
    Ok(rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| match cell {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect())
}
