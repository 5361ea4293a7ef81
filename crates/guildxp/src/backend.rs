// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store selection and ledger construction shared by every subcommand.

use std::sync::Arc;

use guildxp_config::GuildXpConfig;
use guildxp_config::model::{SheetsConfig, StoreBackend};
use guildxp_core::{GuildXpError, HealthStatus, SheetStore, SystemClock};
use guildxp_ledger::LedgerService;
use guildxp_ledger::quests::QUEST_HEADERS;
use guildxp_ledger::records::{APPROVAL_HEADERS, EVENT_HEADERS, PUZZLE_HEADERS, ROSTER_HEADERS};
use guildxp_sheets::GoogleSheetsStore;
use guildxp_storage::SqliteWorkbook;
use tracing::{info, warn};

const BOARD_HEADERS: [&str; 2] = ["Name", "Email"];

/// Worksheets of the master workbook with the header row each starts with.
pub fn master_layout(sheets: &SheetsConfig) -> Vec<(&str, &'static [&'static str])> {
    vec![
        (sheets.roster_sheet.as_str(), &ROSTER_HEADERS[..]),
        (sheets.events_sheet.as_str(), &EVENT_HEADERS[..]),
        (sheets.approvals_sheet.as_str(), &APPROVAL_HEADERS[..]),
        (sheets.puzzle_sheet.as_str(), &PUZZLE_HEADERS[..]),
        (sheets.board_sheet.as_str(), &BOARD_HEADERS[..]),
        (sheets.quests_sheet.as_str(), &QUEST_HEADERS[..]),
    ]
}

/// Open the local mirror and make sure the master workbook has every worksheet.
pub async fn open_sqlite(config: &GuildXpConfig) -> Result<SqliteWorkbook, GuildXpError> {
    let workbook = SqliteWorkbook::open(&config.storage.database_path).await?;
    let book = &config.sheets.spreadsheet_id;
    for (title, headers) in master_layout(&config.sheets) {
        workbook.ensure_worksheet(book, title, headers).await?;
    }
    Ok(workbook)
}

/// The configured worksheet store, health-checked.
pub async fn open_store(config: &GuildXpConfig) -> Result<Arc<dyn SheetStore>, GuildXpError> {
    let store: Arc<dyn SheetStore> = match config.storage.backend {
        StoreBackend::Sheets => Arc::new(GoogleSheetsStore::from_config(&config.sheets)?),
        StoreBackend::Sqlite => Arc::new(open_sqlite(config).await?),
    };
    match store.health_check().await? {
        HealthStatus::Healthy => info!(backend = store.name(), "store ready"),
        HealthStatus::Degraded(reason) => warn!(backend = store.name(), %reason, "store degraded"),
        HealthStatus::Unhealthy(reason) => {
            return Err(GuildXpError::storage(format!(
                "{} store is unhealthy: {reason}",
                store.name()
            )));
        }
    }
    Ok(store)
}

/// A ledger over the configured store and the system clock.
pub async fn open_ledger(
    config: &GuildXpConfig,
) -> Result<(Arc<dyn SheetStore>, Arc<LedgerService>), GuildXpError> {
    let store = open_store(config).await?;
    let ledger = LedgerService::open(store.clone(), Arc::new(SystemClock), config).await?;
    Ok((store, Arc::new(ledger)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use guildxp_core::SheetRef;

    fn sqlite_config(dir: &tempfile::TempDir) -> GuildXpConfig {
        let mut config = GuildXpConfig::default();
        config.storage.backend = StoreBackend::Sqlite;
        config.storage.database_path = dir
            .path()
            .join("nested")
            .join("guildxp.db")
            .display()
            .to_string();
        config
    }

    #[tokio::test]
    async fn sqlite_backend_is_ready_for_the_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let config = sqlite_config(&dir);

        let (store, ledger) = open_ledger(&config).await.unwrap();
        let roster = SheetRef::new(&config.sheets.spreadsheet_id, &config.sheets.roster_sheet);
        assert_eq!(store.header_row(&roster).await.unwrap(), ROSTER_HEADERS);
        assert!(ledger.balance("111").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reopening_keeps_existing_headers() {
        let dir = tempfile::tempdir().unwrap();
        let config = sqlite_config(&dir);
        let first = open_sqlite(&config).await.unwrap();
        drop(first);

        let again = open_sqlite(&config).await.unwrap();
        let book = &config.sheets.spreadsheet_id;
        assert!(
            !again
                .ensure_worksheet(book, &config.sheets.quests_sheet, &QUEST_HEADERS)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn sheets_backend_without_token_is_a_config_error() {
        let mut config = GuildXpConfig::default();
        config.storage.backend = StoreBackend::Sheets;
        assert!(matches!(
            open_store(&config).await,
            Err(GuildXpError::Config(_))
        ));
    }
}
