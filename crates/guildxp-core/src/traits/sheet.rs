// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Worksheet store trait: the minimal table API the ledger needs.

use async_trait::async_trait;

use crate::error::GuildXpError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CellUpdate, SheetRef, SheetTable};

/// Adapter for row-oriented worksheet stores (Google Sheets, SQLite mirror).
///
/// Backends implement the grid primitives; the named-record helpers have
/// default implementations built on [`SheetStore::read_grid`]. Backend
/// failures surface as [`GuildXpError::StorageUnavailable`] and are never
/// retried here.
#[async_trait]
pub trait SheetStore: PluginAdapter {
    /// Resolve a worksheet by title inside a workbook.
    ///
    /// Returns [`GuildXpError::NotFound`] when either does not exist.
    async fn worksheet(&self, workbook: &str, title: &str) -> Result<SheetRef, GuildXpError>;

    /// Resolve the first worksheet of a workbook.
    async fn first_worksheet(&self, workbook: &str) -> Result<SheetRef, GuildXpError>;

    /// Read every populated row as raw strings, header row first.
    async fn read_grid(&self, sheet: &SheetRef) -> Result<Vec<Vec<String>>, GuildXpError>;

    /// Append rows after the last populated row, in one round trip.
    async fn append_rows(
        &self,
        sheet: &SheetRef,
        rows: Vec<Vec<String>>,
    ) -> Result<(), GuildXpError>;

    /// Apply several cell runs in one round trip.
    async fn batch_update(
        &self,
        sheet: &SheetRef,
        updates: Vec<CellUpdate>,
    ) -> Result<(), GuildXpError>;

    /// Read the header row.
    async fn header_row(&self, sheet: &SheetRef) -> Result<Vec<String>, GuildXpError> {
        Ok(SheetTable::from_grid(self.read_grid(sheet).await?).headers)
    }

    /// Read all data rows as named records.
    ///
    /// When `expected_headers` is given, every listed header must be present
    /// or a [`GuildXpError::Validation`] is returned.
    async fn records(
        &self,
        sheet: &SheetRef,
        expected_headers: Option<&[&str]>,
    ) -> Result<SheetTable, GuildXpError> {
        let table = SheetTable::from_grid(self.read_grid(sheet).await?);
        if let Some(expected) = expected_headers {
            let missing = table.missing_headers(expected);
            if !missing.is_empty() {
                return Err(GuildXpError::Validation(format!(
                    "worksheet {sheet} is missing expected headers: {}",
                    missing.join(", ")
                )));
            }
        }
        Ok(table)
    }

    /// Read one cell (1-based), `""` when blank or out of range.
    async fn cell(
        &self,
        sheet: &SheetRef,
        row: usize,
        column: usize,
    ) -> Result<String, GuildXpError> {
        let grid = self.read_grid(sheet).await?;
        Ok(grid
            .get(row.saturating_sub(1))
            .and_then(|r| r.get(column.saturating_sub(1)))
            .cloned()
            .unwrap_or_default())
    }

    /// Write one cell (1-based).
    async fn update_cell(
        &self,
        sheet: &SheetRef,
        row: usize,
        column: usize,
        value: &str,
    ) -> Result<(), GuildXpError> {
        self.batch_update(sheet, vec![CellUpdate::new(row, column, vec![value.to_string()])])
            .await
    }

    /// Append a single row.
    async fn append_row(&self, sheet: &SheetRef, row: Vec<String>) -> Result<(), GuildXpError> {
        self.append_rows(sheet, vec![row]).await
    }

    /// Read a whole column (1-based), header included.
    async fn column_values(
        &self,
        sheet: &SheetRef,
        column: usize,
    ) -> Result<Vec<String>, GuildXpError> {
        let grid = self.read_grid(sheet).await?;
        Ok(grid
            .into_iter()
            .map(|mut r| {
                if column >= 1 && column <= r.len() {
                    r.swap_remove(column - 1)
                } else {
                    String::new()
                }
            })
            .collect())
    }
}
