// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`SheetStore`] over the Sheets REST API.

use async_trait::async_trait;
use guildxp_config::model::SheetsConfig;
use guildxp_core::types::column_letters;
use guildxp_core::{
    AdapterType, CellUpdate, GuildXpError, HealthStatus, PluginAdapter, SheetRef, SheetStore,
};
use tracing::{debug, info};

use crate::client::SheetsClient;
use crate::types::ValueRange;

/// Quote a worksheet title for use in an A1 range.
pub fn quote_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// A1 range covering one cell run.
pub fn update_range(title: &str, update: &CellUpdate) -> String {
    let last = update.column + update.values.len().saturating_sub(1);
    format!(
        "{}!{}{row}:{}{row}",
        quote_title(title),
        column_letters(update.column),
        column_letters(last),
        row = update.row
    )
}

/// The production worksheet store.
pub struct GoogleSheetsStore {
    client: SheetsClient,
    spreadsheet_id: String,
}

impl GoogleSheetsStore {
    /// `spreadsheet_id` is only used for health checks.
    pub fn new(client: SheetsClient, spreadsheet_id: &str) -> Self {
        Self {
            client,
            spreadsheet_id: spreadsheet_id.to_string(),
        }
    }

    pub fn from_config(config: &SheetsConfig) -> Result<Self, GuildXpError> {
        let token = config
            .access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                GuildXpError::Config("sheets.access_token is required for the sheets backend".into())
            })?;
        let client = SheetsClient::new(token, &config.base_url)?;
        info!(base_url = client.base_url(), "sheets store configured");
        Ok(Self::new(client, &config.spreadsheet_id))
    }
}

#[async_trait]
impl PluginAdapter for GoogleSheetsStore {
    fn name(&self) -> &str {
        "google-sheets"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, GuildXpError> {
        match self.client.spreadsheet(&self.spreadsheet_id).await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), GuildXpError> {
        debug!("sheets store shutting down");
        Ok(())
    }
}

#[async_trait]
impl SheetStore for GoogleSheetsStore {
    async fn worksheet(&self, workbook: &str, title: &str) -> Result<SheetRef, GuildXpError> {
        let spreadsheet = self.client.spreadsheet(workbook).await?;
        spreadsheet
            .sheets
            .iter()
            .find(|s| s.properties.title == title)
            .map(|s| SheetRef::new(workbook, s.properties.title.as_str()))
            .ok_or_else(|| GuildXpError::not_found(format!("worksheet {workbook}/{title}")))
    }

    async fn first_worksheet(&self, workbook: &str) -> Result<SheetRef, GuildXpError> {
        let spreadsheet = self.client.spreadsheet(workbook).await?;
        spreadsheet
            .sheets
            .iter()
            .min_by_key(|s| s.properties.index)
            .map(|s| SheetRef::new(workbook, s.properties.title.as_str()))
            .ok_or_else(|| GuildXpError::not_found(format!("worksheets in {workbook}")))
    }

    async fn read_grid(&self, sheet: &SheetRef) -> Result<Vec<Vec<String>>, GuildXpError> {
        let range = self
            .client
            .get_values(&sheet.workbook, &quote_title(&sheet.worksheet))
            .await?;
        let grid = range.into_grid();
        debug!(sheet = %sheet, rows = grid.len(), "worksheet read");
        Ok(grid)
    }

    async fn append_rows(
        &self,
        sheet: &SheetRef,
        rows: Vec<Vec<String>>,
    ) -> Result<(), GuildXpError> {
        if rows.is_empty() {
            return Ok(());
        }
        let count = rows.len();
        let range = format!("{}!A1", quote_title(&sheet.worksheet));
        let response = self
            .client
            .append_values(&sheet.workbook, &range, rows)
            .await?;
        debug!(
            sheet = %sheet,
            rows = count,
            updated_range = response.updates.map(|u| u.updated_range).unwrap_or_default(),
            "rows appended"
        );
        Ok(())
    }

    async fn batch_update(
        &self,
        sheet: &SheetRef,
        updates: Vec<CellUpdate>,
    ) -> Result<(), GuildXpError> {
        let data: Vec<ValueRange> = updates
            .into_iter()
            .filter(|u| !u.values.is_empty())
            .map(|u| {
                let range = update_range(&sheet.worksheet, &u);
                ValueRange::rows(Some(range), vec![u.values])
            })
            .collect();
        if data.is_empty() {
            return Ok(());
        }
        let ranges = data.len();
        let response = self
            .client
            .batch_update_values(&sheet.workbook, data)
            .await?;
        debug!(
            sheet = %sheet,
            ranges,
            cells = response.total_updated_cells,
            "cells updated"
        );
        Ok(())
    }
}
