// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`SheetStore`] over a local SQLite workbook mirror.
//!
//! Each worksheet is a set of non-empty cells keyed by (row, column). Reads
//! rebuild the row-major grid, appends go after the last populated row, and
//! every write call runs in one transaction.

use async_trait::async_trait;
use guildxp_core::{
    AdapterType, CellUpdate, GuildXpError, HealthStatus, PluginAdapter, SheetRef, SheetStore,
};
use rusqlite::{OptionalExtension, Transaction, params};
use tracing::{debug, info};

use crate::database::{Database, map_tr_err};

pub struct SqliteWorkbook {
    db: Database,
}

impl SqliteWorkbook {
    pub async fn open(path: &str) -> Result<Self, GuildXpError> {
        let db = Database::open(path).await?;
        info!(path, "sqlite workbook opened");
        Ok(Self { db })
    }

    pub async fn open_in_memory() -> Result<Self, GuildXpError> {
        Ok(Self {
            db: Database::open_in_memory().await?,
        })
    }

    /// Create `title` as the last worksheet of `workbook` if it is missing,
    /// and write `headers` into row 1 if that row is empty.
    ///
    /// Returns true when anything was written.
    pub async fn ensure_worksheet(
        &self,
        workbook: &str,
        title: &str,
        headers: &[&str],
    ) -> Result<bool, GuildXpError> {
        let workbook = workbook.to_string();
        let title = title.to_string();
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let log_title = title.clone();
        let changed = self
            .db
            .connection()
            .call(move |conn| {
                let tx = conn.transaction()?;
                let created = create_worksheet(&tx, &workbook, &title)?;
                let header_cells: i64 = tx.query_row(
                    "SELECT COUNT(*) FROM cells WHERE workbook = ?1 AND title = ?2 AND row_num = 1",
                    params![workbook, title],
                    |row| row.get(0),
                )?;
                let wrote_headers = header_cells == 0 && !headers.is_empty();
                if wrote_headers {
                    write_run(&tx, &workbook, &title, 1, 1, &headers)?;
                }
                tx.commit()?;
                Ok(created || wrote_headers)
            })
            .await
            .map_err(map_tr_err)?;
        if changed {
            info!(worksheet = %log_title, "worksheet initialized");
        }
        Ok(changed)
    }

    /// Replace the whole contents of a worksheet, creating it if missing.
    pub async fn import_grid(
        &self,
        workbook: &str,
        title: &str,
        grid: Vec<Vec<String>>,
    ) -> Result<(), GuildXpError> {
        let workbook = workbook.to_string();
        let title = title.to_string();
        let rows = grid.len();
        self.db
            .connection()
            .call(move |conn| {
                let tx = conn.transaction()?;
                create_worksheet(&tx, &workbook, &title)?;
                tx.execute(
                    "DELETE FROM cells WHERE workbook = ?1 AND title = ?2",
                    params![workbook, title],
                )?;
                for (i, row) in grid.iter().enumerate() {
                    write_run(&tx, &workbook, &title, i + 1, 1, row)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!(rows, "worksheet imported");
        Ok(())
    }

    async fn require_worksheet(&self, sheet: &SheetRef) -> Result<(), GuildXpError> {
        let workbook = sheet.workbook.clone();
        let title = sheet.worksheet.clone();
        let exists = self
            .db
            .connection()
            .call(move |conn| {
                conn.query_row(
                    "SELECT 1 FROM worksheets WHERE workbook = ?1 AND title = ?2",
                    params![workbook, title],
                    |_| Ok(()),
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)?;
        match exists {
            Some(()) => Ok(()),
            None => Err(GuildXpError::not_found(format!("worksheet {sheet}"))),
        }
    }
}

fn create_worksheet(tx: &Transaction<'_>, workbook: &str, title: &str) -> rusqlite::Result<bool> {
    let inserted = tx.execute(
        "INSERT OR IGNORE INTO worksheets (workbook, title, position)
         SELECT ?1, ?2, COALESCE(MAX(position), -1) + 1 FROM worksheets WHERE workbook = ?1",
        params![workbook, title],
    )?;
    Ok(inserted > 0)
}

/// Write one horizontal run starting at (`row`, `column`), both 1-based.
/// Empty values clear the cell.
fn write_run(
    tx: &Transaction<'_>,
    workbook: &str,
    title: &str,
    row: usize,
    column: usize,
    values: &[String],
) -> rusqlite::Result<()> {
    for (offset, value) in values.iter().enumerate() {
        let col = (column + offset) as i64;
        if value.is_empty() {
            tx.execute(
                "DELETE FROM cells WHERE workbook = ?1 AND title = ?2 AND row_num = ?3 AND col_num = ?4",
                params![workbook, title, row as i64, col],
            )?;
        } else {
            tx.execute(
                "INSERT INTO cells (workbook, title, row_num, col_num, value)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (workbook, title, row_num, col_num) DO UPDATE SET value = excluded.value",
                params![workbook, title, row as i64, col, value],
            )?;
        }
    }
    Ok(())
}

#[async_trait]
impl PluginAdapter for SqliteWorkbook {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, GuildXpError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), GuildXpError> {
        self.db.checkpoint().await?;
        debug!("shutdown: WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl SheetStore for SqliteWorkbook {
    async fn worksheet(&self, workbook: &str, title: &str) -> Result<SheetRef, GuildXpError> {
        let sheet = SheetRef::new(workbook, title);
        self.require_worksheet(&sheet).await?;
        Ok(sheet)
    }

    async fn first_worksheet(&self, workbook: &str) -> Result<SheetRef, GuildXpError> {
        let book = workbook.to_string();
        let title = self
            .db
            .connection()
            .call(move |conn| {
                conn.query_row(
                    "SELECT title FROM worksheets WHERE workbook = ?1 ORDER BY position LIMIT 1",
                    params![book],
                    |row| row.get::<_, String>(0),
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)?;
        title
            .map(|t| SheetRef::new(workbook, t))
            .ok_or_else(|| GuildXpError::not_found(format!("workbook {workbook}")))
    }

    async fn read_grid(&self, sheet: &SheetRef) -> Result<Vec<Vec<String>>, GuildXpError> {
        self.require_worksheet(sheet).await?;
        let workbook = sheet.workbook.clone();
        let title = sheet.worksheet.clone();
        let cells = self
            .db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT row_num, col_num, value FROM cells
                     WHERE workbook = ?1 AND title = ?2
                     ORDER BY row_num, col_num",
                )?;
                let rows = stmt.query_map(params![workbook, title], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })?;
                rows.collect::<Result<Vec<_>, _>>()
            })
            .await
            .map_err(map_tr_err)?;

        let mut grid: Vec<Vec<String>> = Vec::new();
        for (row, col, value) in cells {
            let (r, c) = (row.max(1) as usize - 1, col.max(1) as usize - 1);
            if grid.len() <= r {
                grid.resize_with(r + 1, Vec::new);
            }
            let cells = &mut grid[r];
            if cells.len() <= c {
                cells.resize(c + 1, String::new());
            }
            cells[c] = value;
        }
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
        self.require_worksheet(sheet).await?;
        let workbook = sheet.workbook.clone();
        let title = sheet.worksheet.clone();
        let count = rows.len();
        self.db
            .connection()
            .call(move |conn| {
                let tx = conn.transaction()?;
                let last: i64 = tx.query_row(
                    "SELECT COALESCE(MAX(row_num), 0) FROM cells WHERE workbook = ?1 AND title = ?2",
                    params![workbook, title],
                    |row| row.get(0),
                )?;
                for (i, row) in rows.iter().enumerate() {
                    write_run(&tx, &workbook, &title, last as usize + i + 1, 1, row)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!(sheet = %sheet, rows = count, "rows appended");
        Ok(())
    }

    async fn batch_update(
        &self,
        sheet: &SheetRef,
        updates: Vec<CellUpdate>,
    ) -> Result<(), GuildXpError> {
        if updates.is_empty() {
            return Ok(());
        }
        self.require_worksheet(sheet).await?;
        let workbook = sheet.workbook.clone();
        let title = sheet.worksheet.clone();
        let runs = updates.len();
        self.db
            .connection()
            .call(move |conn| {
                let tx = conn.transaction()?;
                for update in &updates {
                    write_run(&tx, &workbook, &title, update.row, update.column, &update.values)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!(sheet = %sheet, runs, "cells updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn missing_worksheet_is_not_found() {
        let store = SqliteWorkbook::open_in_memory().await.unwrap();
        assert!(matches!(
            store.worksheet("master", "Master_Roster").await,
            Err(GuildXpError::NotFound { .. })
        ));
        assert!(matches!(
            store.first_worksheet("evt").await,
            Err(GuildXpError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn ensure_worksheet_is_idempotent() {
        let store = SqliteWorkbook::open_in_memory().await.unwrap();
        assert!(
            store
                .ensure_worksheet("master", "Attendance_Logs", &["EventID", "Timestamp", "XP_Amount"])
                .await
                .unwrap()
        );
        assert!(
            !store
                .ensure_worksheet("master", "Attendance_Logs", &["Other"])
                .await
                .unwrap()
        );
        let sheet = store.worksheet("master", "Attendance_Logs").await.unwrap();
        assert_eq!(
            store.header_row(&sheet).await.unwrap(),
            vec!["EventID", "Timestamp", "XP_Amount"]
        );
    }

    #[tokio::test]
    async fn worksheets_keep_tab_order() {
        let store = SqliteWorkbook::open_in_memory().await.unwrap();
        store
            .import_grid("evt", "Form Responses 1", vec![row(&["Email"])])
            .await
            .unwrap();
        store.ensure_worksheet("evt", "Summary", &[]).await.unwrap();
        assert_eq!(
            store.first_worksheet("evt").await.unwrap().worksheet,
            "Form Responses 1"
        );
    }

    #[tokio::test]
    async fn append_goes_after_last_populated_row() {
        let store = SqliteWorkbook::open_in_memory().await.unwrap();
        store
            .import_grid(
                "m",
                "Log",
                vec![row(&["Message_ID", "Reason"]), row(&["a", "x"])],
            )
            .await
            .unwrap();
        let sheet = SheetRef::new("m", "Log");
        store
            .append_rows(&sheet, vec![row(&["b", ""]), row(&["c", "z"])])
            .await
            .unwrap();
        assert_eq!(
            store.read_grid(&sheet).await.unwrap(),
            vec![
                row(&["Message_ID", "Reason"]),
                row(&["a", "x"]),
                row(&["b"]),
                row(&["c", "z"]),
            ]
        );
    }

    #[tokio::test]
    async fn batch_update_overwrites_and_clears() {
        let store = SqliteWorkbook::open_in_memory().await.unwrap();
        store
            .import_grid(
                "m",
                "R",
                vec![row(&["Name", "Total_XP", "Rank"]), row(&["Ann", "40", "Newcomer"])],
            )
            .await
            .unwrap();
        let sheet = SheetRef::new("m", "R");
        store
            .batch_update(
                &sheet,
                vec![
                    CellUpdate::new(2, 2, vec!["140".into(), "Rank 1".into()]),
                    CellUpdate::new(2, 1, vec![String::new()]),
                    CellUpdate::new(4, 1, vec!["far".into()]),
                ],
            )
            .await
            .unwrap();
        let grid = store.read_grid(&sheet).await.unwrap();
        assert_eq!(grid[1], row(&["", "140", "Rank 1"]));
        assert!(grid[2].is_empty());
        assert_eq!(grid[3], row(&["far"]));
    }
}
