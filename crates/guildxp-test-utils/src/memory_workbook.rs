// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory worksheet store for deterministic ledger tests.
//!
//! `MemoryWorkbook` keeps every workbook as an ordered list of worksheets,
//! logs each write call as a [`WriteOp`], and can be told to fail writes to
//! a given worksheet so tests can observe partial-failure behaviour.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use guildxp_core::traits::adapter::PluginAdapter;
use guildxp_core::traits::sheet::SheetStore;
use guildxp_core::types::{AdapterType, CellUpdate, HealthStatus, SheetRef};
use guildxp_core::GuildXpError;

/// One write call as seen by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Append {
        worksheet: String,
        rows: Vec<Vec<String>>,
    },
    Batch {
        worksheet: String,
        updates: Vec<CellUpdate>,
    },
}

impl WriteOp {
    /// Title of the worksheet written.
    pub fn worksheet(&self) -> &str {
        match self {
            WriteOp::Append { worksheet, .. } | WriteOp::Batch { worksheet, .. } => worksheet,
        }
    }
}

type Worksheets = Vec<(String, Vec<Vec<String>>)>;

/// An in-memory [`SheetStore`].
pub struct MemoryWorkbook {
    books: Mutex<HashMap<String, Worksheets>>,
    writes: Mutex<Vec<WriteOp>>,
    /// `reads` at the moment each logged write landed.
    write_marks: Mutex<Vec<usize>>,
    failing: Mutex<HashSet<String>>,
    reads: AtomicUsize,
}

impl MemoryWorkbook {
    /// Create a store with no workbooks.
    pub fn new() -> Self {
        Self {
            books: Mutex::new(HashMap::new()),
            writes: Mutex::new(Vec::new()),
            write_marks: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            reads: AtomicUsize::new(0),
        }
    }

    /// Builder form of [`MemoryWorkbook::add_worksheet`].
    pub fn with_worksheet(mut self, workbook: &str, title: &str, grid: Vec<Vec<String>>) -> Self {
        self.books
            .get_mut()
            .entry(workbook.to_string())
            .or_default()
            .push((title.to_string(), grid));
        self
    }

    /// Add (or replace) a worksheet. New worksheets go last in the workbook.
    pub async fn add_worksheet(&self, workbook: &str, title: &str, grid: Vec<Vec<String>>) {
        let mut books = self.books.lock().await;
        let sheets = books.entry(workbook.to_string()).or_default();
        match sheets.iter_mut().find(|(t, _)| t == title) {
            Some((_, existing)) => *existing = grid,
            None => sheets.push((title.to_string(), grid)),
        }
    }

    /// Current contents of a worksheet, or empty if it does not exist.
    pub async fn grid(&self, workbook: &str, title: &str) -> Vec<Vec<String>> {
        self.books
            .lock()
            .await
            .get(workbook)
            .and_then(|sheets| sheets.iter().find(|(t, _)| t == title))
            .map(|(_, g)| g.clone())
            .unwrap_or_default()
    }

    /// Every write call so far, in order.
    pub async fn writes(&self) -> Vec<WriteOp> {
        self.writes.lock().await.clone()
    }

    /// Number of write calls so far.
    pub async fn write_count(&self) -> usize {
        self.writes.lock().await.len()
    }

    /// Forget recorded writes (contents are kept).
    pub async fn clear_writes(&self) {
        self.writes.lock().await.clear();
        self.write_marks.lock().await.clear();
    }

    /// Number of `read_grid` calls so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// For each entry of [`MemoryWorkbook::writes`], the read count when it
    /// was made. Equal neighbours mean no read happened between two writes.
    pub async fn reads_before_writes(&self) -> Vec<usize> {
        self.write_marks.lock().await.clone()
    }

    async fn log_write(&self, op: WriteOp) {
        self.write_marks.lock().await.push(self.read_count());
        self.writes.lock().await.push(op);
    }

    /// Make every later write to `title` fail with `StorageUnavailable`.
    pub async fn fail_writes_to(&self, title: &str) {
        self.failing.lock().await.insert(title.to_string());
    }

    /// Let writes to `title` succeed again.
    pub async fn heal(&self, title: &str) {
        self.failing.lock().await.remove(title);
    }

    async fn check_writable(&self, sheet: &SheetRef) -> Result<(), GuildXpError> {
        if self.failing.lock().await.contains(&sheet.worksheet) {
            return Err(GuildXpError::storage(format!(
                "injected write failure on {sheet}"
            )));
        }
        Ok(())
    }
}

impl Default for MemoryWorkbook {
    fn default() -> Self {
        Self::new()
    }
}

fn last_populated(grid: &[Vec<String>]) -> usize {
    grid.iter()
        .rposition(|row| row.iter().any(|c| !c.is_empty()))
        .map(|i| i + 1)
        .unwrap_or(0)
}

#[async_trait]
impl PluginAdapter for MemoryWorkbook {
    fn name(&self) -> &str {
        "memory-workbook"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, GuildXpError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), GuildXpError> {
        Ok(())
    }
}

#[async_trait]
impl SheetStore for MemoryWorkbook {
    async fn worksheet(&self, workbook: &str, title: &str) -> Result<SheetRef, GuildXpError> {
        let books = self.books.lock().await;
        let sheets = books
            .get(workbook)
            .ok_or_else(|| GuildXpError::not_found(format!("workbook {workbook}")))?;
        if sheets.iter().any(|(t, _)| t == title) {
            Ok(SheetRef::new(workbook, title))
        } else {
            Err(GuildXpError::not_found(format!("worksheet {workbook}/{title}")))
        }
    }

    async fn first_worksheet(&self, workbook: &str) -> Result<SheetRef, GuildXpError> {
        self.books
            .lock()
            .await
            .get(workbook)
            .and_then(|sheets| sheets.first())
            .map(|(title, _)| SheetRef::new(workbook, title.as_str()))
            .ok_or_else(|| GuildXpError::not_found(format!("workbook {workbook}")))
    }

    async fn read_grid(&self, sheet: &SheetRef) -> Result<Vec<Vec<String>>, GuildXpError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let books = self.books.lock().await;
        let grid = books
            .get(&sheet.workbook)
            .and_then(|sheets| sheets.iter().find(|(t, _)| *t == sheet.worksheet))
            .map(|(_, g)| g)
            .ok_or_else(|| GuildXpError::not_found(format!("worksheet {sheet}")))?;
        Ok(grid[..last_populated(grid)].to_vec())
    }

    async fn append_rows(
        &self,
        sheet: &SheetRef,
        rows: Vec<Vec<String>>,
    ) -> Result<(), GuildXpError> {
        self.check_writable(sheet).await?;
        {
            let mut books = self.books.lock().await;
            let grid = books
                .get_mut(&sheet.workbook)
                .and_then(|sheets| sheets.iter_mut().find(|(t, _)| *t == sheet.worksheet))
                .map(|(_, g)| g)
                .ok_or_else(|| GuildXpError::not_found(format!("worksheet {sheet}")))?;
            let end = last_populated(grid);
            grid.truncate(end);
            grid.extend(rows.iter().cloned());
        }
        self.log_write(WriteOp::Append {
            worksheet: sheet.worksheet.clone(),
            rows,
        })
        .await;
        Ok(())
    }

    async fn batch_update(
        &self,
        sheet: &SheetRef,
        updates: Vec<CellUpdate>,
    ) -> Result<(), GuildXpError> {
        self.check_writable(sheet).await?;
        {
            let mut books = self.books.lock().await;
            let grid = books
                .get_mut(&sheet.workbook)
                .and_then(|sheets| sheets.iter_mut().find(|(t, _)| *t == sheet.worksheet))
                .map(|(_, g)| g)
                .ok_or_else(|| GuildXpError::not_found(format!("worksheet {sheet}")))?;
            for update in &updates {
                if update.row == 0 || update.column == 0 {
                    return Err(GuildXpError::Validation(format!(
                        "cell address ({}, {}) is not 1-based",
                        update.row, update.column
                    )));
                }
                if grid.len() < update.row {
                    grid.resize(update.row, Vec::new());
                }
                let row = &mut grid[update.row - 1];
                let end = update.column - 1 + update.values.len();
                if row.len() < end {
                    row.resize(end, String::new());
                }
                for (offset, value) in update.values.iter().enumerate() {
                    row[update.column - 1 + offset] = value.clone();
                }
            }
        }
        self.log_write(WriteOp::Batch {
            worksheet: sheet.worksheet.clone(),
            updates,
        })
        .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid;

    #[tokio::test]
    async fn append_goes_after_last_populated_row() {
        let store = MemoryWorkbook::new().with_worksheet(
            "book",
            "Log",
            grid(&[&["EventID"], &["a"], &[""], &[]]),
        );
        let sheet = store.worksheet("book", "Log").await.unwrap();
        store.append_row(&sheet, vec!["b".into()]).await.unwrap();
        assert_eq!(store.grid("book", "Log").await, grid(&[&["EventID"], &["a"], &["b"]]));
        assert_eq!(store.write_count().await, 1);
    }

    #[tokio::test]
    async fn batch_update_pads_rows() {
        let store = MemoryWorkbook::new().with_worksheet("book", "Roster", grid(&[&["A", "B"]]));
        let sheet = SheetRef::new("book", "Roster");
        store
            .batch_update(&sheet, vec![CellUpdate::new(3, 2, vec!["x".into(), "y".into()])])
            .await
            .unwrap();
        let g = store.grid("book", "Roster").await;
        assert_eq!(g[2], vec!["", "x", "y"]);
        assert!(g[1].is_empty());
    }

    #[tokio::test]
    async fn injected_failures_block_writes_only() {
        let store = MemoryWorkbook::new().with_worksheet("book", "Log", grid(&[&["id"]]));
        let sheet = SheetRef::new("book", "Log");
        store.fail_writes_to("Log").await;

        let err = store.append_row(&sheet, vec!["a".into()]).await.unwrap_err();
        assert!(matches!(err, GuildXpError::StorageUnavailable { .. }));
        assert_eq!(store.read_grid(&sheet).await.unwrap().len(), 1);
        assert_eq!(store.write_count().await, 0);

        store.heal("Log").await;
        store.append_row(&sheet, vec!["a".into()]).await.unwrap();
        assert_eq!(store.write_count().await, 1);
    }

    #[tokio::test]
    async fn writes_remember_the_read_count() {
        let store = MemoryWorkbook::new().with_worksheet("book", "Log", grid(&[&["id"]]));
        let sheet = SheetRef::new("book", "Log");
        store.append_row(&sheet, vec!["a".into()]).await.unwrap();
        store.read_grid(&sheet).await.unwrap();
        store.append_row(&sheet, vec!["b".into()]).await.unwrap();
        store.append_row(&sheet, vec!["c".into()]).await.unwrap();
        assert_eq!(store.reads_before_writes().await, vec![0, 1, 1]);

        store.clear_writes().await;
        assert!(store.reads_before_writes().await.is_empty());
    }

    #[tokio::test]
    async fn first_worksheet_and_missing_lookups() {
        let store = MemoryWorkbook::new()
            .with_worksheet("event", "Form Responses 1", grid(&[&["Email"]]))
            .with_worksheet("event", "Summary", Vec::new());
        assert_eq!(
            store.first_worksheet("event").await.unwrap().worksheet,
            "Form Responses 1"
        );
        assert!(matches!(
            store.worksheet("event", "Nope").await,
            Err(GuildXpError::NotFound { .. })
        ));
        assert!(store.first_worksheet("other").await.is_err());
    }
}
