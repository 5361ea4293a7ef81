// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Table-shaped types exchanged with [`SheetStore`](crate::SheetStore) backends.
//!
//! Rows and columns are 1-based, matching spreadsheet addressing. Row 1 is
//! always the header row.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Store,
    Channel,
}

/// A resolved worksheet inside a workbook.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SheetRef {
    /// Workbook key (spreadsheet id or local workbook name).
    pub workbook: String,
    /// Worksheet title.
    pub worksheet: String,
}

impl SheetRef {
    pub fn new(workbook: impl Into<String>, worksheet: impl Into<String>) -> Self {
        Self {
            workbook: workbook.into(),
            worksheet: worksheet.into(),
        }
    }
}

impl std::fmt::Display for SheetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.workbook, self.worksheet)
    }
}

/// One data row of a worksheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRecord {
    /// 1-based sheet row number (the first data row is 2).
    pub row: usize,
    /// Cell values, aligned with [`SheetTable::headers`]. May be shorter
    /// than the header row when trailing cells are blank.
    pub cells: Vec<String>,
}

impl SheetRecord {
    /// Cell at a 0-based column index, or `""` when absent.
    pub fn get(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }

    fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }
}

/// All rows of a worksheet as named records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetTable {
    /// Trimmed header names from row 1.
    pub headers: Vec<String>,
    /// Non-blank data rows in sheet order.
    pub records: Vec<SheetRecord>,
}

impl SheetTable {
    /// Build a table from raw grid values (row 1 = headers).
    ///
    /// Fully blank data rows are dropped; row numbers of the remaining
    /// records still reflect their position in the sheet.
    pub fn from_grid(grid: Vec<Vec<String>>) -> Self {
        let mut rows = grid.into_iter();
        let headers = rows
            .next()
            .map(|h| h.into_iter().map(|c| c.trim().to_string()).collect())
            .unwrap_or_default();
        let records = rows
            .enumerate()
            .map(|(i, cells)| SheetRecord { row: i + 2, cells })
            .filter(|r| !r.is_blank())
            .collect();
        Self { headers, records }
    }

    /// 0-based index of a header, compared exactly after trimming.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name.trim())
    }

    /// Headers from `expected` that this table lacks.
    pub fn missing_headers<'a>(&self, expected: &[&'a str]) -> Vec<&'a str> {
        expected
            .iter()
            .copied()
            .filter(|name| self.column(name).is_none())
            .collect()
    }

    /// Value of the named column in `record`, or `None` if the column is unknown.
    pub fn value<'a>(&self, record: &'a SheetRecord, name: &str) -> Option<&'a str> {
        self.column(name).map(|i| record.get(i))
    }
}

/// A horizontal run of cells starting at (`row`, `column`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    /// 1-based row.
    pub row: usize,
    /// 1-based column of the first value.
    pub column: usize,
    /// New values written left to right.
    pub values: Vec<String>,
}

impl CellUpdate {
    pub fn new(row: usize, column: usize, values: Vec<String>) -> Self {
        Self {
            row,
            column,
            values,
        }
    }
}

/// Convert a 1-based column number to spreadsheet letters (1 -> A, 27 -> AA).
pub fn column_letters(mut column: usize) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push(b'A' + rem as u8);
        column = (column - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
