// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for guildxp.
//!
//! - [`MemoryWorkbook`] - in-memory [`SheetStore`](guildxp_core::SheetStore)
//!   that records every write and can be told to fail
//! - [`FixedClock`] - settable [`Clock`](guildxp_core::Clock)

pub mod clock;
pub mod memory_workbook;

pub use clock::FixedClock;
pub use memory_workbook::{MemoryWorkbook, WriteOp};

/// Build a grid of owned strings from string slices.
pub fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect()
}
