// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite worksheet store for guildxp.
//!
//! A local mirror of the workbook layout, used for development, offline
//! runs, and operator dry runs. It implements the same
//! [`SheetStore`](guildxp_core::SheetStore) contract as the Sheets backend.

pub mod database;
pub mod migrations;
pub mod store;

pub use database::Database;
pub use store::SqliteWorkbook;
