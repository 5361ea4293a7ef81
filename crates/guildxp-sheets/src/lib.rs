// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Sheets worksheet store for guildxp.
//!
//! The ledger's store of record. Each [`SheetStore`](guildxp_core::SheetStore)
//! call maps to one Sheets v4 request: metadata lookups for worksheet
//! resolution, `values.get` for reads, `values.append` for appends, and
//! `values.batchUpdate` for cell runs.

pub mod client;
pub mod store;
pub mod types;

pub use client::{API_BASE_URL, SheetsClient};
pub use store::GoogleSheetsStore;
