// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for guildxp.
//!
//! This crate provides the error type, the worksheet store contract, and the
//! table types shared by the ledger, the store backends, and the chat adapter.

pub mod error;
pub mod traits;
pub mod types;

pub use error::GuildXpError;
pub use types::{AdapterType, CellUpdate, HealthStatus, SheetRecord, SheetRef, SheetTable};

pub use traits::clock::TIMESTAMP_FORMAT;
pub use traits::{Clock, PluginAdapter, SheetStore, SystemClock};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[test]
    fn error_variants_render() {
        let nf = GuildXpError::not_found("member 42");
        assert_eq!(nf.to_string(), "not found: member 42");
        assert!(nf.is_expected());

        let storage = GuildXpError::storage(std::io::Error::other("socket closed"));
        assert!(storage.to_string().contains("socket closed"));
        assert!(!storage.is_expected());

        let dup = GuildXpError::AlreadyProcessed {
            what: "event abc".into(),
        };
        assert!(dup.is_expected());
        assert!(GuildXpError::Validation("bad".into()).is_expected());
        assert!(!GuildXpError::Internal("x".into()).is_expected());
    }

    #[test]
    fn adapter_type_round_trips() {
        use std::str::FromStr;
        for variant in [AdapterType::Store, AdapterType::Channel] {
            let parsed = AdapterType::from_str(&variant.to_string()).unwrap();
            assert_eq!(parsed, variant);
        }
        let json = serde_json::to_string(&AdapterType::Store).unwrap();
        assert_eq!(json, "\"Store\"");
    }

    /// Grid-only store used to exercise the provided trait methods.
    struct GridStore {
        grid: Mutex<Vec<Vec<String>>>,
    }

    impl GridStore {
        fn new(rows: &[&[&str]]) -> Self {
            Self {
                grid: Mutex::new(
                    rows.iter()
                        .map(|r| r.iter().map(|c| c.to_string()).collect())
                        .collect(),
                ),
            }
        }
    }

    #[async_trait]
    impl PluginAdapter for GridStore {
        fn name(&self) -> &str {
            "grid"
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
    impl SheetStore for GridStore {
        async fn worksheet(&self, workbook: &str, title: &str) -> Result<SheetRef, GuildXpError> {
            Ok(SheetRef::new(workbook, title))
        }
        async fn first_worksheet(&self, workbook: &str) -> Result<SheetRef, GuildXpError> {
            Ok(SheetRef::new(workbook, "Sheet1"))
        }
        async fn read_grid(&self, _sheet: &SheetRef) -> Result<Vec<Vec<String>>, GuildXpError> {
            Ok(self.grid.lock().unwrap().clone())
        }
        async fn append_rows(
            &self,
            _sheet: &SheetRef,
            rows: Vec<Vec<String>>,
        ) -> Result<(), GuildXpError> {
            self.grid.lock().unwrap().extend(rows);
            Ok(())
        }
        async fn batch_update(
            &self,
            _sheet: &SheetRef,
            updates: Vec<CellUpdate>,
        ) -> Result<(), GuildXpError> {
            let mut grid = self.grid.lock().unwrap();
            for update in updates {
                while grid.len() < update.row {
                    grid.push(Vec::new());
                }
                let row = &mut grid[update.row - 1];
                for (offset, value) in update.values.into_iter().enumerate() {
                    let col = update.column - 1 + offset;
                    while row.len() <= col {
                        row.push(String::new());
                    }
                    row[col] = value;
                }
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn provided_methods_read_and_write_cells() {
        let store = GridStore::new(&[&["EventID", "Timestamp"], &["abc", "2026-01-01"]]);
        let sheet = SheetRef::new("book", "Attendance_Logs");

        assert_eq!(store.header_row(&sheet).await.unwrap(), vec!["EventID", "Timestamp"]);
        assert_eq!(store.cell(&sheet, 2, 1).await.unwrap(), "abc");
        assert_eq!(store.cell(&sheet, 9, 9).await.unwrap(), "");

        store.update_cell(&sheet, 2, 3, "25").await.unwrap();
        store.append_row(&sheet, vec!["def".into()]).await.unwrap();
        assert_eq!(
            store.column_values(&sheet, 1).await.unwrap(),
            vec!["EventID", "abc", "def"]
        );
        assert_eq!(store.column_values(&sheet, 3).await.unwrap(), vec!["", "25", ""]);
    }

    #[tokio::test]
    async fn records_asserts_expected_headers() {
        let store = GridStore::new(&[&["Name", "Email"], &["Ann", "ann@x.com"]]);
        let sheet = SheetRef::new("book", "Master_Roster");

        let table = store.records(&sheet, Some(&["Email"])).await.unwrap();
        assert_eq!(table.records.len(), 1);

        let err = store
            .records(&sheet, Some(&["Email", "Total_XP"]))
            .await
            .unwrap_err();
        assert!(matches!(err, GuildXpError::Validation(ref m) if m.contains("Total_XP")));
    }
}
