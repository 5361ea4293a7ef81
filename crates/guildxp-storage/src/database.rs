// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and migrations.
//!
//! All statements run on tokio-rusqlite's single background thread, which
//! serializes writes. Do not open a second connection for writes.

use std::path::Path;

use guildxp_core::GuildXpError;
use tracing::debug;

use crate::migrations;

/// Convert a tokio-rusqlite error into [`GuildXpError::StorageUnavailable`].
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> GuildXpError {
    GuildXpError::storage(e)
}

pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database file and run pending migrations.
    pub async fn open(path: &str) -> Result<Self, GuildXpError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(GuildXpError::storage)?;
        }
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(GuildXpError::storage)?;
        let db = Self { conn };
        db.prepare(true).await?;
        debug!(path, "database opened");
        Ok(db)
    }

    /// A private in-memory database, for tests and dry runs.
    pub async fn open_in_memory() -> Result<Self, GuildXpError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(GuildXpError::storage)?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Flush the WAL into the main file.
    pub async fn checkpoint(&self) -> Result<(), GuildXpError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn prepare(&self, wal: bool) -> Result<(), GuildXpError> {
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                if wal {
                    conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
                }
                conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        self.conn
            .call(migrations::run_migrations)
            .await
            .map_err(|e| GuildXpError::storage(format!("migrations failed: {e}")))
    }
}
