// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for guildxp.

use thiserror::Error;

/// The error type shared by the store adapters, the ledger, and the chat adapter.
#[derive(Debug, Error)]
pub enum GuildXpError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// A member, quest, worksheet, or channel does not exist.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// The event, approval, or claim was already recorded.
    ///
    /// This is an expected idempotence outcome, not a fault.
    #[error("already processed: {what}")]
    AlreadyProcessed { what: String },

    /// Malformed input or a malformed stored row.
    #[error("validation error: {0}")]
    Validation(String),

    /// The backing store could not be reached or rejected the call.
    #[error("storage unavailable: {source}")]
    StorageUnavailable {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Chat adapter errors (gateway failure, send failure).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GuildXpError {
    /// Wrap any backend failure as [`GuildXpError::StorageUnavailable`].
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::StorageUnavailable {
            source: source.into(),
        }
    }

    /// Shorthand for [`GuildXpError::NotFound`].
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// True for outcomes a user should see as a warning rather than a failure.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::AlreadyProcessed { .. } | Self::Validation(_)
        )
    }
}
