// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only idempotency records.
//!
//! Three worksheets answer "was this already rewarded?": processed events
//! keyed by event id, approvals keyed by source message id (or by recipient,
//! amount, reason, and day for manual grants), and puzzle claims keyed by
//! puzzle number and identity.

use std::sync::Arc;

use guildxp_core::{Clock, GuildXpError, SheetRef, SheetStore};
use tracing::debug;

use crate::records::{
    APPROVAL_HEADERS, ApprovalEntry, EventMarker, MANUAL_MESSAGE_ID, PUZZLE_HEADERS, PuzzleClaim,
};

/// Who granted what to whom, for the approval log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantAudit {
    pub officer_id: String,
    /// Source chat message; `None` for manual grants.
    pub message_id: Option<String>,
    pub reason: String,
}

impl GrantAudit {
    /// Audit for a reaction-approved submission.
    pub fn approval(officer_id: &str, message_id: &str, reason: &str) -> Self {
        Self {
            officer_id: officer_id.to_string(),
            message_id: Some(message_id.to_string()),
            reason: reason.to_string(),
        }
    }

    /// Audit for a manual grant with no source message.
    pub fn manual(officer_id: &str, reason: &str) -> Self {
        Self {
            officer_id: officer_id.to_string(),
            message_id: None,
            reason: reason.to_string(),
        }
    }
}

/// Worksheets backing the audit ledger.
#[derive(Debug, Clone)]
pub struct AuditSheets {
    pub events: SheetRef,
    pub approvals: SheetRef,
    pub puzzles: SheetRef,
}

pub struct AuditLedger {
    store: Arc<dyn SheetStore>,
    clock: Arc<dyn Clock>,
    sheets: AuditSheets,
}

impl AuditLedger {
    pub fn new(store: Arc<dyn SheetStore>, clock: Arc<dyn Clock>, sheets: AuditSheets) -> Self {
        Self {
            store,
            clock,
            sheets,
        }
    }

    /// True when a marker for `event_id` exists.
    pub async fn is_event_processed(&self, event_id: &str) -> Result<bool, GuildXpError> {
        let ids = self.store.column_values(&self.sheets.events, 1).await?;
        Ok(ids.iter().skip(1).any(|id| id.trim() == event_id))
    }

    /// Append the marker for a fully reconciled event.
    pub async fn mark_event_processed(
        &self,
        event_id: &str,
        xp_amount: u64,
    ) -> Result<(), GuildXpError> {
        let marker = EventMarker {
            event_id: event_id.to_string(),
            timestamp: self.clock.timestamp(),
            xp_amount,
        };
        self.store
            .append_row(&self.sheets.events, marker.encode())
            .await?;
        debug!(event_id, xp_amount, "event marked processed");
        Ok(())
    }

    /// True when an approval for `message_id` was already recorded.
    pub async fn is_message_approved(&self, message_id: &str) -> Result<bool, GuildXpError> {
        let message_id = message_id.trim();
        if message_id.is_empty() || message_id == MANUAL_MESSAGE_ID {
            return Ok(false);
        }
        let ids = self.store.column_values(&self.sheets.approvals, 1).await?;
        Ok(ids.iter().skip(1).any(|id| id.trim() == message_id))
    }

    /// Append an approval entry.
    pub async fn record_approval(
        &self,
        audit: &GrantAudit,
        recipient_id: &str,
        amount: u64,
    ) -> Result<(), GuildXpError> {
        let entry = ApprovalEntry {
            message_id: audit
                .message_id
                .clone()
                .unwrap_or_else(|| MANUAL_MESSAGE_ID.to_string()),
            timestamp: self.clock.timestamp(),
            officer_id: audit.officer_id.clone(),
            recipient_id: recipient_id.to_string(),
            xp_amount: amount,
            reason: audit.reason.trim().to_string(),
        };
        self.store
            .append_row(&self.sheets.approvals, entry.encode())
            .await?;
        debug!(
            message_id = %entry.message_id,
            officer = %entry.officer_id,
            recipient = %entry.recipient_id,
            amount,
            "approval recorded"
        );
        Ok(())
    }

    /// True when a manual grant with the same recipient, amount, and reason
    /// (trimmed, case-insensitive) was recorded on calendar day `date`.
    pub async fn is_manual_grant_duplicate(
        &self,
        recipient_id: &str,
        amount: u64,
        reason: &str,
        date: &str,
    ) -> Result<bool, GuildXpError> {
        let reason = reason.trim().to_lowercase();
        let table = self
            .store
            .records(&self.sheets.approvals, Some(&APPROVAL_HEADERS[..]))
            .await?;
        for record in &table.records {
            let entry = ApprovalEntry::decode(&table, record)?;
            if entry.is_manual()
                && entry.recipient_id == recipient_id
                && entry.xp_amount == amount
                && entry.reason.to_lowercase() == reason
                && entry.day() == date
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// True when `identity` already claimed `puzzle`.
    pub async fn has_claimed_puzzle(&self, puzzle: u32, identity: &str) -> Result<bool, GuildXpError> {
        let table = self
            .store
            .records(&self.sheets.puzzles, Some(&PUZZLE_HEADERS[..]))
            .await?;
        let puzzle = puzzle.to_string();
        Ok(table.records.iter().any(|r| {
            table.value(r, "Puzzle_Number").map(str::trim) == Some(puzzle.as_str())
                && table.value(r, "Discord_ID").map(str::trim) == Some(identity)
        }))
    }

    /// Append a puzzle claim.
    pub async fn record_puzzle_claim(&self, puzzle: u32, identity: &str) -> Result<(), GuildXpError> {
        let claim = PuzzleClaim {
            puzzle,
            discord_id: identity.to_string(),
            timestamp: self.clock.timestamp(),
        };
        self.store
            .append_row(&self.sheets.puzzles, claim.encode())
            .await?;
        debug!(puzzle, identity, "puzzle claim recorded");
        Ok(())
    }

    /// Calendar day used for manual-grant bucketing.
    pub fn today(&self) -> String {
        self.clock.today()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::EVENT_HEADERS;
    use guildxp_test_utils::{FixedClock, MemoryWorkbook, grid};

    fn ledger() -> (Arc<MemoryWorkbook>, Arc<FixedClock>, AuditLedger) {
        let store = Arc::new(
            MemoryWorkbook::new()
                .with_worksheet("m", "Attendance_Logs", grid(&[&EVENT_HEADERS[..]]))
                .with_worksheet("m", "Approval_Log", grid(&[&APPROVAL_HEADERS[..]]))
                .with_worksheet("m", "Wordle_Claims", grid(&[&PUZZLE_HEADERS[..]])),
        );
        let clock = Arc::new(FixedClock::at("2026-03-09 10:00:00"));
        let audit = AuditLedger::new(
            store.clone(),
            clock.clone(),
            AuditSheets {
                events: SheetRef::new("m", "Attendance_Logs"),
                approvals: SheetRef::new("m", "Approval_Log"),
                puzzles: SheetRef::new("m", "Wordle_Claims"),
            },
        );
        (store, clock, audit)
    }

    #[tokio::test]
    async fn event_markers_are_matched_exactly() {
        let (store, _clock, audit) = ledger();
        assert!(!audit.is_event_processed("1AbC").await.unwrap());
        audit.mark_event_processed("1AbC", 25).await.unwrap();
        assert!(audit.is_event_processed("1AbC").await.unwrap());
        assert!(!audit.is_event_processed("1Ab").await.unwrap());
        // Header cell is not an event id.
        assert!(!audit.is_event_processed("EventID").await.unwrap());

        let rows = store.grid("m", "Attendance_Logs").await;
        assert_eq!(rows[1], vec!["1AbC", "2026-03-09 10:00:00", "25"]);
    }

    #[tokio::test]
    async fn approvals_keyed_by_message_id() {
        let (store, _clock, audit) = ledger();
        let grant = GrantAudit::approval("officer", "msg-1", "daily quest");
        assert!(!audit.is_message_approved("msg-1").await.unwrap());
        audit.record_approval(&grant, "111", 10).await.unwrap();
        assert!(audit.is_message_approved("msg-1").await.unwrap());
        assert!(!audit.is_message_approved("msg-2").await.unwrap());

        audit
            .record_approval(&GrantAudit::manual("officer", "x"), "111", 5)
            .await
            .unwrap();
        assert!(!audit.is_message_approved(MANUAL_MESSAGE_ID).await.unwrap());
        assert_eq!(store.grid("m", "Approval_Log").await[2][0], "MANUAL");
    }

    #[tokio::test]
    async fn manual_duplicates_bucket_by_calendar_day() {
        let (_store, clock, audit) = ledger();
        audit
            .record_approval(&GrantAudit::manual("o", " Event X "), "111", 20)
            .await
            .unwrap();

        let today = audit.today();
        assert!(audit.is_manual_grant_duplicate("111", 20, "event x", &today).await.unwrap());
        assert!(!audit.is_manual_grant_duplicate("111", 20, "event y", &today).await.unwrap());
        assert!(!audit.is_manual_grant_duplicate("111", 21, "event x", &today).await.unwrap());
        assert!(!audit.is_manual_grant_duplicate("222", 20, "event x", &today).await.unwrap());

        clock.set("2026-03-10 00:00:01");
        let tomorrow = audit.today();
        assert!(!audit.is_manual_grant_duplicate("111", 20, "event x", &tomorrow).await.unwrap());
    }

    #[tokio::test]
    async fn message_approvals_do_not_count_as_manual_duplicates() {
        let (_store, _clock, audit) = ledger();
        audit
            .record_approval(&GrantAudit::approval("o", "m1", "quest"), "111", 10)
            .await
            .unwrap();
        assert!(!audit.is_manual_grant_duplicate("111", 10, "quest", "2026-03-09").await.unwrap());
    }

    #[tokio::test]
    async fn malformed_audit_amount_is_surfaced() {
        let (store, _clock, audit) = ledger();
        store
            .add_worksheet(
                "m",
                "Approval_Log",
                grid(&[
                    &APPROVAL_HEADERS[..],
                    &["MANUAL", "2026-03-09 09:00:00", "o", "111", "twenty", "x"],
                ]),
            )
            .await;
        let err = audit
            .is_manual_grant_duplicate("111", 20, "x", "2026-03-09")
            .await
            .unwrap_err();
        assert!(matches!(err, GuildXpError::Validation(_)));
    }

    #[tokio::test]
    async fn puzzle_claims_are_per_identity() {
        let (_store, _clock, audit) = ledger();
        audit.record_puzzle_claim(1674, "111").await.unwrap();
        assert!(audit.has_claimed_puzzle(1674, "111").await.unwrap());
        assert!(!audit.has_claimed_puzzle(1674, "222").await.unwrap());
        assert!(!audit.has_claimed_puzzle(1675, "111").await.unwrap());
    }
}
