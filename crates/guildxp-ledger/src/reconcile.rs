// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bulk XP import from an event attendance sheet.
//!
//! One event id is rewarded at most once. Existing members are matched by
//! email against a single roster snapshot; unknown emails are enrolled with
//! the event's XP. All roster changes go out as one batch update and one
//! append, and the processed marker is written only after both succeed, so
//! a failed run stays retryable.

use std::collections::HashSet;
use std::sync::Arc;

use guildxp_core::{GuildXpError, SheetTable};
use tracing::{debug, info, warn};

use crate::audit::AuditLedger;
use crate::directory::MemberDirectory;
use crate::gate::WriteGate;
use crate::records::normalize_email;

/// Counts returned by [`Reconciler::reconcile`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Existing members credited.
    pub updated: usize,
    /// Members enrolled from this event.
    pub created: usize,
}

/// Where the attendee fields live in an event sheet (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendeeColumns {
    pub email: usize,
    pub name: Option<usize>,
    pub year: Option<usize>,
}

/// Find attendee columns by case-insensitive substring match on headers.
///
/// The email column is the first header containing "email". The name
/// column is the first header containing "name" but not "user" (so a
/// "Username" column is skipped). The year column contains "year".
pub fn resolve_attendee_columns(headers: &[String]) -> Result<AttendeeColumns, GuildXpError> {
    let find = |pred: &dyn Fn(&str) -> bool| {
        headers
            .iter()
            .position(|h| pred(h.trim().to_lowercase().as_str()))
    };
    let email = find(&|h| h.contains("email")).ok_or_else(|| {
        GuildXpError::Validation(
            "could not find a column named like 'Email' in the event sheet".to_string(),
        )
    })?;
    Ok(AttendeeColumns {
        email,
        name: find(&|h| h.contains("name") && !h.contains("user")),
        year: find(&|h| h.contains("year")),
    })
}

pub struct Reconciler {
    directory: Arc<MemberDirectory>,
    audit: Arc<AuditLedger>,
    gate: Arc<WriteGate>,
}

impl Reconciler {
    pub fn new(
        directory: Arc<MemberDirectory>,
        audit: Arc<AuditLedger>,
        gate: Arc<WriteGate>,
    ) -> Self {
        Self {
            directory,
            audit,
            gate,
        }
    }

    /// Credit every attendee in `attendees` with `xp_amount`, once per event.
    ///
    /// Returns [`GuildXpError::AlreadyProcessed`] without writing when the
    /// event already has a marker, and [`GuildXpError::Validation`] without
    /// writing when no email column is found.
    pub async fn reconcile(
        &self,
        event_id: &str,
        attendees: &SheetTable,
        xp_amount: u64,
    ) -> Result<ReconcileSummary, GuildXpError> {
        let _roster_lock = self.gate.roster().await;

        if self.audit.is_event_processed(event_id).await? {
            warn!(event_id, "event already processed");
            return Err(GuildXpError::AlreadyProcessed {
                what: format!("event sheet {event_id}"),
            });
        }

        let columns = resolve_attendee_columns(&attendees.headers)?;
        let mut roster = self.directory.snapshot().await?;
        let layout = roster.layout;
        let ranks = self.directory.ranks();

        let mut seen = HashSet::new();
        let mut updates = Vec::new();
        let mut summary = ReconcileSummary::default();

        for record in &attendees.records {
            let email = normalize_email(record.get(columns.email));
            if email.is_empty() {
                continue;
            }
            if !seen.insert(email.clone()) {
                debug!(event_id, email = %email, "duplicate attendee row skipped");
                continue;
            }

            let name = columns.name.map(|c| record.get(c)).unwrap_or_default();
            let year = columns.year.map(|c| record.get(c)).unwrap_or_default();
            let candidate = self.directory.new_member(&email, name, year, xp_amount);
            let upserted = roster.upsert(candidate);
            if upserted.created {
                summary.created += 1;
                continue;
            }

            let Some(member) = roster.by_row_mut(upserted.row) else {
                continue;
            };
            let new_total = member.total_xp.checked_add(xp_amount).ok_or_else(|| {
                GuildXpError::Validation(format!("XP for {email} would overflow"))
            })?;
            let rank = ranks.rank_for(new_total);
            debug!(event_id, email = %email, old = member.total_xp, new_total, "attendee credited");
            updates.extend(layout.xp_updates(member.row, new_total, rank));
            member.total_xp = new_total;
            member.rank = rank.to_string();
            summary.updated += 1;
        }

        let sheet = self.directory.sheet().clone();
        let store = self.directory.store();
        if !updates.is_empty() {
            store.batch_update(&sheet, updates).await?;
        }
        let new_rows = roster.pending_rows();
        if !new_rows.is_empty() {
            store.append_rows(&sheet, new_rows).await?;
        }
        self.audit.mark_event_processed(event_id, xp_amount).await?;

        info!(
            event_id,
            xp_amount,
            updated = summary.updated,
            created = summary.created,
            "event reconciled"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn finds_form_style_columns() {
        let cols = resolve_attendee_columns(&headers(&[
            "Timestamp",
            "Discord Username",
            "Name (First & Last)",
            "UF Email Address",
            "Year",
        ]))
        .unwrap();
        assert_eq!(
            cols,
            AttendeeColumns {
                email: 3,
                name: Some(2),
                year: Some(4)
            }
        );
    }

    #[test]
    fn name_and_year_are_optional() {
        let cols = resolve_attendee_columns(&headers(&["EMAIL"])).unwrap();
        assert_eq!(cols.email, 0);
        assert_eq!(cols.name, None);
        assert_eq!(cols.year, None);
    }

    #[test]
    fn missing_email_column_is_validation_error() {
        let err = resolve_attendee_columns(&headers(&["Name", "Phone"])).unwrap_err();
        assert!(matches!(err, GuildXpError::Validation(_)));
    }
}
