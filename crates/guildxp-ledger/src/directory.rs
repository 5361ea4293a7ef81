// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Member directory over the roster worksheet.
//!
//! Emails are unique and matched case-insensitively. A chat identity, once
//! written to a row, is never reassigned. [`MemberDirectory::apply_xp_delta`]
//! is the only code path that writes a member's XP, and it always rewrites
//! the rank alongside.

use std::collections::HashSet;
use std::sync::Arc;

use guildxp_core::{GuildXpError, SheetRef, SheetStore};
use tracing::{debug, info};

use crate::rank::RankTable;
use crate::records::{Member, ROSTER_HEADERS, Roster, RosterLayout, Upserted, normalize_email};

/// Result of [`MemberDirectory::link_identity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// An unlinked roster row with this email now carries the identity.
    Linked,
    /// The identity was already registered; nothing changed.
    AlreadyLinkedSame,
    /// The email belongs to a row linked to another identity; nothing changed.
    AlreadyLinkedOther,
    /// A new member row was appended.
    Created,
}

/// Read/write access to the member roster.
pub struct MemberDirectory {
    store: Arc<dyn SheetStore>,
    sheet: SheetRef,
    ranks: Arc<RankTable>,
}

impl MemberDirectory {
    pub fn new(store: Arc<dyn SheetStore>, sheet: SheetRef, ranks: Arc<RankTable>) -> Self {
        Self {
            store,
            sheet,
            ranks,
        }
    }

    /// The roster worksheet.
    pub fn sheet(&self) -> &SheetRef {
        &self.sheet
    }

    pub fn store(&self) -> &Arc<dyn SheetStore> {
        &self.store
    }

    pub fn ranks(&self) -> &RankTable {
        &self.ranks
    }

    /// Read and decode the whole roster in one round trip.
    pub async fn snapshot(&self) -> Result<Roster, GuildXpError> {
        let table = self.store.records(&self.sheet, Some(&ROSTER_HEADERS[..])).await?;
        let roster = Roster::decode(&table)?;
        debug!(sheet = %self.sheet, members = roster.members.len(), "roster snapshot");
        Ok(roster)
    }

    pub async fn find_by_identity(&self, identity: &str) -> Result<Option<Member>, GuildXpError> {
        Ok(self.snapshot().await?.by_identity(identity).cloned())
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Member>, GuildXpError> {
        Ok(self.snapshot().await?.by_email(email).cloned())
    }

    /// The member linked to `identity` together with the column layout of
    /// the same read, ready for [`MemberDirectory::apply_xp_delta`].
    pub async fn find_for_update(
        &self,
        identity: &str,
    ) -> Result<Option<(RosterLayout, Member)>, GuildXpError> {
        let roster = self.snapshot().await?;
        Ok(roster
            .by_identity(identity)
            .cloned()
            .map(|member| (roster.layout, member)))
    }

    /// Attach a chat identity to an email (the `join` flow).
    ///
    /// The identity is checked first, so a member who is already registered
    /// gets [`LinkOutcome::AlreadyLinkedSame`] whatever email they give.
    pub async fn link_identity(
        &self,
        email: &str,
        identity: &str,
    ) -> Result<LinkOutcome, GuildXpError> {
        let email = normalize_email(email);
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(GuildXpError::Validation("identity must not be empty".into()));
        }
        if !is_plausible_email(&email) {
            return Err(GuildXpError::Validation(format!(
                "`{email}` does not look like an email address"
            )));
        }

        let mut roster = self.snapshot().await?;
        if roster.by_identity(identity).is_some() {
            return Ok(LinkOutcome::AlreadyLinkedSame);
        }

        if let Some(member) = roster.by_email(&email) {
            if !member.discord_id.is_empty() {
                info!(
                    email = %email,
                    identity = %identity,
                    linked_to = %member.discord_id,
                    "join rejected: email linked to another identity"
                );
                return Ok(LinkOutcome::AlreadyLinkedOther);
            }
            let update = roster.layout.identity_update(member.row, identity);
            self.store.batch_update(&self.sheet, vec![update]).await?;
            info!(email = %email, identity = %identity, row = member.row, "identity linked");
            return Ok(LinkOutcome::Linked);
        }

        roster.upsert(Member {
            row: 0,
            name: String::new(),
            email: email.clone(),
            year: String::new(),
            discord_id: identity.to_string(),
            total_xp: 0,
            rank: self.ranks.baseline().to_string(),
            board: false,
        });
        self.store
            .append_rows(&self.sheet, roster.pending_rows())
            .await?;
        info!(email = %email, identity = %identity, "member registered");
        Ok(LinkOutcome::Created)
    }

    /// Resolve an email to a roster row, appending an unlinked member at
    /// 0 XP when unknown.
    pub async fn upsert_from_roster(
        &self,
        email: &str,
        name: &str,
        year: &str,
    ) -> Result<Upserted, GuildXpError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(GuildXpError::Validation("email must not be empty".into()));
        }
        let mut roster = self.snapshot().await?;
        let upserted = roster.upsert(self.new_member(&email, name, year, 0));
        if upserted.created {
            self.store
                .append_rows(&self.sheet, roster.pending_rows())
                .await?;
            info!(email = %email, row = upserted.row, "member enrolled");
        }
        Ok(upserted)
    }

    /// A not-yet-linked member at `total_xp`, ranked by the table.
    pub fn new_member(&self, email: &str, name: &str, year: &str, total_xp: u64) -> Member {
        Member {
            row: 0,
            name: name.trim().to_string(),
            email: normalize_email(email),
            year: year.trim().to_string(),
            discord_id: String::new(),
            total_xp,
            rank: self.ranks.rank_for(total_xp).to_string(),
            board: false,
        }
    }

    /// Add `delta` to `member`'s XP and rewrite its rank in one batch call.
    ///
    /// `layout` and `member` must come from the same fresh snapshot; the
    /// only I/O here is the write. A result below zero is a validation error
    /// and nothing is written.
    pub async fn apply_xp_delta(
        &self,
        layout: &RosterLayout,
        member: &Member,
        delta: i64,
    ) -> Result<u64, GuildXpError> {
        let new_total = member
            .total_xp
            .checked_add_signed(delta)
            .ok_or_else(|| {
                GuildXpError::Validation(format!(
                    "XP change {delta} would take {} below zero",
                    member.email
                ))
            })?;
        let rank = self.ranks.rank_for(new_total);

        self.store
            .batch_update(&self.sheet, layout.xp_updates(member.row, new_total, rank))
            .await?;
        info!(
            email = %member.email,
            identity = %member.discord_id,
            delta,
            old_total = member.total_xp,
            new_total,
            rank,
            "xp applied"
        );
        Ok(new_total)
    }

    /// Overwrite every member's board flag from a set of board emails.
    ///
    /// Returns how many flags changed. Writes nothing when none changed.
    pub async fn set_board_flags(&self, board_emails: &HashSet<String>) -> Result<usize, GuildXpError> {
        let roster = self.snapshot().await?;
        let updates: Vec<_> = roster
            .members
            .iter()
            .filter(|m| m.board != board_emails.contains(&m.email))
            .map(|m| roster.layout.board_update(m.row, !m.board))
            .collect();
        let changed = updates.len();
        if changed > 0 {
            self.store.batch_update(&self.sheet, updates).await?;
        }
        info!(changed, board = board_emails.len(), "board flags synced");
        Ok(changed)
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guildxp_config::model::default_ranks;
    use guildxp_test_utils::{MemoryWorkbook, WriteOp, grid};

    const BOOK: &str = "master";

    fn directory(rows: &[&[&str]]) -> (Arc<MemoryWorkbook>, MemberDirectory) {
        let mut all: Vec<&[&str]> = vec![&ROSTER_HEADERS[..]];
        all.extend_from_slice(rows);
        let store = Arc::new(MemoryWorkbook::new().with_worksheet(BOOK, "Master_Roster", grid(&all)));
        let ranks = Arc::new(RankTable::from_tiers(&default_ranks()).unwrap());
        let dir = MemberDirectory::new(store.clone(), SheetRef::new(BOOK, "Master_Roster"), ranks);
        (store, dir)
    }

    #[tokio::test]
    async fn link_outcomes_cover_all_cases() {
        let (store, dir) = directory(&[
            &["Ann", "ann@x.com", "2", "", "40", "Newcomer", "N"],
            &["Bo", "bo@x.com", "3", "222", "0", "Newcomer", "N"],
        ]);

        assert_eq!(dir.link_identity("ANN@x.com ", "111").await.unwrap(), LinkOutcome::Linked);
        assert_eq!(dir.link_identity("ann@x.com", "111").await.unwrap(), LinkOutcome::AlreadyLinkedSame);
        assert_eq!(
            dir.link_identity("bo@x.com", "999").await.unwrap(),
            LinkOutcome::AlreadyLinkedOther
        );
        assert_eq!(dir.link_identity("cy@x.com", "333").await.unwrap(), LinkOutcome::Created);

        let cy = dir.find_by_identity("333").await.unwrap().unwrap();
        assert_eq!(cy.email, "cy@x.com");
        assert_eq!(cy.total_xp, 0);
        assert_eq!(cy.rank, "Newcomer");
        assert_eq!(cy.row, 4);

        let bo = dir.find_by_email("bo@x.com").await.unwrap().unwrap();
        assert_eq!(bo.discord_id, "222");
        assert_eq!(store.write_count().await, 2);
    }

    #[tokio::test]
    async fn second_identity_cannot_take_a_linked_email() {
        let (_store, dir) = directory(&[]);
        assert_eq!(dir.link_identity("e@x.com", "A").await.unwrap(), LinkOutcome::Created);
        assert_eq!(
            dir.link_identity("e@x.com", "B").await.unwrap(),
            LinkOutcome::AlreadyLinkedOther
        );
        assert_eq!(dir.find_by_email("e@x.com").await.unwrap().unwrap().discord_id, "A");
        assert!(dir.find_by_identity("B").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn link_rejects_bad_input_without_writing() {
        let (store, dir) = directory(&[]);
        assert!(dir.link_identity("not-an-email", "1").await.is_err());
        assert!(dir.link_identity("a@x.com", "  ").await.is_err());
        assert_eq!(store.write_count().await, 0);
    }

    #[tokio::test]
    async fn apply_xp_delta_rewrites_rank_in_one_call() {
        let (store, dir) = directory(&[&["Ann", "ann@x.com", "2", "111", "90", "Newcomer", "N"]]);
        let roster = dir.snapshot().await.unwrap();
        let ann = roster.by_identity("111").unwrap();
        let reads = store.read_count();

        assert_eq!(dir.apply_xp_delta(&roster.layout, ann, 15).await.unwrap(), 105);
        assert_eq!(store.read_count(), reads);
        let writes = store.writes().await;
        assert_eq!(writes.len(), 1);
        assert!(matches!(&writes[0], WriteOp::Batch { updates, .. } if updates.len() == 1));

        let ann = dir.find_by_identity("111").await.unwrap().unwrap();
        assert_eq!(ann.total_xp, 105);
        assert_eq!(ann.rank, "Rank 1");

        assert!(dir.apply_xp_delta(&roster.layout, &ann, -200).await.is_err());
        assert_eq!(store.write_count().await, 1);
    }

    #[tokio::test]
    async fn upsert_from_roster_matches_on_email_only() {
        let (store, dir) = directory(&[&["Ann", "ann@x.com", "2", "", "0", "Newcomer", "N"]]);
        let existing = dir.upsert_from_roster("Ann@X.com", "Someone", "").await.unwrap();
        assert_eq!(existing, Upserted { row: 2, created: false });
        assert_eq!(store.write_count().await, 0);

        let created = dir.upsert_from_roster("dee@x.com", "Dee", "1").await.unwrap();
        assert_eq!(created, Upserted { row: 3, created: true });
        let dee = dir.find_by_email("dee@x.com").await.unwrap().unwrap();
        assert_eq!(dee.name, "Dee");
        assert!(dee.discord_id.is_empty());
    }

    #[tokio::test]
    async fn board_flags_are_overwritten_and_idempotent() {
        let (store, dir) = directory(&[
            &["Ann", "ann@x.com", "", "1", "0", "Newcomer", "Y"],
            &["Bo", "bo@x.com", "", "2", "0", "Newcomer", ""],
            &["Cy", "cy@x.com", "", "3", "0", "Newcomer", "N"],
        ]);
        let board: HashSet<String> = ["bo@x.com".to_string()].into();

        assert_eq!(dir.set_board_flags(&board).await.unwrap(), 2);
        assert_eq!(dir.set_board_flags(&board).await.unwrap(), 0);
        assert_eq!(store.write_count().await, 1);

        let roster = dir.snapshot().await.unwrap();
        let flags: Vec<bool> = roster.members.iter().map(|m| m.board).collect();
        assert_eq!(flags, vec![false, true, false]);
    }

    #[tokio::test]
    async fn storage_failures_propagate() {
        let (store, dir) = directory(&[&["Ann", "ann@x.com", "", "", "0", "Newcomer", "N"]]);
        store.fail_writes_to("Master_Roster").await;
        let err = dir.link_identity("ann@x.com", "1").await.unwrap_err();
        assert!(matches!(err, GuildXpError::StorageUnavailable { .. }));
    }
}
