// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter-facing ledger operations.
//!
//! [`LedgerService`] wires the directory, audit ledger, award engine, and
//! reconciler over one store handle and one configuration. Each operation
//! takes plain identifiers and returns either a typed result or the message
//! text to show the user. Expected outcomes (duplicates, unknown members,
//! bad input) come back as messages; store failures come back as errors.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use guildxp_config::GuildXpConfig;
use guildxp_config::model::{LeaderboardConfig, SheetsConfig};
use guildxp_core::{Clock, GuildXpError, SheetRef, SheetStore};
use regex::Regex;
use tracing::{info, warn};

use crate::audit::{AuditLedger, AuditSheets, GrantAudit};
use crate::award::AwardEngine;
use crate::directory::MemberDirectory;
use crate::gate::WriteGate;
use crate::leaderboard::{Leaderboard, LeaderboardMode, leaderboard};
use crate::messages;
use crate::puzzle::{PuzzleShare, parse_share};
use crate::quests::{Quest, QuestBoard, QuestCadence};
use crate::rank::{RankProgress, RankTable};
use crate::reconcile::{ReconcileSummary, Reconciler};
use crate::records::{Member, normalize_email};

static SHEET_URL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/d/([a-zA-Z0-9-_]+)").expect("sheet url pattern is valid"));

static BARE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9-_]+$").expect("sheet id pattern is valid"));

/// Extract a workbook key from a spreadsheet URL or accept a bare key.
pub fn parse_event_id(source: &str) -> Result<String, GuildXpError> {
    let source = source.trim();
    if let Some(caps) = SHEET_URL_ID.captures(source)
        && let Some(id) = caps.get(1)
    {
        return Ok(id.as_str().to_string());
    }
    if BARE_ID.is_match(source) {
        return Ok(source.to_string());
    }
    Err(GuildXpError::Validation(
        "Could not parse Sheet ID From that URL.".to_string(),
    ))
}

/// A member's balance with ladder progress.
#[derive(Debug, Clone)]
pub struct Balance {
    pub member: Member,
    pub progress: RankProgress,
}

pub struct LedgerService {
    store: Arc<dyn SheetStore>,
    sheets: SheetsConfig,
    leaderboard: LeaderboardConfig,
    xp_by_attempts: Vec<u64>,
    daily_xp: u64,
    weekly_xp: u64,
    prefix: String,
    directory: Arc<MemberDirectory>,
    audit: Arc<AuditLedger>,
    awards: AwardEngine,
    reconciler: Reconciler,
    quests: QuestBoard,
    gate: Arc<WriteGate>,
}

impl LedgerService {
    /// Resolve the ledger worksheets and build the service.
    ///
    /// Fails with `NotFound` if the roster or any audit worksheet is missing.
    pub async fn open(
        store: Arc<dyn SheetStore>,
        clock: Arc<dyn Clock>,
        config: &GuildXpConfig,
    ) -> Result<Self, GuildXpError> {
        let ranks = Arc::new(RankTable::from_tiers(&config.ranks)?);
        let sheets = config.sheets.clone();
        let book = sheets.spreadsheet_id.as_str();

        let roster = store.worksheet(book, &sheets.roster_sheet).await?;
        let audit_sheets = AuditSheets {
            events: store.worksheet(book, &sheets.events_sheet).await?,
            approvals: store.worksheet(book, &sheets.approvals_sheet).await?,
            puzzles: store.worksheet(book, &sheets.puzzle_sheet).await?,
        };

        let gate = Arc::new(WriteGate::new());
        let directory = Arc::new(MemberDirectory::new(store.clone(), roster, ranks));
        let audit = Arc::new(AuditLedger::new(store.clone(), clock, audit_sheets));
        let awards = AwardEngine::new(directory.clone(), audit.clone(), gate.clone());
        let reconciler = Reconciler::new(directory.clone(), audit.clone(), gate.clone());
        let quests = QuestBoard::new(store.clone(), SheetRef::new(book, &sheets.quests_sheet));

        info!(workbook = %book, store = store.name(), "ledger opened");
        Ok(Self {
            store,
            sheets,
            leaderboard: config.leaderboard.clone(),
            xp_by_attempts: config.puzzle.xp_by_attempts.clone(),
            daily_xp: config.quests.daily_xp,
            weekly_xp: config.quests.weekly_xp,
            prefix: config.discord.command_prefix.clone(),
            directory,
            audit,
            awards,
            reconciler,
            quests,
            gate,
        })
    }

    pub fn directory(&self) -> &MemberDirectory {
        &self.directory
    }

    pub fn awards(&self) -> &AwardEngine {
        &self.awards
    }

    /// The `join` command.
    pub async fn register(&self, email: &str, identity: &str) -> Result<String, GuildXpError> {
        let _roster_lock = self.gate.roster().await;
        match self.directory.link_identity(email, identity).await {
            Ok(outcome) => Ok(messages::link(outcome)),
            Err(GuildXpError::Validation(detail)) => Ok(format!("⚠️ {detail}")),
            Err(e) => Err(e),
        }
    }

    /// Balance and rank progress, `None` when the identity is not registered.
    pub async fn balance(&self, identity: &str) -> Result<Option<Balance>, GuildXpError> {
        Ok(self
            .directory
            .find_by_identity(identity)
            .await?
            .map(|member| Balance {
                progress: self.directory.ranks().progress_for(member.total_xp),
                member,
            }))
    }

    /// The `xp` command.
    pub async fn get_balance(&self, identity: &str) -> Result<String, GuildXpError> {
        Ok(match self.balance(identity).await? {
            Some(b) => messages::balance(b.member.total_xp, &b.progress),
            None => messages::not_registered(&self.prefix),
        })
    }

    /// Ranked entries; `top` defaults to the configured page size.
    pub async fn get_leaderboard(
        &self,
        mode: LeaderboardMode,
        top: Option<usize>,
    ) -> Result<Leaderboard, GuildXpError> {
        let roster = self.directory.snapshot().await?;
        Ok(leaderboard(
            &roster.members,
            mode,
            top.unwrap_or(self.leaderboard.default_top).max(1),
            self.leaderboard.tie_overflow_limit,
        ))
    }

    /// Award a reaction-approved submission once per source message.
    pub async fn approve_submission(
        &self,
        message_id: &str,
        officer_id: &str,
        recipient: &str,
        amount: u64,
        reason: &str,
    ) -> Result<String, GuildXpError> {
        let audit = GrantAudit::approval(officer_id, message_id, reason);
        let outcome = self.awards.award(recipient, amount, Some(&audit)).await?;
        Ok(messages::award(&outcome, amount, &self.prefix))
    }

    /// Approve a quest submission at the cadence's configured XP.
    pub async fn approve_quest(
        &self,
        cadence: QuestCadence,
        message_id: &str,
        officer_id: &str,
        recipient: &str,
    ) -> Result<String, GuildXpError> {
        let amount = self.quest_xp(cadence);
        self.approve_submission(
            message_id,
            officer_id,
            recipient,
            amount,
            &format!("{cadence} quest"),
        )
        .await
    }

    /// Officer award with no source message.
    pub async fn grant_manual(
        &self,
        recipient: &str,
        amount: u64,
        reason: &str,
        officer_id: &str,
    ) -> Result<String, GuildXpError> {
        match self
            .awards
            .grant_manual(recipient, amount, reason, officer_id)
            .await
        {
            Ok(outcome) => Ok(messages::award(&outcome, amount, &self.prefix)),
            Err(GuildXpError::Validation(detail)) => Ok(format!("⚠️ {detail}")),
            Err(e) => Err(e),
        }
    }

    /// Reward a puzzle result; `attempts` is `None` for an unsolved puzzle.
    pub async fn claim_daily_puzzle(
        &self,
        puzzle: u32,
        attempts: Option<u8>,
        identity: &str,
    ) -> Result<String, GuildXpError> {
        let share = PuzzleShare { puzzle, attempts };
        match self
            .awards
            .claim_daily_puzzle(share, identity, &self.xp_by_attempts)
            .await
        {
            Ok(outcome) => Ok(messages::puzzle(&outcome, share, &self.prefix)),
            Err(GuildXpError::Validation(detail)) => Ok(format!("⚠️ {detail}")),
            Err(e) => Err(e),
        }
    }

    /// Claim from raw message text; `None` when the text is not a share.
    pub async fn claim_share_text(
        &self,
        text: &str,
        identity: &str,
    ) -> Result<Option<String>, GuildXpError> {
        match parse_share(text) {
            Some(share) => self
                .claim_daily_puzzle(share.puzzle, share.attempts, identity)
                .await
                .map(Some),
            None => Ok(None),
        }
    }

    /// Reconcile an attendance workbook given by URL or key.
    pub async fn reconcile_event(
        &self,
        source: &str,
        xp_amount: u64,
    ) -> Result<(String, ReconcileSummary), GuildXpError> {
        let event_id = parse_event_id(source)?;
        if self.audit.is_event_processed(&event_id).await? {
            return Err(GuildXpError::AlreadyProcessed {
                what: format!("event sheet {event_id}"),
            });
        }
        let sheet = self.store.first_worksheet(&event_id).await?;
        let attendees = self.store.records(&sheet, None).await?;
        let summary = self
            .reconciler
            .reconcile(&event_id, &attendees, xp_amount)
            .await?;
        Ok((event_id, summary))
    }

    /// The `processevent` command.
    pub async fn process_event(&self, source: &str, xp_amount: u64) -> Result<String, GuildXpError> {
        match self.reconcile_event(source, xp_amount).await {
            Ok((event_id, summary)) => Ok(messages::event_processed(&event_id, summary)),
            Err(GuildXpError::AlreadyProcessed { .. }) => {
                Ok(messages::event_already_processed(&self.sheets.events_sheet))
            }
            Err(GuildXpError::Validation(detail)) => Ok(messages::event_error(&detail)),
            Err(GuildXpError::NotFound { what }) => {
                Ok(messages::event_error(&format!("could not open {what}")))
            }
            Err(e) => Err(e),
        }
    }

    /// Recompute every member's board flag from the board roster's email column.
    pub async fn sync_board_flags(&self) -> Result<usize, GuildXpError> {
        let book = &self.sheets.spreadsheet_id;
        let sheet = self.store.worksheet(book, &self.sheets.board_sheet).await?;
        let table = self.store.records(&sheet, None).await?;
        let email_col = table
            .headers
            .iter()
            .position(|h| h.to_lowercase().contains("email"))
            .ok_or_else(|| {
                GuildXpError::Validation(format!("{sheet} has no email column"))
            })?;
        let board: HashSet<String> = table
            .records
            .iter()
            .map(|r| normalize_email(r.get(email_col)))
            .filter(|e| !e.is_empty())
            .collect();

        let _roster_lock = self.gate.roster().await;
        let changed = self.directory.set_board_flags(&board).await?;
        if changed == 0 {
            warn!(board = board.len(), "board sync changed nothing");
        }
        Ok(changed)
    }

    /// A random quest for the announcement.
    pub async fn pick_quest(&self, cadence: QuestCadence) -> Result<Quest, GuildXpError> {
        self.quests.pick_quest(cadence).await
    }

    pub fn quest_xp(&self, cadence: QuestCadence) -> u64 {
        match cadence {
            QuestCadence::Daily => self.daily_xp,
            QuestCadence::Weekly => self.weekly_xp,
        }
    }

    pub fn command_prefix(&self) -> &str {
        &self.prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_id_from_url_or_bare_key() {
        assert_eq!(
            parse_event_id("https://docs.google.com/spreadsheets/d/1AbC-d_E/edit#gid=0").unwrap(),
            "1AbC-d_E"
        );
        assert_eq!(parse_event_id(" 1AbC-d_E ").unwrap(), "1AbC-d_E");
        assert!(matches!(
            parse_event_id("https://example.com/form"),
            Err(GuildXpError::Validation(_))
        ));
        assert!(parse_event_id("").is_err());
    }
}
