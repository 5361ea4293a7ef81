// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The award engine: every single-member XP grant goes through here.
//!
//! Order of operations for gated grants:
//! 1. duplicate check (message id, or the manual same-day key)
//! 2. resolve the member by identity
//! 3. write the audit entry
//! 4. apply the XP delta
//!
//! The audit entry is written before the balance so that a failure between
//! the two leaves a missed award, which an officer can grant again, instead
//! of an award that a retry would repeat.

use std::sync::Arc;

use guildxp_core::GuildXpError;
use tracing::{info, warn};

use crate::audit::{AuditLedger, GrantAudit};
use crate::directory::MemberDirectory;
use crate::gate::WriteGate;
use crate::records::{Member, RosterLayout};

/// Result of an award attempt. Only `Awarded` changed anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AwardOutcome {
    Awarded { new_total: u64, rank: String },
    /// The source message was already approved.
    AlreadyApproved,
    /// No member is linked to the identity.
    MemberNotFound,
    /// Same recipient, amount, and reason were already granted today.
    DuplicateManualGrant,
}

pub struct AwardEngine {
    pub(crate) directory: Arc<MemberDirectory>,
    pub(crate) audit: Arc<AuditLedger>,
    pub(crate) gate: Arc<WriteGate>,
}

impl AwardEngine {
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

    /// Grant `amount` XP to the member linked to `identity`.
    ///
    /// With a message id in `audit`, a second call for the same message
    /// returns [`AwardOutcome::AlreadyApproved`] and writes nothing.
    pub async fn award(
        &self,
        identity: &str,
        amount: u64,
        audit: Option<&GrantAudit>,
    ) -> Result<AwardOutcome, GuildXpError> {
        let identity = identity.trim();
        let _guard = self.gate.member(identity).await;

        if let Some(message_id) = audit.and_then(|a| a.message_id.as_deref())
            && self.audit.is_message_approved(message_id).await?
        {
            warn!(message_id, identity, "approval already recorded, skipping");
            return Ok(AwardOutcome::AlreadyApproved);
        }

        let Some((layout, member)) = self.directory.find_for_update(identity).await? else {
            return Ok(AwardOutcome::MemberNotFound);
        };

        if let Some(audit) = audit {
            self.audit.record_approval(audit, identity, amount).await?;
        }
        let (new_total, rank) = self.credit(&layout, &member, amount).await?;
        Ok(AwardOutcome::Awarded { new_total, rank })
    }

    /// Grant XP without a source message, rejecting a same-day repeat of
    /// the same recipient, amount, and reason.
    pub async fn grant_manual(
        &self,
        identity: &str,
        amount: u64,
        reason: &str,
        officer_id: &str,
    ) -> Result<AwardOutcome, GuildXpError> {
        let identity = identity.trim();
        if reason.trim().is_empty() {
            return Err(GuildXpError::Validation(
                "a manual grant needs a reason".to_string(),
            ));
        }
        let _guard = self.gate.member(identity).await;

        let today = self.audit.today();
        if self
            .audit
            .is_manual_grant_duplicate(identity, amount, reason, &today)
            .await?
        {
            warn!(identity, amount, reason, "duplicate manual grant rejected");
            return Ok(AwardOutcome::DuplicateManualGrant);
        }

        let Some((layout, member)) = self.directory.find_for_update(identity).await? else {
            return Ok(AwardOutcome::MemberNotFound);
        };

        self.audit
            .record_approval(&GrantAudit::manual(officer_id, reason), identity, amount)
            .await?;
        let (new_total, rank) = self.credit(&layout, &member, amount).await?;
        Ok(AwardOutcome::Awarded { new_total, rank })
    }

    /// Apply the delta to a member read under the caller's guard.
    pub(crate) async fn credit(
        &self,
        layout: &RosterLayout,
        member: &Member,
        amount: u64,
    ) -> Result<(u64, String), GuildXpError> {
        let delta = i64::try_from(amount)
            .map_err(|_| GuildXpError::Validation(format!("{amount} XP is too large")))?;
        let new_total = self.directory.apply_xp_delta(layout, member, delta).await?;
        let rank = self.directory.ranks().rank_for(new_total).to_string();
        info!(identity = %member.discord_id, amount, new_total, rank = %rank, "award granted");
        Ok((new_total, rank))
    }
}
