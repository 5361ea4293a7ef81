// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing wording for every ledger outcome.

use crate::award::AwardOutcome;
use crate::directory::LinkOutcome;
use crate::puzzle::{PuzzleOutcome, PuzzleShare};
use crate::rank::RankProgress;
use crate::reconcile::ReconcileSummary;

pub fn link(outcome: LinkOutcome) -> String {
    match outcome {
        LinkOutcome::AlreadyLinkedSame => {
            "✨ **You're already in!** This Discord account is already registered in our system."
        }
        LinkOutcome::Linked => {
            "🔗 **Account Linked!** We've successfully connected your Discord to your member record. Welcome!"
        }
        LinkOutcome::AlreadyLinkedOther => {
            "⚠️ **Oops!** That email is already connected to a different Discord account."
        }
        LinkOutcome::Created => {
            "🎉 **Welcome aboard!** You've been successfully registered in the XP system. Time to start earning! 🚀"
        }
    }
    .to_string()
}

pub fn not_registered(prefix: &str) -> String {
    format!(
        "Your Discord account was not found in the XP system.\n\
         Please register using the join command (Ex: {prefix}join email@ufl.edu)."
    )
}

/// `▰▰▰▱▱▱▱▱▱▱` style bar, `width` cells wide.
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "▰".repeat(filled), "▱".repeat(width - filled))
}

pub fn balance(xp: u64, progress: &RankProgress) -> String {
    let bar = progress_bar(progress.fraction, 10);
    let next = match &progress.next {
        Some((threshold, label)) => {
            format!("{} XP to {label}", threshold.saturating_sub(xp))
        }
        None => "max rank reached".to_string(),
    };
    format!(
        "Your rank is \"{}\" and you currently have {xp} XP!\n{bar} {next}",
        progress.current_label
    )
}

pub fn award(outcome: &AwardOutcome, amount: u64, prefix: &str) -> String {
    match outcome {
        AwardOutcome::Awarded { new_total, rank } => {
            format!("Added {amount} XP! New Total: {new_total} ({rank})")
        }
        AwardOutcome::AlreadyApproved => {
            "⚠️ This submission was already approved. No XP was added.".to_string()
        }
        AwardOutcome::MemberNotFound => {
            format!("❌ User not found in roster. Please use {prefix}join first.")
        }
        AwardOutcome::DuplicateManualGrant => {
            "⚠️ The same award with the same reason was already given today. No XP was added."
                .to_string()
        }
    }
}

pub fn puzzle(outcome: &PuzzleOutcome, share: PuzzleShare, prefix: &str) -> String {
    match outcome {
        PuzzleOutcome::Awarded {
            xp,
            new_total,
            rank,
        } => format!(
            "🧩 Wordle {} solved in {}/6! +{xp} XP. New Total: {new_total} ({rank})",
            share.puzzle,
            share.attempts.unwrap_or_default()
        ),
        PuzzleOutcome::AlreadyClaimed => {
            format!("You already claimed Wordle {} today.", share.puzzle)
        }
        PuzzleOutcome::Incomplete => format!(
            "Wordle {} got away this time. No XP, but see you tomorrow!",
            share.puzzle
        ),
        PuzzleOutcome::MemberNotFound => not_registered(prefix),
    }
}

pub fn event_processed(event_id: &str, summary: ReconcileSummary) -> String {
    let short: String = event_id.chars().take(5).collect();
    format!(
        "✅  Success! Processed Sheet ID {short}... Updated {} and added {}.",
        summary.updated, summary.created
    )
}

pub fn event_already_processed(events_sheet: &str) -> String {
    format!(
        "⚠️ STOP: This event sheet has already been processed! Check '{events_sheet}' for details."
    )
}

pub fn event_error(detail: &str) -> String {
    format!("❌Error: {detail}")
}

pub fn board_synced(changed: usize) -> String {
    format!("✅ Board roster synced. {changed} member flag(s) changed.")
}
