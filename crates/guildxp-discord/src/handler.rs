// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing of Discord events onto ledger operations.
//!
//! The serenity event handler reduces every message and reaction to a
//! plain [`InboundText`] or [`InboundReaction`] and hands it to [`Router`],
//! which decides what to do and returns the reply text, if any.

use std::sync::Arc;

use guildxp_config::model::DiscordConfig;
use guildxp_core::GuildXpError;
use guildxp_ledger::{LedgerService, QuestCadence, messages};
use tracing::{debug, error, info, warn};

use crate::command::{Command, help_text, parse_command};
use crate::render;

/// A message as the router sees it.
#[derive(Debug, Clone, Default)]
pub struct InboundText {
    pub message_id: String,
    pub channel_id: u64,
    pub author_id: String,
    pub author_roles: Vec<String>,
    pub author_is_bot: bool,
    pub content: String,
}

/// A reaction added to a message.
#[derive(Debug, Clone, Default)]
pub struct InboundReaction {
    pub channel_id: u64,
    pub emoji: String,
    pub reactor_id: String,
    pub reactor_roles: Vec<String>,
    /// The reacted-to message.
    pub message_id: String,
    pub author_id: String,
    pub author_is_bot: bool,
}

/// True when the user, or one of their roles, is listed as an officer.
pub fn is_officer(user_id: &str, role_ids: &[String], officer_ids: &[String]) -> bool {
    officer_ids
        .iter()
        .map(|id| id.trim())
        .any(|id| id == user_id || role_ids.iter().any(|r| r == id))
}

/// Which quest, if any, a channel collects submissions for.
pub fn quest_cadence_for_channel(channel_id: u64, config: &DiscordConfig) -> Option<QuestCadence> {
    if config.daily_quest_channel_id == Some(channel_id) {
        Some(QuestCadence::Daily)
    } else if config.weekly_quest_channel_id == Some(channel_id) {
        Some(QuestCadence::Weekly)
    } else {
        None
    }
}

pub fn is_puzzle_channel(channel_id: u64, config: &DiscordConfig) -> bool {
    config.puzzle_channel_id.is_none_or(|id| id == channel_id)
}

/// Emoji equality ignoring the variation selector Discord sometimes adds.
pub fn is_approval_emoji(emoji: &str, config: &DiscordConfig) -> bool {
    let strip = |s: &str| s.trim().replace('\u{FE0F}', "");
    strip(emoji) == strip(&config.approval_emoji)
}

/// Reply for an operation that failed outright.
pub fn error_reply(err: &GuildXpError) -> String {
    match err {
        GuildXpError::StorageUnavailable { .. } => {
            "⚠️ The XP sheet is unavailable right now. Nothing was changed; please try again later."
                .to_string()
        }
        e if e.is_expected() => format!("⚠️ {e}"),
        _ => "❌ Something went wrong. An officer has been notified in the logs.".to_string(),
    }
}

pub struct Router {
    ledger: Arc<LedgerService>,
    config: DiscordConfig,
    community: String,
}

impl Router {
    pub fn new(ledger: Arc<LedgerService>, config: DiscordConfig, community: &str) -> Self {
        Self {
            ledger,
            config,
            community: community.to_string(),
        }
    }

    pub fn ledger(&self) -> &LedgerService {
        &self.ledger
    }

    pub fn config(&self) -> &DiscordConfig {
        &self.config
    }

    /// Handle a message: a prefix command or a puzzle share.
    pub async fn on_text(&self, msg: &InboundText) -> Option<String> {
        if msg.author_is_bot {
            return None;
        }
        let prefix = self.config.command_prefix.as_str();
        match parse_command(prefix, &msg.content) {
            Some(Ok(command)) => {
                let officer = is_officer(&msg.author_id, &msg.author_roles, &self.config.officer_ids);
                if command.requires_officer() && !officer {
                    debug!(author = %msg.author_id, ?command, "officer command refused");
                    return Some("🚫 Only officers can use that command.".to_string());
                }
                Some(self.run(command, &msg.author_id).await)
            }
            Some(Err(e)) => Some(e.reply(prefix)),
            None if is_puzzle_channel(msg.channel_id, &self.config) => {
                match self.ledger.claim_share_text(&msg.content, &msg.author_id).await {
                    Ok(reply) => reply,
                    Err(e) => Some(self.failed("puzzle claim", &e)),
                }
            }
            None => None,
        }
    }

    /// Handle a reaction: an officer approving a quest submission.
    pub async fn on_reaction(&self, reaction: &InboundReaction) -> Option<String> {
        let cadence = quest_cadence_for_channel(reaction.channel_id, &self.config)?;
        if !is_approval_emoji(&reaction.emoji, &self.config) || reaction.author_is_bot {
            return None;
        }
        if !is_officer(
            &reaction.reactor_id,
            &reaction.reactor_roles,
            &self.config.officer_ids,
        ) {
            debug!(reactor = %reaction.reactor_id, "approval reaction from non-officer ignored");
            return None;
        }
        if reaction.reactor_id == reaction.author_id {
            warn!(officer = %reaction.reactor_id, "officer tried to approve own submission");
            return None;
        }

        info!(
            %cadence,
            message_id = %reaction.message_id,
            officer = %reaction.reactor_id,
            recipient = %reaction.author_id,
            "quest submission approved"
        );
        match self
            .ledger
            .approve_quest(
                cadence,
                &reaction.message_id,
                &reaction.reactor_id,
                &reaction.author_id,
            )
            .await
        {
            Ok(reply) => Some(format!("<@{}> {reply}", reaction.author_id)),
            Err(e) => Some(self.failed("quest approval", &e)),
        }
    }

    async fn run(&self, command: Command, author_id: &str) -> String {
        let prefix = self.config.command_prefix.as_str();
        let result = match command {
            Command::Join { email } => self.ledger.register(&email, author_id).await,
            Command::Xp => self.ledger.get_balance(author_id).await,
            Command::Leaderboard { mode, top } => self
                .ledger
                .get_leaderboard(mode, top)
                .await
                .map(|board| render::leaderboard(&board, &self.community)),
            Command::Award {
                recipient,
                amount,
                reason,
            } => self
                .ledger
                .grant_manual(&recipient, amount, &reason, author_id)
                .await
                .map(|reply| format!("<@{recipient}> {reply}")),
            Command::ProcessEvent { source, xp } => self.ledger.process_event(&source, xp).await,
            Command::SyncBoard => self
                .ledger
                .sync_board_flags()
                .await
                .map(messages::board_synced),
            Command::Help => Ok(help_text(prefix)),
        };
        result.unwrap_or_else(|e| self.failed("command", &e))
    }

    fn failed(&self, what: &str, err: &GuildXpError) -> String {
        if err.is_expected() {
            warn!(what, error = %err, "request rejected");
        } else {
            error!(what, error = %err, "request failed");
        }
        error_reply(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DiscordConfig {
        DiscordConfig {
            officer_ids: vec!["900".into(), " 42 ".into()],
            daily_quest_channel_id: Some(10),
            weekly_quest_channel_id: Some(20),
            puzzle_channel_id: Some(30),
            ..DiscordConfig::default()
        }
    }

    #[test]
    fn officers_match_by_user_or_role() {
        let officers = config().officer_ids;
        assert!(is_officer("900", &[], &officers));
        assert!(is_officer("5", &["42".into()], &officers));
        assert!(!is_officer("5", &["7".into()], &officers));
        assert!(!is_officer("900", &[], &[]));
    }

    #[test]
    fn channels_map_to_cadences() {
        let c = config();
        assert_eq!(quest_cadence_for_channel(10, &c), Some(QuestCadence::Daily));
        assert_eq!(quest_cadence_for_channel(20, &c), Some(QuestCadence::Weekly));
        assert_eq!(quest_cadence_for_channel(30, &c), None);
    }

    #[test]
    fn puzzle_channel_defaults_to_anywhere() {
        assert!(is_puzzle_channel(30, &config()));
        assert!(!is_puzzle_channel(31, &config()));
        assert!(is_puzzle_channel(31, &DiscordConfig::default()));
    }

    #[test]
    fn approval_emoji_ignores_variation_selector() {
        let c = DiscordConfig {
            approval_emoji: "✅".into(),
            ..DiscordConfig::default()
        };
        assert!(is_approval_emoji("✅", &c));
        assert!(is_approval_emoji("✅\u{FE0F}", &c));
        assert!(!is_approval_emoji("👍", &c));
    }

    #[test]
    fn storage_failures_get_a_retry_hint() {
        let reply = error_reply(&GuildXpError::storage("connection reset"));
        assert!(reply.contains("try again later"));
        assert!(!reply.contains("connection reset"));
        let reply = error_reply(&GuildXpError::not_found("quest for daily"));
        assert_eq!(reply, "⚠️ not found: quest for daily");
    }
}
