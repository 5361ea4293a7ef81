// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discord channel adapter for guildxp.
//!
//! Connects to the Discord gateway via serenity, turns prefix commands,
//! puzzle shares and officer approval reactions into ledger calls, and posts
//! quest announcements.

pub mod command;
pub mod handler;
pub mod render;

use std::sync::Arc;

use async_trait::async_trait;
use guildxp_config::model::DiscordConfig;
use guildxp_core::{AdapterType, GuildXpError, HealthStatus, PluginAdapter};
use guildxp_ledger::{LedgerService, QuestCadence};
use serenity::Client;
use serenity::client::{Context, EventHandler};
use serenity::gateway::ShardManager;
use serenity::http::Http;
use serenity::model::channel::{Message, Reaction, ReactionType};
use serenity::model::gateway::{GatewayIntents, Ready};
use serenity::model::id::ChannelId;
use tracing::{debug, info, warn};

pub use handler::{InboundReaction, InboundText, Router};

fn channel_error(message: impl Into<String>, source: serenity::Error) -> GuildXpError {
    GuildXpError::Channel {
        message: message.into(),
        source: Some(Box::new(source)),
    }
}

/// Discord channel adapter.
pub struct DiscordChannel {
    token: String,
    http: Arc<Http>,
    router: Arc<Router>,
    shard_manager: tokio::sync::Mutex<Option<Arc<ShardManager>>>,
}

impl DiscordChannel {
    /// Creates a new Discord channel adapter.
    ///
    /// Requires `config.token` to be set.
    pub fn new(
        config: DiscordConfig,
        ledger: Arc<LedgerService>,
        community: &str,
    ) -> Result<Self, GuildXpError> {
        let token = config
            .token
            .as_deref()
            .ok_or_else(|| {
                GuildXpError::Config("discord.token is required for the Discord adapter".into())
            })?
            .trim()
            .to_string();
        if token.is_empty() {
            return Err(GuildXpError::Config("discord.token cannot be empty".into()));
        }

        Ok(Self {
            http: Arc::new(Http::new(&token)),
            token,
            router: Arc::new(Router::new(ledger, config, community)),
            shard_manager: tokio::sync::Mutex::new(None),
        })
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Connect to the gateway and process events until the client stops.
    pub async fn run(&self) -> Result<(), GuildXpError> {
        let intents = GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
            | GatewayIntents::GUILD_MESSAGE_REACTIONS;
        let mut client = Client::builder(&self.token, intents)
            .event_handler(Handler {
                router: self.router.clone(),
            })
            .await
            .map_err(|e| channel_error("failed to build Discord client", e))?;

        *self.shard_manager.lock().await = Some(client.shard_manager.clone());
        info!("connecting to the Discord gateway");
        client
            .start()
            .await
            .map_err(|e| channel_error("Discord gateway stopped", e))
    }

    /// Send `text` to a channel.
    pub async fn send(&self, channel_id: u64, text: &str) -> Result<(), GuildXpError> {
        ChannelId::new(channel_id)
            .say(&self.http, text)
            .await
            .map_err(|e| channel_error(format!("failed to send to channel {channel_id}"), e))?;
        Ok(())
    }

    /// Pick a quest of `cadence` and post it to that cadence's channel.
    pub async fn post_quest(&self, cadence: QuestCadence) -> Result<(), GuildXpError> {
        let config = self.router.config();
        let channel_id = match cadence {
            QuestCadence::Daily => config.daily_quest_channel_id,
            QuestCadence::Weekly => config.weekly_quest_channel_id,
        }
        .ok_or_else(|| {
            GuildXpError::Config(format!("discord.{cadence}_quest_channel_id is not set"))
        })?;

        let ledger = self.router.ledger();
        let quest = ledger.pick_quest(cadence).await?;
        let text = render::quest_announcement(&quest, ledger.quest_xp(cadence), &config.approval_emoji);
        self.send(channel_id, &text).await?;
        info!(%cadence, quest = %quest.id, channel_id, "quest posted");
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, GuildXpError> {
        match self.http.get_current_user().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("Discord unreachable: {e}"))),
        }
    }

    async fn shutdown(&self) -> Result<(), GuildXpError> {
        debug!("Discord channel shutting down");
        if let Some(manager) = self.shard_manager.lock().await.take() {
            manager.shutdown_all().await;
        }
        Ok(())
    }
}

struct Handler {
    router: Arc<Router>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "Discord gateway ready");
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let inbound = InboundText {
            message_id: msg.id.to_string(),
            channel_id: msg.channel_id.get(),
            author_id: msg.author.id.to_string(),
            author_roles: msg
                .member
                .as_ref()
                .map(|m| m.roles.iter().map(|r| r.to_string()).collect())
                .unwrap_or_default(),
            author_is_bot: msg.author.bot,
            content: msg.content.clone(),
        };
        if let Some(reply) = self.router.on_text(&inbound).await
            && let Err(e) = msg.channel_id.say(&ctx.http, reply).await
        {
            warn!(error = %e, channel_id = inbound.channel_id, "failed to send reply");
        }
    }

    async fn reaction_add(&self, ctx: Context, reaction: Reaction) {
        let ReactionType::Unicode(emoji) = &reaction.emoji else {
            return;
        };
        let Some(reactor) = reaction.user_id else {
            return;
        };
        let config = self.router.config();
        let channel_id = reaction.channel_id.get();
        if handler::quest_cadence_for_channel(channel_id, config).is_none()
            || !handler::is_approval_emoji(emoji, config)
        {
            return;
        }

        let message = match reaction.message(&ctx).await {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, message_id = %reaction.message_id, "could not fetch reacted message");
                return;
            }
        };
        let inbound = InboundReaction {
            channel_id,
            emoji: emoji.clone(),
            reactor_id: reactor.to_string(),
            reactor_roles: reaction
                .member
                .as_ref()
                .map(|m| m.roles.iter().map(|r| r.to_string()).collect())
                .unwrap_or_default(),
            message_id: message.id.to_string(),
            author_id: message.author.id.to_string(),
            author_is_bot: message.author.bot,
        };
        if let Some(reply) = self.router.on_reaction(&inbound).await
            && let Err(e) = message.reply(&ctx, reply).await
        {
            warn!(error = %e, channel_id, "failed to send approval reply");
        }
    }
}
