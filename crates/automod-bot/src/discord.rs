//! Discord gateway glue
//!
//! Converts gateway events into moderation calls and implements
//! [`ModerationTarget`] over the Discord HTTP API.

use crate::commands;
use crate::moderator::Moderator;
use async_trait::async_trait;
use automod_core::{Error, InboundMessage, Result};
use automod_policy::{GroupConfigStore, ModerationTarget};
use serenity::all::{
    ActivityData, ChannelId, Command, Context, EventHandler, Http, Interaction, Message,
    MessageId, ReactionType, Ready,
};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Gateway event handler
pub struct Handler {
    moderator: Moderator,
    store: Arc<GroupConfigStore>,
}

impl Handler {
    pub fn new(moderator: Moderator, store: Arc<GroupConfigStore>) -> Self {
        Self { moderator, store }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, "Logged in");

        ctx.set_activity(Some(ActivityData::playing("AI AutoMod")));

        match Command::set_global_commands(&ctx.http, vec![commands::register()]).await {
            Ok(registered) => info!(count = registered.len(), "Slash commands synced"),
            Err(e) => error!(error = %e, "Failed to sync slash commands"),
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let (guild_name, channel_name) = match msg.guild(&ctx.cache) {
            Some(guild) => (
                Some(guild.name.clone()),
                guild.channels.get(&msg.channel_id).map(|c| c.name.clone()),
            ),
            None => (None, None),
        };
        debug!(
            "{}",
            log_line(
                guild_name.as_deref(),
                channel_name.as_deref(),
                &msg.author.name,
                &msg.content
            )
        );

        let inbound = inbound_message(&msg);
        let target = DiscordTarget::new(ctx.http.clone());
        self.moderator.moderate(&target, &inbound).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            if command.data.name == commands::NAME {
                commands::run(&ctx, &command, &self.store).await;
            }
        }
    }
}

/// Moderation effects carried out through the Discord HTTP API
pub struct DiscordTarget {
    http: Arc<Http>,
}

impl DiscordTarget {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ModerationTarget for DiscordTarget {
    async fn delete_message(&self, message: &InboundMessage) -> Result<()> {
        ChannelId::new(message.channel_id)
            .delete_message(&self.http, MessageId::new(message.id))
            .await
            .map_err(|e| Error::platform(format!("delete failed: {}", e)))
    }

    async fn send_notice(&self, message: &InboundMessage, text: &str) -> Result<()> {
        ChannelId::new(message.channel_id)
            .say(&self.http, text)
            .await
            .map(|_| ())
            .map_err(|e| Error::platform(format!("send failed: {}", e)))
    }

    async fn react(&self, message: &InboundMessage, emoji: &str) -> Result<()> {
        ChannelId::new(message.channel_id)
            .create_reaction(
                &self.http,
                MessageId::new(message.id),
                ReactionType::Unicode(emoji.to_string()),
            )
            .await
            .map(|_| ())
            .map_err(|e| Error::platform(format!("reaction failed: {}", e)))
    }
}

/// Platform-neutral view of a gateway message
pub fn inbound_message(msg: &Message) -> InboundMessage {
    InboundMessage {
        id: msg.id.get(),
        channel_id: msg.channel_id.get(),
        group_id: msg.guild_id.map(|id| id.get()),
        author_id: msg.author.id.get(),
        author_name: msg.author.name.clone(),
        author_is_bot: msg.author.bot,
        content: msg.content.clone(),
    }
}

/// `[MSG] guild #channel <author>: content`, with "DM" outside servers
fn log_line(guild: Option<&str>, channel: Option<&str>, author: &str, content: &str) -> String {
    format!(
        "[MSG] {} #{} <{}>: {}",
        guild.unwrap_or("DM"),
        channel.unwrap_or("DM"),
        author,
        content
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_line_in_server() {
        assert_eq!(
            log_line(Some("Rustaceans"), Some("general"), "ferris", "hello"),
            "[MSG] Rustaceans #general <ferris>: hello"
        );
    }

    #[test]
    fn test_log_line_in_direct_message() {
        assert_eq!(log_line(None, None, "ferris", "hi"), "[MSG] DM #DM <ferris>: hi");
    }
}
