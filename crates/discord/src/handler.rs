//! Discord event handler for serenity.
//!
//! Translates gateway events into [`RelayEvent`]s and hands them to the
//! shared [`Relay`].

use std::sync::Arc;

use {
    serenity::{
        all::{
            ChannelId, Context, EventHandler, GatewayIntents, GuildId, Message, MessageId,
            MessageUpdateEvent, Reaction, Ready,
        },
        async_trait,
    },
    tracing::{debug, info},
};

use {
    mirror_channels::{ChannelId as RelayChannelId, MessageId as RelayMessageId},
    mirror_relay::{Outcome, Relay, RelayEvent},
};

use crate::{convert, platform::DiscordPlatform};

/// Handler for Discord gateway events.
pub struct RelayHandler {
    relay: Arc<Relay>,
    platform: Arc<DiscordPlatform>,
}

impl RelayHandler {
    pub fn new(relay: Arc<Relay>, platform: Arc<DiscordPlatform>) -> Self {
        Self { relay, platform }
    }

    /// Required gateway intents for the bot.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::GUILD_MESSAGE_REACTIONS
            | GatewayIntents::MESSAGE_CONTENT
    }

    /// Cheap pre-filter so unrelated channels never reach the REST API.
    fn watches(&self, channel_id: ChannelId) -> bool {
        self.relay
            .routes()
            .is_relay_channel(RelayChannelId(channel_id.get()))
    }

    /// Echo check on the raw message, before conversion can reach the REST
    /// API for role names.
    fn is_echo(&self, msg: &Message) -> bool {
        let (webhook_id, author_id) = convert::origin(msg);
        self.relay.guard().is_echo_origin(webhook_id, author_id)
    }

    async fn dispatch(&self, event: RelayEvent) {
        let outcome = self.relay.handle(event).await;
        if let Outcome::Ignored(reason) = &outcome {
            debug!(?reason, "event ignored");
        }
    }
}

#[async_trait]
impl EventHandler for RelayHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            bot_name = %ready.user.name,
            bot_id = ready.user.id.get(),
            guilds = ready.guilds.len(),
            relay_channels = self.relay.routes().channels().len(),
            "discord bot ready"
        );
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        if !self.watches(msg.channel_id) {
            return;
        }
        if self.is_echo(&msg) {
            debug!(message_id = msg.id.get(), "relay echo dropped");
            return;
        }
        let inbound = self.platform.inbound_from(&msg).await;
        self.dispatch(RelayEvent::MessageCreated(inbound)).await;
    }

    async fn message_update(
        &self,
        _ctx: Context,
        _old_if_available: Option<Message>,
        _new: Option<Message>,
        event: MessageUpdateEvent,
    ) {
        if !self.watches(event.channel_id) {
            return;
        }
        self.dispatch(RelayEvent::MessageEdited {
            channel_id: RelayChannelId(event.channel_id.get()),
            message_id: RelayMessageId(event.id.get()),
        })
        .await;
    }

    async fn message_delete(
        &self,
        _ctx: Context,
        channel_id: ChannelId,
        deleted_message_id: MessageId,
        _guild_id: Option<GuildId>,
    ) {
        if !self.watches(channel_id) {
            return;
        }
        self.dispatch(RelayEvent::MessageDeleted {
            channel_id: RelayChannelId(channel_id.get()),
            message_id: RelayMessageId(deleted_message_id.get()),
        })
        .await;
    }

    async fn reaction_add(&self, _ctx: Context, reaction: Reaction) {
        if !self.watches(reaction.channel_id) {
            return;
        }
        match convert::reaction_event(&reaction) {
            Some(event) => self.dispatch(RelayEvent::ReactionAdded(event)).await,
            None => debug!(message_id = reaction.message_id.get(), "unsupported emoji kind"),
        }
    }

    async fn reaction_remove(&self, _ctx: Context, reaction: Reaction) {
        if !self.watches(reaction.channel_id) {
            return;
        }
        match convert::reaction_event(&reaction) {
            Some(event) => self.dispatch(RelayEvent::ReactionRemoved(event)).await,
            None => debug!(message_id = reaction.message_id.get(), "unsupported emoji kind"),
        }
    }
}
