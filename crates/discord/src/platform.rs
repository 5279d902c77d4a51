use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use {
    async_trait::async_trait,
    serenity::{
        all::{ChannelId as DiscordChannelId, GuildId, Message, MessageId as DiscordMessageId},
        http::Http,
    },
    tracing::{debug, warn},
};

use mirror_channels::{
    Attachment, ChannelId, ChatPlatform, Emoji, InboundMessage, MessageId, OutboundFile, RoleId,
};

use crate::{
    convert::{self, RoleNames},
    error::{Error, Result},
};

/// REST-backed [`ChatPlatform`] acting as the bot user.
pub struct DiscordPlatform {
    http: Arc<Http>,
    client: reqwest::Client,
    /// channel -> guild, filled lazily for role lookups.
    guilds: RwLock<HashMap<ChannelId, GuildId>>,
}

impl DiscordPlatform {
    pub fn new(http: Arc<Http>) -> Self {
        Self {
            http,
            client: reqwest::Client::new(),
            guilds: RwLock::new(HashMap::new()),
        }
    }

    /// Convert a serenity message, resolving mentioned role names.
    pub async fn inbound_from(&self, msg: &Message) -> InboundMessage {
        let roles = if msg.mention_roles.is_empty() {
            RoleNames::new()
        } else {
            self.role_names(ChannelId(msg.channel_id.get()), msg.guild_id)
                .await
        };
        convert::inbound_message(msg, &roles)
    }

    async fn guild_of(&self, channel_id: ChannelId, hint: Option<GuildId>) -> Option<GuildId> {
        if let Some(guild_id) = hint {
            self.remember_guild(channel_id, guild_id);
            return Some(guild_id);
        }
        let cached = self
            .guilds
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&channel_id)
            .copied();
        if cached.is_some() {
            return cached;
        }

        match self.http.get_channel(discord_channel(channel_id)).await {
            Ok(channel) => {
                let guild_id = channel.guild()?.guild_id;
                self.remember_guild(channel_id, guild_id);
                Some(guild_id)
            },
            Err(e) => {
                warn!(%channel_id, error = %e, "failed to look up channel guild");
                None
            },
        }
    }

    fn remember_guild(&self, channel_id: ChannelId, guild_id: GuildId) {
        self.guilds
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(channel_id, guild_id);
    }

    async fn role_names(&self, channel_id: ChannelId, hint: Option<GuildId>) -> RoleNames {
        let Some(guild_id) = self.guild_of(channel_id, hint).await else {
            return RoleNames::new();
        };
        match self.http.get_guild_roles(guild_id).await {
            Ok(roles) => roles
                .into_iter()
                .map(|r| (RoleId(r.id.get()), r.name))
                .collect(),
            Err(e) => {
                warn!(%channel_id, guild_id = guild_id.get(), error = %e, "failed to fetch guild roles");
                RoleNames::new()
            },
        }
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

fn discord_channel(id: ChannelId) -> DiscordChannelId {
    DiscordChannelId::new(id.get())
}

fn discord_message(id: MessageId) -> DiscordMessageId {
    DiscordMessageId::new(id.get())
}

#[async_trait]
impl ChatPlatform for DiscordPlatform {
    async fn fetch_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> mirror_channels::Result<InboundMessage> {
        let msg = self
            .http
            .get_message(discord_channel(channel_id), discord_message(message_id))
            .await
            .map_err(|e| {
                Error::from(e)
                    .into_channel_error(&format!("message {message_id} in channel {channel_id}"))
            })?;
        Ok(self.inbound_from(&msg).await)
    }

    async fn download_attachment(
        &self,
        attachment: &Attachment,
    ) -> mirror_channels::Result<OutboundFile> {
        let data = self
            .download(&attachment.url)
            .await
            .map_err(|e| e.into_channel_error(&format!("attachment {}", attachment.filename)))?;
        debug!(filename = %attachment.filename, bytes = data.len(), "downloaded attachment");
        Ok(OutboundFile {
            filename: attachment.filename.clone(),
            data,
        })
    }

    async fn add_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &Emoji,
    ) -> mirror_channels::Result<()> {
        self.http
            .create_reaction(
                discord_channel(channel_id),
                discord_message(message_id),
                &convert::reaction_type(emoji),
            )
            .await
            .map_err(|e| Error::from(e).into_channel_error(&format!("react {emoji} on {message_id}")))
    }

    async fn remove_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &Emoji,
    ) -> mirror_channels::Result<()> {
        self.http
            .delete_reaction_me(
                discord_channel(channel_id),
                discord_message(message_id),
                &convert::reaction_type(emoji),
            )
            .await
            .map_err(|e| {
                Error::from(e).into_channel_error(&format!("unreact {emoji} on {message_id}"))
            })
    }
}
