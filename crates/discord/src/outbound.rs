use std::sync::Arc;

use {
    async_trait::async_trait,
    serenity::{
        all::{
            CreateAllowedMentions, CreateAttachment, CreateEmbed, EditWebhookMessage, Embed,
            ExecuteWebhook, MessageId as DiscordMessageId, Webhook,
        },
        http::Http,
    },
    tracing::{debug, warn},
};

use mirror_channels::{
    AllowedMentions, EndpointId, MessageEdit, MessageId, OutboundMessage, RelayEndpoint,
    types::Embed as RawEmbed,
};

use crate::error::{Error, Result};

/// Discord's cap on message content.
pub const MAX_CONTENT_CHARS: usize = 2000;

/// Discord's cap on a webhook display name.
pub const MAX_USERNAME_CHARS: usize = 80;

/// Posts into one channel through a webhook, under each author's name and
/// avatar.
pub struct WebhookEndpoint {
    identity: EndpointId,
    webhook: Webhook,
    http: Arc<Http>,
}

impl WebhookEndpoint {
    /// Resolve the webhook behind `url`. Fails when the URL is malformed or
    /// Discord does not know the webhook.
    pub async fn connect(http: Arc<Http>, url: &str) -> Result<Self> {
        let id = mirror_config::webhook_id_from_url(url)
            .ok_or_else(|| Error::message("not a webhook URL"))?;
        let webhook = Webhook::from_url(&*http, url).await?;
        debug!(
            webhook_id = id,
            channel_id = ?webhook.channel_id.map(|c| c.get()),
            name = ?webhook.name,
            "webhook endpoint ready"
        );
        Ok(Self {
            identity: EndpointId(id),
            webhook,
            http,
        })
    }

    /// Channel the webhook posts into, as reported by Discord.
    pub fn channel_id(&self) -> Option<u64> {
        self.webhook.channel_id.map(|c| c.get())
    }

    async fn execute(&self, message: OutboundMessage) -> Result<MessageId> {
        let files = message
            .files
            .into_iter()
            .map(|f| CreateAttachment::bytes(f.data, f.filename))
            .collect::<Vec<_>>();

        let builder = ExecuteWebhook::new()
            .content(clamp(&message.content, MAX_CONTENT_CHARS))
            .username(webhook_username(&message.display_name))
            .embeds(embeds(&message.embeds))
            .add_files(files)
            .allowed_mentions(allowed_mentions(message.allowed_mentions));
        let builder = match message.avatar_url {
            Some(url) => builder.avatar_url(url),
            None => builder,
        };

        let posted = self
            .webhook
            .execute(&*self.http, true, builder)
            .await?
            .ok_or_else(|| Error::message("webhook returned no message"))?;
        Ok(MessageId(posted.id.get()))
    }
}

#[async_trait]
impl RelayEndpoint for WebhookEndpoint {
    fn identity(&self) -> EndpointId {
        self.identity
    }

    async fn send(&self, message: OutboundMessage) -> mirror_channels::Result<MessageId> {
        self.execute(message)
            .await
            .map_err(|e| e.into_channel_error(&format!("send via webhook {}", self.identity)))
    }

    async fn edit(&self, message_id: MessageId, edit: MessageEdit) -> mirror_channels::Result<()> {
        let builder = EditWebhookMessage::new()
            .content(clamp(&edit.content, MAX_CONTENT_CHARS))
            .embeds(embeds(&edit.embeds));
        self.webhook
            .edit_message(&*self.http, DiscordMessageId::new(message_id.get()), builder)
            .await
            .map(|_| ())
            .map_err(|e| {
                Error::from(e).into_channel_error(&format!(
                    "edit {message_id} via webhook {}",
                    self.identity
                ))
            })
    }

    async fn delete(&self, message_id: MessageId) -> mirror_channels::Result<()> {
        self.webhook
            .delete_message(&*self.http, None, DiscordMessageId::new(message_id.get()))
            .await
            .map_err(|e| {
                Error::from(e).into_channel_error(&format!(
                    "delete {message_id} via webhook {}",
                    self.identity
                ))
            })
    }
}

fn allowed_mentions(allowed: AllowedMentions) -> CreateAllowedMentions {
    CreateAllowedMentions::new()
        .all_users(allowed.users)
        .all_roles(allowed.roles)
        .everyone(allowed.everyone)
}

/// Rebuild embeds from their JSON form. Embeds Discord itself would reject
/// are dropped.
fn embeds(raw: &[RawEmbed]) -> Vec<CreateEmbed> {
    raw.iter()
        .filter_map(|value| match serde_json::from_value::<Embed>(value.clone()) {
            Ok(embed) => Some(CreateEmbed::from(embed)),
            Err(e) => {
                warn!(error = %e, "dropping embed that does not deserialize");
                None
            },
        })
        .collect()
}

/// Cut `text` to at most `max` characters.
fn clamp(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}

/// Webhook names must be 1 to 80 characters.
fn webhook_username(name: &str) -> String {
    let name = clamp(name.trim(), MAX_USERNAME_CHARS);
    if name.is_empty() {
        "Unknown".to_string()
    } else {
        name
    }
}
