use async_trait::async_trait;

use crate::{
    Result,
    types::{
        Attachment, ChannelId, Emoji, EndpointId, InboundMessage, MessageEdit, MessageId,
        OutboundFile, OutboundMessage,
    },
};

/// Read access to channels plus the reactions the bot applies as itself.
///
/// Implementations map a missing message or channel to
/// [`Error::NotFound`](crate::Error::NotFound) so callers can degrade instead
/// of failing.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Fetch the current state of a message.
    async fn fetch_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<InboundMessage>;

    /// Download an attachment so it can be re-uploaded elsewhere.
    async fn download_attachment(&self, attachment: &Attachment) -> Result<OutboundFile>;

    /// React to a message as the bot.
    async fn add_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &Emoji,
    ) -> Result<()>;

    /// Remove the bot's own reaction from a message.
    async fn remove_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &Emoji,
    ) -> Result<()>;
}

/// An outbound endpoint that posts into one channel under an arbitrary
/// display name and avatar, and can later edit or delete what it posted.
#[async_trait]
pub trait RelayEndpoint: Send + Sync {
    /// Identity the platform stamps on messages this endpoint posts.
    fn identity(&self) -> EndpointId;

    /// Post a message and return the id the platform assigned to it.
    async fn send(&self, message: OutboundMessage) -> Result<MessageId>;

    async fn edit(&self, message_id: MessageId, edit: MessageEdit) -> Result<()>;

    async fn delete(&self, message_id: MessageId) -> Result<()>;
}
