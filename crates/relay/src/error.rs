use mirror_channels::{ChannelId, MessageId};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Channel(#[from] mirror_channels::Error),

    /// A correlation `put` named an id that is already paired.
    #[error("message {id} is already correlated with {existing}")]
    AlreadyCorrelated { id: MessageId, existing: MessageId },

    /// Route configuration is inconsistent.
    #[error("invalid relay route for channel {channel_id}: {message}")]
    InvalidRoute {
        channel_id: ChannelId,
        message: String,
    },
}

impl Error {
    #[must_use]
    pub fn invalid_route(channel_id: ChannelId, message: impl Into<String>) -> Self {
        Self::InvalidRoute {
            channel_id,
            message: message.into(),
        }
    }

    /// See [`mirror_channels::Error::is_not_found`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Channel(e) if e.is_not_found())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
