//! Channel abstractions for the mirror relay.
//!
//! The relay engine never talks to a chat SDK directly. Adapters (Discord
//! today) implement [`ChatPlatform`] for reads and reactions and
//! [`RelayEndpoint`] for impersonated posts, and translate their native
//! message types into the neutral model in [`types`].

pub mod error;
pub mod plugin;
pub mod types;

pub use {
    error::{Error, Result},
    plugin::{ChatPlatform, RelayEndpoint},
    types::{
        AllowedMentions, Attachment, Author, ChannelId, Embed, Emoji, EndpointId, InboundMessage,
        MessageEdit, MessageId, OutboundFile, OutboundMessage, ReactionEvent, Role, RoleId,
        Sticker, UserId,
    },
};
