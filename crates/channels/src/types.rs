//! Platform-neutral message model.
//!
//! Adapters convert their SDK types into these before handing events to the
//! relay, and convert [`OutboundMessage`] / [`MessageEdit`] back on the way out.

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// A text channel.
    ChannelId
);
id_type!(
    /// A message within a channel.
    MessageId
);
id_type!(
    /// A user or bot account.
    UserId
);
id_type!(
    /// Identity of an outbound relay endpoint (a webhook id on Discord).
    EndpointId
);
id_type!(
    /// A guild role.
    RoleId
);

/// Who wrote a message, as needed to impersonate or mention them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: UserId,
    /// Nickname, global name or username, whichever is most specific.
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub bot: bool,
}

impl Author {
    /// Platform mention token for this author.
    #[must_use]
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
}

impl Role {
    /// Platform role-mention token (`<@&id>`).
    #[must_use]
    pub fn mention(&self) -> String {
        format!("<@&{}>", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sticker {
    pub id: u64,
    pub name: String,
    pub url: String,
}

/// A file attached to an inbound message. Only the remote location is known
/// until it is downloaded for re-upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub url: String,
    pub content_type: Option<String>,
}

/// Embeds are passed through untouched, so they stay in the platform's own
/// JSON shape.
pub type Embed = serde_json::Value;

/// A message as observed on (or fetched from) a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub author: Author,
    /// Set when the message was posted through a webhook.
    pub webhook_id: Option<EndpointId>,
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub embeds: Vec<Embed>,
    #[serde(default)]
    pub stickers: Vec<Sticker>,
    #[serde(default)]
    pub role_mentions: Vec<Role>,
    /// Id of the message this one replies to, in the same channel.
    pub reply_to: Option<MessageId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Emoji {
    Unicode(String),
    Custom {
        id: u64,
        name: Option<String>,
        animated: bool,
    },
}

impl std::fmt::Display for Emoji {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unicode(s) => f.write_str(s),
            Self::Custom { id, name, animated } => {
                let prefix = if *animated {
                    "a"
                } else {
                    ""
                };
                write!(f, "<{prefix}:{}:{id}>", name.as_deref().unwrap_or_default())
            },
        }
    }
}

/// A reaction being added to or removed from a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionEvent {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub emoji: Emoji,
    pub user_id: Option<UserId>,
    /// Whether the reacting account is a bot, when the platform tells us.
    pub actor_is_bot: bool,
}

/// Which mention kinds the destination may ping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedMentions {
    pub users: bool,
    pub roles: bool,
    pub everyone: bool,
}

impl AllowedMentions {
    /// Users only. Roles are never portable across guilds and `@everyone`
    /// must not be amplified by a relay.
    #[must_use]
    pub const fn users_only() -> Self {
        Self {
            users: true,
            roles: false,
            everyone: false,
        }
    }
}

/// A downloaded attachment ready for re-upload.
#[derive(Clone, PartialEq, Eq)]
pub struct OutboundFile {
    pub filename: String,
    pub data: Vec<u8>,
}

impl std::fmt::Debug for OutboundFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboundFile")
            .field("filename", &self.filename)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Everything an endpoint needs to post a mirrored message.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub content: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub files: Vec<OutboundFile>,
    pub embeds: Vec<Embed>,
    pub allowed_mentions: AllowedMentions,
}

/// Replacement content for an already-mirrored message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEdit {
    pub content: String,
    pub embeds: Vec<Embed>,
}
