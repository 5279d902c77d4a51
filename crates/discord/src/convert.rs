//! Translation between serenity's model and the relay's neutral types.

use std::collections::HashMap;

use serenity::all::{EmojiId, Message, Reaction, ReactionType};

use mirror_channels::{
    Attachment, Author, ChannelId, EndpointId, Emoji, InboundMessage, MessageId, ReactionEvent,
    Role, RoleId, Sticker, UserId,
};

/// Role names of one guild, keyed by role id.
pub type RoleNames = HashMap<RoleId, String>;

/// Guild nickname, else global display name, else username.
pub fn display_name(msg: &Message) -> String {
    msg.member
        .as_ref()
        .and_then(|m| m.nick.clone())
        .or_else(|| msg.author.global_name.clone())
        .unwrap_or_else(|| msg.author.name.clone())
}

/// Webhook and author ids of a message, all the loop guard needs.
pub fn origin(msg: &Message) -> (Option<EndpointId>, UserId) {
    (
        msg.webhook_id.map(|id| EndpointId(id.get())),
        UserId(msg.author.id.get()),
    )
}

/// Convert a gateway or REST message.
///
/// Mentioned roles missing from `roles` are dropped, which leaves their raw
/// tokens in the relayed text.
pub fn inbound_message(msg: &Message, roles: &RoleNames) -> InboundMessage {
    let (webhook_id, author_id) = origin(msg);
    InboundMessage {
        id: MessageId(msg.id.get()),
        channel_id: ChannelId(msg.channel_id.get()),
        author: Author {
            id: author_id,
            display_name: display_name(msg),
            avatar_url: Some(msg.author.face()),
            bot: msg.author.bot,
        },
        webhook_id,
        content: msg.content.clone(),
        attachments: msg
            .attachments
            .iter()
            .map(|a| Attachment {
                filename: a.filename.clone(),
                url: a.url.clone(),
                content_type: a.content_type.clone(),
            })
            .collect(),
        embeds: msg
            .embeds
            .iter()
            .filter_map(|e| serde_json::to_value(e).ok())
            .collect(),
        stickers: msg
            .sticker_items
            .iter()
            .filter_map(|s| {
                s.image_url().map(|url| Sticker {
                    id: s.id.get(),
                    name: s.name.clone(),
                    url,
                })
            })
            .collect(),
        role_mentions: msg
            .mention_roles
            .iter()
            .filter_map(|id| {
                let id = RoleId(id.get());
                roles.get(&id).map(|name| Role {
                    id,
                    name: name.clone(),
                })
            })
            .collect(),
        reply_to: msg
            .message_reference
            .as_ref()
            .and_then(|r| r.message_id)
            .map(|id| MessageId(id.get())),
    }
}

pub fn emoji_from_reaction(reaction: &ReactionType) -> Option<Emoji> {
    match reaction {
        ReactionType::Unicode(s) => Some(Emoji::Unicode(s.clone())),
        ReactionType::Custom { animated, id, name } => Some(Emoji::Custom {
            id: id.get(),
            name: name.clone(),
            animated: *animated,
        }),
        _ => None,
    }
}

pub fn reaction_type(emoji: &Emoji) -> ReactionType {
    match emoji {
        Emoji::Unicode(s) => ReactionType::Unicode(s.clone()),
        Emoji::Custom { id, name, animated } => ReactionType::Custom {
            animated: *animated,
            id: EmojiId::new(*id),
            name: name.clone(),
        },
    }
}

/// `None` for emoji kinds the relay cannot replay.
pub fn reaction_event(reaction: &Reaction) -> Option<ReactionEvent> {
    Some(ReactionEvent {
        channel_id: ChannelId(reaction.channel_id.get()),
        message_id: MessageId(reaction.message_id.get()),
        emoji: emoji_from_reaction(&reaction.emoji)?,
        user_id: reaction.user_id.map(|id| UserId(id.get())),
        actor_is_bot: reaction.member.as_ref().is_some_and(|m| m.user.bot),
    })
}
