//! Rewriting a message for its destination channel.

use mirror_channels::{
    AllowedMentions, ChatPlatform, InboundMessage, MessageEdit, OutboundMessage,
};

use crate::{error::Result, reply::QuotedReply};

/// Build the text that is posted on the destination channel.
///
/// The reply preamble goes first, sticker images are appended as links (the
/// destination cannot render stickers it does not own), and role mention
/// tokens become plain `@Role` text since role ids mean nothing in another
/// guild.
pub fn render_content(message: &InboundMessage, reply: Option<&QuotedReply>) -> String {
    let mut content = match reply {
        Some(reply) => reply.preamble() + &message.content,
        None => message.content.clone(),
    };

    if !message.stickers.is_empty() {
        let urls: Vec<&str> = message.stickers.iter().map(|s| s.url.as_str()).collect();
        content = format!("{content}\n{}", urls.join(" ")).trim().to_string();
    }

    for role in &message.role_mentions {
        content = content.replace(&role.mention(), &format!("@{}", role.name));
    }

    content
}

/// Build the full outbound post, downloading every attachment for
/// re-upload. A failed download fails the whole post.
pub async fn build_outbound(
    platform: &dyn ChatPlatform,
    message: &InboundMessage,
    reply: Option<&QuotedReply>,
) -> Result<OutboundMessage> {
    let mut files = Vec::with_capacity(message.attachments.len());
    for attachment in &message.attachments {
        files.push(platform.download_attachment(attachment).await?);
    }

    Ok(OutboundMessage {
        content: render_content(message, reply),
        display_name: message.author.display_name.clone(),
        avatar_url: message.author.avatar_url.clone(),
        files,
        embeds: message.embeds.clone(),
        allowed_mentions: AllowedMentions::users_only(),
    })
}

/// Build the edit applied to an existing mirror. Attachments cannot change
/// after posting, so only text and embeds are carried.
pub fn build_edit(message: &InboundMessage, reply: Option<&QuotedReply>) -> MessageEdit {
    MessageEdit {
        content: render_content(message, reply),
        embeds: message.embeds.clone(),
    }
}
