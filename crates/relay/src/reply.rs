//! Quote context for relayed replies.
//!
//! A reply cannot be relayed as a native reply (the referenced message lives
//! in another channel), so it is rendered as a short preamble:
//!
//! ```text
//! Replying to <@42>
//! > the first 75 characters of the quoted message...
//! ```
//!
//! When the quoted message is itself a mirror, the resolver hops through the
//! correlation map to the original so the mention goes to the real author
//! rather than to the webhook that posted the copy.

use {
    mirror_channels::{Author, ChannelId, ChatPlatform, InboundMessage, MessageId},
    tracing::{debug, warn},
};

use crate::{routes::RelayRoutes, store::CorrelationStore};

/// First line of every rendered preamble.
pub const REPLY_MARKER: &str = "Replying to";

const QUOTE_PREFIX: &str = "> ";

/// Quoted text longer than this many characters is cut.
pub const MAX_QUOTE_CHARS: usize = 75;

const ELLIPSIS: &str = "...";

/// Resolved author and text of the message being replied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotedReply {
    pub author: Author,
    /// True when `author` is still a webhook identity (the hop to the
    /// original failed), which cannot be pinged.
    pub via_webhook: bool,
    pub quoted_text: String,
}

impl QuotedReply {
    pub fn mention(&self) -> String {
        if self.via_webhook {
            format!("@{}", self.author.display_name)
        } else {
            self.author.mention()
        }
    }

    /// Render the preamble, newline-terminated, ready to prepend.
    pub fn preamble(&self) -> String {
        let mut out = format!("{REPLY_MARKER} {}\n", self.mention());
        for line in self.quoted_text.split('\n') {
            out.push_str(QUOTE_PREFIX);
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Drop a leading reply preamble (marker line plus its quote lines) so that
/// quoting an already-quoted message does not nest preambles.
///
/// Repeats until no preamble is left, which makes it idempotent.
pub fn strip_reply_preamble(text: &str) -> &str {
    let mut rest = text;
    while rest.starts_with(REPLY_MARKER) {
        let Some((_, after)) = rest.split_once('\n') else {
            break;
        };
        rest = after;
        while rest.starts_with(QUOTE_PREFIX) {
            rest = rest.split_once('\n').map_or("", |(_, after)| after);
        }
    }
    rest
}

/// Cut `text` to [`MAX_QUOTE_CHARS`] characters, trimming trailing
/// whitespace and appending an ellipsis when anything was removed.
pub fn truncate_quote(text: &str) -> String {
    match text.char_indices().nth(MAX_QUOTE_CHARS) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", text[..cut].trim_end()),
        None => text.to_string(),
    }
}

/// Resolves reply targets against the live channels and the correlation map.
pub struct ReplyResolver<'a> {
    platform: &'a dyn ChatPlatform,
    store: &'a CorrelationStore,
    routes: &'a RelayRoutes,
}

impl<'a> ReplyResolver<'a> {
    pub fn new(
        platform: &'a dyn ChatPlatform,
        store: &'a CorrelationStore,
        routes: &'a RelayRoutes,
    ) -> Self {
        Self {
            platform,
            store,
            routes,
        }
    }

    /// Fetch and resolve the message `reply_to` in `source_channel`.
    ///
    /// Returns `None` when the target cannot be fetched; the caller then
    /// relays without a preamble. Failures never propagate.
    pub async fn resolve(
        &self,
        source_channel: ChannelId,
        reply_to: MessageId,
    ) -> Option<QuotedReply> {
        match self.platform.fetch_message(source_channel, reply_to).await {
            Ok(target) => Some(self.resolve_target(target, source_channel).await),
            Err(e) if e.is_not_found() => {
                debug!(
                    channel_id = %source_channel,
                    message_id = %reply_to,
                    "reply target is gone, relaying without quote"
                );
                None
            },
            Err(e) => {
                warn!(
                    channel_id = %source_channel,
                    message_id = %reply_to,
                    error = %e,
                    "failed to fetch reply target, relaying without quote"
                );
                None
            },
        }
    }

    /// Resolve an already-fetched reply target, hopping to the original when
    /// the target is a mirror.
    pub async fn resolve_target(
        &self,
        target: InboundMessage,
        source_channel: ChannelId,
    ) -> QuotedReply {
        let mut author = target.author;
        let mut via_webhook = target.webhook_id.is_some();
        let mut text = target.content;

        if let Some(peer) = self.store.get(target.id) {
            match self.routes.partner(source_channel) {
                Some(partner) => match self.platform.fetch_message(partner, peer).await {
                    Ok(original) => {
                        author = original.author;
                        via_webhook = original.webhook_id.is_some();
                        text = original.content;
                    },
                    Err(e) if e.is_not_found() => {
                        debug!(
                            channel_id = %partner,
                            message_id = %peer,
                            "original of quoted mirror is gone, quoting the mirror"
                        );
                    },
                    Err(e) => {
                        warn!(
                            channel_id = %partner,
                            message_id = %peer,
                            error = %e,
                            "failed to fetch original of quoted mirror, quoting the mirror"
                        );
                    },
                },
                None => {
                    debug!(channel_id = %source_channel, "reply in a channel with no partner");
                },
            }
        }

        QuotedReply {
            author,
            via_webhook,
            quoted_text: truncate_quote(strip_reply_preamble(&text)),
        }
    }
}
