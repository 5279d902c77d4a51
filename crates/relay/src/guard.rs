use std::collections::HashSet;

use mirror_channels::{EndpointId, InboundMessage, UserId};

/// Recognises messages produced by the relay itself.
///
/// Every mirrored post arrives back as an ordinary message on the partner
/// channel; without this check it would be relayed again, forever. The
/// identity set is fixed at start-up from the configured endpoints.
#[derive(Debug, Clone)]
pub struct LoopGuard {
    bot_user_id: UserId,
    relay_identities: HashSet<EndpointId>,
}

impl LoopGuard {
    pub fn new(bot_user_id: UserId, relay_identities: HashSet<EndpointId>) -> Self {
        Self {
            bot_user_id,
            relay_identities,
        }
    }

    pub fn tracked_identities(&self) -> usize {
        self.relay_identities.len()
    }

    /// True when the message was posted by one of our endpoints or by the
    /// bot account.
    pub fn is_echo(&self, message: &InboundMessage) -> bool {
        self.is_echo_origin(message.webhook_id, message.author.id)
    }

    /// Same check on the bare origin ids, for callers that have not built an
    /// [`InboundMessage`] yet.
    pub fn is_echo_origin(&self, webhook_id: Option<EndpointId>, author_id: UserId) -> bool {
        webhook_id.is_some_and(|id| self.relay_identities.contains(&id)) || self.is_self(author_id)
    }

    pub fn is_self(&self, user_id: UserId) -> bool {
        user_id == self.bot_user_id
    }
}
