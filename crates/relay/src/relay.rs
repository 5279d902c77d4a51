//! Event handlers tying the guard, resolver, transformer and store together.
//!
//! Each handler is independent: the only state shared between invocations is
//! the correlation store. Handlers never return errors; every failure is
//! logged here and reported as [`Outcome::Failed`], because the event source
//! has no retry contract.

use std::sync::Arc;

use {
    mirror_channels::{
        ChannelId, ChatPlatform, InboundMessage, MessageId, ReactionEvent, UserId,
    },
    tracing::{debug, error, info, warn},
};

use crate::{
    error::Result,
    guard::LoopGuard,
    reply::{QuotedReply, ReplyResolver},
    routes::{RelayRoutes, Route},
    store::CorrelationStore,
    transform,
};

/// Inbound events the relay reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    MessageCreated(InboundMessage),
    /// Edits arrive as bare ids; the current content is refetched.
    MessageEdited {
        channel_id: ChannelId,
        message_id: MessageId,
    },
    MessageDeleted {
        channel_id: ChannelId,
        message_id: MessageId,
    },
    ReactionAdded(ReactionEvent),
    ReactionRemoved(ReactionEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Produced by one of our endpoints or the bot account.
    Echo,
    /// Channel is not part of any relay pair.
    NotRelayChannel,
    /// Message was never relayed (or predates this process).
    Uncorrelated,
    /// Create event for a message that already has a mirror.
    AlreadyRelayed,
    /// Reaction added by a bot account.
    BotReaction,
    /// The message vanished before it could be synced.
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Relayed {
        source: MessageId,
        mirror: MessageId,
    },
    Edited {
        mirror: MessageId,
    },
    Deleted {
        peer: MessageId,
    },
    Reacted {
        mirror: MessageId,
    },
    Unreacted {
        mirror: MessageId,
    },
    Ignored(IgnoreReason),
    Failed,
}

#[derive(Debug, Clone, Copy)]
enum ReactionAction {
    Add,
    Remove,
}

/// The relay engine. Built once at start-up and shared as `Arc<Relay>` by
/// every event handler.
pub struct Relay {
    platform: Arc<dyn ChatPlatform>,
    routes: RelayRoutes,
    guard: LoopGuard,
    store: CorrelationStore,
}

impl Relay {
    pub fn new(platform: Arc<dyn ChatPlatform>, routes: RelayRoutes, bot_user_id: UserId) -> Self {
        let guard = LoopGuard::new(bot_user_id, routes.identities());
        info!(
            pairs = routes.len(),
            relay_identities = guard.tracked_identities(),
            "relay initialised, tracking relay endpoints to prevent loops"
        );
        Self {
            platform,
            routes,
            guard,
            store: CorrelationStore::new(),
        }
    }

    pub fn store(&self) -> &CorrelationStore {
        &self.store
    }

    pub fn routes(&self) -> &RelayRoutes {
        &self.routes
    }

    pub fn guard(&self) -> &LoopGuard {
        &self.guard
    }

    pub async fn handle(&self, event: RelayEvent) -> Outcome {
        match event {
            RelayEvent::MessageCreated(message) => self.on_message_created(message).await,
            RelayEvent::MessageEdited {
                channel_id,
                message_id,
            } => self.on_message_edited(channel_id, message_id).await,
            RelayEvent::MessageDeleted {
                channel_id,
                message_id,
            } => self.on_message_deleted(channel_id, message_id).await,
            RelayEvent::ReactionAdded(reaction) => self.on_reaction_added(reaction).await,
            RelayEvent::ReactionRemoved(reaction) => self.on_reaction_removed(reaction).await,
        }
    }

    pub async fn on_message_created(&self, message: InboundMessage) -> Outcome {
        if self.guard.is_echo(&message) {
            return Outcome::Ignored(IgnoreReason::Echo);
        }
        let Some(route) = self.routes.get(message.channel_id) else {
            return Outcome::Ignored(IgnoreReason::NotRelayChannel);
        };
        if self.store.get(message.id).is_some() {
            debug!(message_id = %message.id, "message already relayed");
            return Outcome::Ignored(IgnoreReason::AlreadyRelayed);
        }

        match self.relay_new(&message, route).await {
            Ok(mirror) => {
                debug!(
                    channel_id = %message.channel_id,
                    message_id = %message.id,
                    mirror_id = %mirror,
                    partner = %route.partner,
                    "relayed message"
                );
                Outcome::Relayed {
                    source: message.id,
                    mirror,
                }
            },
            Err(e) => {
                error!(
                    channel_id = %message.channel_id,
                    message_id = %message.id,
                    error = %e,
                    "error relaying message"
                );
                Outcome::Failed
            },
        }
    }

    async fn relay_new(&self, message: &InboundMessage, route: &Route) -> Result<MessageId> {
        let reply = self.resolve_reply(message).await;
        let outbound =
            transform::build_outbound(self.platform.as_ref(), message, reply.as_ref()).await?;
        let mirror = route.endpoint.send(outbound).await?;
        // Only a confirmed send is recorded.
        self.store.put(message.id, mirror)?;
        Ok(mirror)
    }

    async fn resolve_reply(&self, message: &InboundMessage) -> Option<QuotedReply> {
        let reply_to = message.reply_to?;
        ReplyResolver::new(self.platform.as_ref(), &self.store, &self.routes)
            .resolve(message.channel_id, reply_to)
            .await
    }

    pub async fn on_message_edited(&self, channel_id: ChannelId, message_id: MessageId) -> Outcome {
        let Some(mirror) = self.store.get(message_id) else {
            return Outcome::Ignored(IgnoreReason::Uncorrelated);
        };
        let Some(route) = self.routes.get(channel_id) else {
            return Outcome::Ignored(IgnoreReason::NotRelayChannel);
        };

        match self.sync_edit(channel_id, message_id, mirror, route).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_not_found() => {
                debug!(
                    channel_id = %channel_id,
                    message_id = %message_id,
                    mirror_id = %mirror,
                    "edited message or its mirror is gone"
                );
                Outcome::Ignored(IgnoreReason::Missing)
            },
            Err(e) => {
                error!(
                    channel_id = %channel_id,
                    message_id = %message_id,
                    mirror_id = %mirror,
                    error = %e,
                    "error syncing edit"
                );
                Outcome::Failed
            },
        }
    }

    async fn sync_edit(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        mirror: MessageId,
        route: &Route,
    ) -> Result<Outcome> {
        let message = self.platform.fetch_message(channel_id, message_id).await?;
        // A webhook editing a mirror fires an edit event for the mirror too.
        if self.guard.is_echo(&message) {
            return Ok(Outcome::Ignored(IgnoreReason::Echo));
        }

        let reply = self.resolve_reply(&message).await;
        let edit = transform::build_edit(&message, reply.as_ref());
        route.endpoint.edit(mirror, edit).await?;
        debug!(
            channel_id = %channel_id,
            message_id = %message_id,
            mirror_id = %mirror,
            "synced edit"
        );
        Ok(Outcome::Edited { mirror })
    }

    pub async fn on_message_deleted(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Outcome {
        let Some(peer) = self.store.remove_pair(message_id) else {
            return Outcome::Ignored(IgnoreReason::Uncorrelated);
        };
        let Some(route) = self.routes.get(channel_id) else {
            warn!(
                channel_id = %channel_id,
                message_id = %message_id,
                "correlated message deleted outside any relay channel"
            );
            return Outcome::Ignored(IgnoreReason::NotRelayChannel);
        };

        match route.endpoint.delete(peer).await {
            Ok(()) => {
                debug!(
                    channel_id = %channel_id,
                    message_id = %message_id,
                    peer_id = %peer,
                    "synced delete"
                );
                Outcome::Deleted { peer }
            },
            Err(e) if e.is_not_found() => {
                debug!(peer_id = %peer, "peer already deleted");
                Outcome::Ignored(IgnoreReason::Missing)
            },
            Err(e) => {
                error!(
                    channel_id = %channel_id,
                    message_id = %message_id,
                    peer_id = %peer,
                    error = %e,
                    "error syncing delete"
                );
                Outcome::Failed
            },
        }
    }

    pub async fn on_reaction_added(&self, reaction: ReactionEvent) -> Outcome {
        if reaction.actor_is_bot || self.is_own_reaction(&reaction) {
            return Outcome::Ignored(IgnoreReason::BotReaction);
        }
        self.sync_reaction(reaction, ReactionAction::Add).await
    }

    pub async fn on_reaction_removed(&self, reaction: ReactionEvent) -> Outcome {
        // Our own removals on a mirror must not strip the reaction we
        // mirrored onto the original for somebody else.
        if self.is_own_reaction(&reaction) {
            return Outcome::Ignored(IgnoreReason::Echo);
        }
        self.sync_reaction(reaction, ReactionAction::Remove).await
    }

    fn is_own_reaction(&self, reaction: &ReactionEvent) -> bool {
        reaction.user_id.is_some_and(|id| self.guard.is_self(id))
    }

    async fn sync_reaction(&self, reaction: ReactionEvent, action: ReactionAction) -> Outcome {
        let Some(mirror) = self.store.get(reaction.message_id) else {
            return Outcome::Ignored(IgnoreReason::Uncorrelated);
        };
        let Some(partner) = self.routes.partner(reaction.channel_id) else {
            return Outcome::Ignored(IgnoreReason::NotRelayChannel);
        };

        match self.apply_reaction(&reaction, partner, mirror, action).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_not_found() => {
                debug!(
                    channel_id = %partner,
                    mirror_id = %mirror,
                    "mirror for reaction is gone"
                );
                Outcome::Ignored(IgnoreReason::Missing)
            },
            Err(e) => {
                error!(
                    channel_id = %partner,
                    mirror_id = %mirror,
                    emoji = %reaction.emoji,
                    error = %e,
                    "error syncing reaction {action:?}"
                );
                Outcome::Failed
            },
        }
    }

    async fn apply_reaction(
        &self,
        reaction: &ReactionEvent,
        partner: ChannelId,
        mirror: MessageId,
        action: ReactionAction,
    ) -> Result<Outcome> {
        let target = self.platform.fetch_message(partner, mirror).await?;
        match action {
            ReactionAction::Add => {
                self.platform
                    .add_reaction(partner, target.id, &reaction.emoji)
                    .await?;
                Ok(Outcome::Reacted { mirror })
            },
            ReactionAction::Remove => {
                self.platform
                    .remove_reaction(partner, target.id, &reaction.emoji)
                    .await?;
                Ok(Outcome::Unreacted { mirror })
            },
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        mirror_channels::{Emoji, EndpointId, Role, RoleId},
        serde_json::json,
    };

    use super::*;
    use crate::testing::{EndpointCall, MockEndpoint, MockPlatform, ReactionCall, message};

    const X: ChannelId = ChannelId(1);
    const Y: ChannelId = ChannelId(2);
    const BOT: UserId = UserId(1);

    /// Channel X posts into Y through endpoint 100, Y into X through 200.
    struct Harness {
        relay: Relay,
        platform: Arc<MockPlatform>,
        to_y: Arc<MockEndpoint>,
        to_x: Arc<MockEndpoint>,
    }

    fn harness() -> Harness {
        let platform = Arc::new(MockPlatform::default());
        let to_y = Arc::new(MockEndpoint::new(100));
        let to_x = Arc::new(MockEndpoint::new(200));
        let mut routes = RelayRoutes::new();
        routes
            .add_pair(X, to_y.clone(), Y, to_x.clone())
            .unwrap();
        let relay = Relay::new(platform.clone(), routes, BOT);
        Harness {
            relay,
            platform,
            to_y,
            to_x,
        }
    }

    fn sent(endpoint: &MockEndpoint) -> Vec<String> {
        endpoint
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                EndpointCall::Send(m) => Some(m.content),
                _ => None,
            })
            .collect()
    }

    /// Store the mirror on the platform as the endpoint would have posted it.
    fn publish_mirror(h: &Harness, id: MessageId, channel: ChannelId, endpoint: u64, text: &str) {
        let mut mirror = message(id.get(), channel.get(), endpoint, text);
        mirror.webhook_id = Some(EndpointId(endpoint));
        h.platform.insert(mirror);
    }

    fn reaction(channel: ChannelId, message: MessageId, user: u64, bot: bool) -> ReactionEvent {
        ReactionEvent {
            channel_id: channel,
            message_id: message,
            emoji: Emoji::Unicode("🎉".into()),
            user_id: Some(UserId(user)),
            actor_is_bot: bot,
        }
    }

    #[tokio::test]
    async fn create_then_delete_round_trip() {
        let h = harness();
        let m1 = message(10, X.get(), 42, "hello");
        h.platform.insert(m1.clone());

        let outcome = h.relay.handle(RelayEvent::MessageCreated(m1)).await;
        let m2 = MessageId(100_001);
        assert_eq!(outcome, Outcome::Relayed {
            source: MessageId(10),
            mirror: m2
        });
        assert_eq!(sent(&h.to_y), vec!["hello"]);
        assert!(h.to_x.calls().is_empty());
        assert_eq!(h.relay.store().get(MessageId(10)), Some(m2));
        assert_eq!(h.relay.store().get(m2), Some(MessageId(10)));

        let outcome = h
            .relay
            .handle(RelayEvent::MessageDeleted {
                channel_id: X,
                message_id: MessageId(10),
            })
            .await;
        assert_eq!(outcome, Outcome::Deleted { peer: m2 });
        assert_eq!(h.to_y.calls().last(), Some(&EndpointCall::Delete(m2)));
        assert_eq!(h.relay.store().get(MessageId(10)), None);
        assert_eq!(h.relay.store().get(m2), None);

        // The platform then reports the mirror's deletion; nothing left to do.
        let outcome = h
            .relay
            .handle(RelayEvent::MessageDeleted {
                channel_id: Y,
                message_id: m2,
            })
            .await;
        assert_eq!(outcome, Outcome::Ignored(IgnoreReason::Uncorrelated));
        assert!(h.to_x.calls().is_empty());
    }

    #[tokio::test]
    async fn outbound_impersonates_author_without_role_pings() {
        let h = harness();
        let mut m1 = message(10, X.get(), 42, "hey <@&7>");
        m1.author.display_name = "Alice".into();
        m1.author.avatar_url = Some("https://cdn.example/alice.png".into());
        m1.role_mentions = vec![Role {
            id: RoleId(7),
            name: "raiders".into(),
        }];
        m1.embeds = vec![json!({"url": "https://example.com"})];

        h.relay.on_message_created(m1).await;
        let calls = h.to_y.calls();
        let [EndpointCall::Send(out)] = calls.as_slice() else {
            panic!("expected a single send");
        };
        assert_eq!(out.content, "hey @raiders");
        assert_eq!(out.display_name, "Alice");
        assert_eq!(
            out.avatar_url.as_deref(),
            Some("https://cdn.example/alice.png")
        );
        assert_eq!(out.embeds.len(), 1);
        assert!(out.allowed_mentions.users);
        assert!(!out.allowed_mentions.roles);
        assert!(!out.allowed_mentions.everyone);
    }

    #[tokio::test]
    async fn relay_endpoint_posts_are_never_relayed() {
        let h = harness();
        let mut echo = message(100_001, Y.get(), 100, "hello");
        echo.webhook_id = Some(EndpointId(100));

        let outcome = h.relay.on_message_created(echo).await;
        assert_eq!(outcome, Outcome::Ignored(IgnoreReason::Echo));
        assert!(h.to_x.calls().is_empty());
        assert!(h.to_y.calls().is_empty());
        assert!(h.relay.store().is_empty());
    }

    #[tokio::test]
    async fn bot_account_messages_are_never_relayed() {
        let h = harness();
        let outcome = h
            .relay
            .on_message_created(message(10, X.get(), BOT.get(), "status"))
            .await;
        assert_eq!(outcome, Outcome::Ignored(IgnoreReason::Echo));
        assert!(h.to_y.calls().is_empty());
    }

    #[tokio::test]
    async fn messages_outside_relay_channels_are_ignored() {
        let h = harness();
        let outcome = h
            .relay
            .on_message_created(message(10, 99, 42, "elsewhere"))
            .await;
        assert_eq!(outcome, Outcome::Ignored(IgnoreReason::NotRelayChannel));
    }

    #[tokio::test]
    async fn failed_send_commits_nothing() {
        let h = harness();
        h.to_y.fail();
        let outcome = h
            .relay
            .on_message_created(message(10, X.get(), 42, "hello"))
            .await;
        assert_eq!(outcome, Outcome::Failed);
        assert!(h.relay.store().is_empty());
    }

    #[tokio::test]
    async fn duplicate_create_is_not_sent_twice() {
        let h = harness();
        let m1 = message(10, X.get(), 42, "hello");
        h.relay.on_message_created(m1.clone()).await;
        let outcome = h.relay.on_message_created(m1).await;
        assert_eq!(outcome, Outcome::Ignored(IgnoreReason::AlreadyRelayed));
        assert_eq!(sent(&h.to_y).len(), 1);
    }

    #[tokio::test]
    async fn reply_to_mirror_quotes_true_author() {
        let h = harness();
        // m1 by user 42 in X, relayed to Y as m2.
        let m1 = message(10, X.get(), 42, "original words");
        h.platform.insert(m1.clone());
        let Outcome::Relayed { mirror: m2, .. } = h.relay.on_message_created(m1).await else {
            panic!("expected relay");
        };
        publish_mirror(&h, m2, Y, 100, "original words");

        // User 77 replies to m2 in Y.
        let mut reply = message(11, Y.get(), 77, "nice");
        reply.reply_to = Some(m2);
        h.relay.on_message_created(reply).await;

        assert_eq!(sent(&h.to_x), vec![
            "Replying to <@42>\n> original words\nnice"
        ]);
    }

    #[tokio::test]
    async fn reply_to_original_in_its_own_channel_quotes_the_mirror() {
        let h = harness();
        let m1 = message(10, X.get(), 42, "original words");
        h.platform.insert(m1.clone());
        let Outcome::Relayed { mirror: m2, .. } = h.relay.on_message_created(m1).await else {
            panic!("expected relay");
        };
        let mut mirror = message(m2.get(), Y.get(), 100, "original words");
        mirror.webhook_id = Some(EndpointId(100));
        mirror.author.display_name = "Alice".into();
        h.platform.insert(mirror);

        // User 77 replies to m1 in X: the target is correlated, so the
        // resolver hops to the webhook-authored copy and names it unpinged.
        let mut reply = message(11, X.get(), 77, "same channel");
        reply.reply_to = Some(MessageId(10));
        h.relay.on_message_created(reply).await;

        assert_eq!(sent(&h.to_y), vec![
            "original words",
            "Replying to @Alice\n> original words\nsame channel",
        ]);
    }

    #[tokio::test]
    async fn reply_to_deleted_message_relays_without_quote() {
        let h = harness();
        let mut reply = message(11, X.get(), 77, "answer");
        reply.reply_to = Some(MessageId(5));
        let outcome = h.relay.on_message_created(reply).await;
        assert!(matches!(outcome, Outcome::Relayed { .. }));
        assert_eq!(sent(&h.to_y), vec!["answer"]);
    }

    #[tokio::test]
    async fn edit_without_create_makes_no_calls() {
        let h = harness();
        let outcome = h
            .relay
            .handle(RelayEvent::MessageEdited {
                channel_id: X,
                message_id: MessageId(10),
            })
            .await;
        assert_eq!(outcome, Outcome::Ignored(IgnoreReason::Uncorrelated));
        assert_eq!(h.platform.fetch_count(), 0);
        assert!(h.to_x.calls().is_empty());
        assert!(h.to_y.calls().is_empty());
    }

    #[tokio::test]
    async fn edit_refetches_and_rewrites_mirror() {
        let h = harness();
        let m1 = message(10, X.get(), 42, "helo");
        h.platform.insert(m1.clone());
        let Outcome::Relayed { mirror: m2, .. } = h.relay.on_message_created(m1).await else {
            panic!("expected relay");
        };

        h.platform.insert(message(10, X.get(), 42, "hello"));
        let outcome = h.relay.on_message_edited(X, MessageId(10)).await;
        assert_eq!(outcome, Outcome::Edited { mirror: m2 });
        let Some(EndpointCall::Edit(id, edit)) = h.to_y.calls().last().cloned() else {
            panic!("expected an edit");
        };
        assert_eq!(id, m2);
        assert_eq!(edit.content, "hello");
        assert_eq!(h.relay.store().get(m2), Some(MessageId(10)));
    }

    #[tokio::test]
    async fn edit_of_reply_recomputes_quote() {
        let h = harness();
        let m1 = message(10, X.get(), 42, "original words");
        h.platform.insert(m1.clone());
        let Outcome::Relayed { mirror: m2, .. } = h.relay.on_message_created(m1).await else {
            panic!("expected relay");
        };
        publish_mirror(&h, m2, Y, 100, "original words");

        let mut reply = message(11, Y.get(), 77, "nice");
        reply.reply_to = Some(m2);
        h.platform.insert(reply.clone());
        let Outcome::Relayed { mirror: m3, .. } = h.relay.on_message_created(reply).await else {
            panic!("expected relay");
        };

        let mut edited = message(11, Y.get(), 77, "very nice");
        edited.reply_to = Some(m2);
        h.platform.insert(edited);
        let outcome = h.relay.on_message_edited(Y, MessageId(11)).await;
        assert_eq!(outcome, Outcome::Edited { mirror: m3 });
        let Some(EndpointCall::Edit(id, edit)) = h.to_x.calls().last().cloned() else {
            panic!("expected an edit");
        };
        assert_eq!(id, m3);
        assert_eq!(edit.content, "Replying to <@42>\n> original words\nvery nice");
    }

    #[tokio::test]
    async fn edit_event_for_mirror_is_an_echo() {
        let h = harness();
        let m1 = message(10, X.get(), 42, "hello");
        let Outcome::Relayed { mirror: m2, .. } = h.relay.on_message_created(m1).await else {
            panic!("expected relay");
        };
        publish_mirror(&h, m2, Y, 100, "hello");

        let outcome = h.relay.on_message_edited(Y, m2).await;
        assert_eq!(outcome, Outcome::Ignored(IgnoreReason::Echo));
        assert!(h.to_x.calls().is_empty());
    }

    #[tokio::test]
    async fn edit_of_vanished_message_is_ignored() {
        let h = harness();
        let m1 = message(10, X.get(), 42, "hello");
        h.relay.on_message_created(m1).await;
        h.platform.remove(X.get(), 10);

        let outcome = h.relay.on_message_edited(X, MessageId(10)).await;
        assert_eq!(outcome, Outcome::Ignored(IgnoreReason::Missing));
    }

    #[tokio::test]
    async fn delete_of_unknown_message_does_nothing() {
        let h = harness();
        let outcome = h.relay.on_message_deleted(X, MessageId(404)).await;
        assert_eq!(outcome, Outcome::Ignored(IgnoreReason::Uncorrelated));
        assert!(h.to_y.calls().is_empty());
    }

    #[tokio::test]
    async fn deleting_the_mirror_deletes_the_original() {
        let h = harness();
        let Outcome::Relayed { mirror: m2, .. } = h
            .relay
            .on_message_created(message(10, X.get(), 42, "hello"))
            .await
        else {
            panic!("expected relay");
        };

        let outcome = h.relay.on_message_deleted(Y, m2).await;
        assert_eq!(outcome, Outcome::Deleted {
            peer: MessageId(10)
        });
        assert_eq!(h.to_x.calls(), vec![EndpointCall::Delete(MessageId(10))]);
        assert_eq!(h.relay.store().get(MessageId(10)), None);
        assert_eq!(h.relay.store().get(m2), None);
    }

    #[tokio::test]
    async fn failed_delete_still_forgets_the_pair() {
        let h = harness();
        h.relay
            .on_message_created(message(10, X.get(), 42, "hello"))
            .await;
        h.to_y.fail();
        let outcome = h.relay.on_message_deleted(X, MessageId(10)).await;
        assert_eq!(outcome, Outcome::Failed);
        assert!(h.relay.store().is_empty());
    }

    #[tokio::test]
    async fn reaction_is_mirrored_as_the_bot() {
        let h = harness();
        let Outcome::Relayed { mirror: m2, .. } = h
            .relay
            .on_message_created(message(10, X.get(), 42, "hello"))
            .await
        else {
            panic!("expected relay");
        };
        publish_mirror(&h, m2, Y, 100, "hello");

        let outcome = h
            .relay
            .handle(RelayEvent::ReactionAdded(reaction(X, MessageId(10), 42, false)))
            .await;
        assert_eq!(outcome, Outcome::Reacted { mirror: m2 });

        let outcome = h
            .relay
            .handle(RelayEvent::ReactionRemoved(reaction(X, MessageId(10), 42, false)))
            .await;
        assert_eq!(outcome, Outcome::Unreacted { mirror: m2 });

        let emoji = Emoji::Unicode("🎉".into());
        assert_eq!(h.platform.reactions(), vec![
            ReactionCall::Add(Y, m2, emoji.clone()),
            ReactionCall::Remove(Y, m2, emoji),
        ]);
    }

    #[tokio::test]
    async fn bot_reactions_are_not_mirrored() {
        let h = harness();
        h.relay
            .on_message_created(message(10, X.get(), 42, "hello"))
            .await;

        let outcome = h
            .relay
            .on_reaction_added(reaction(X, MessageId(10), 555, true))
            .await;
        assert_eq!(outcome, Outcome::Ignored(IgnoreReason::BotReaction));
        let outcome = h
            .relay
            .on_reaction_removed(reaction(X, MessageId(10), BOT.get(), true))
            .await;
        assert_eq!(outcome, Outcome::Ignored(IgnoreReason::Echo));
        assert!(h.platform.reactions().is_empty());
    }

    #[tokio::test]
    async fn reaction_on_uncorrelated_message_is_ignored() {
        let h = harness();
        let outcome = h
            .relay
            .on_reaction_added(reaction(X, MessageId(10), 42, false))
            .await;
        assert_eq!(outcome, Outcome::Ignored(IgnoreReason::Uncorrelated));
        assert_eq!(h.platform.fetch_count(), 0);
    }

    #[tokio::test]
    async fn reaction_on_deleted_mirror_is_ignored() {
        let h = harness();
        h.relay
            .on_message_created(message(10, X.get(), 42, "hello"))
            .await;
        // Mirror was never published on the mock platform, so fetch fails.
        let outcome = h
            .relay
            .on_reaction_added(reaction(X, MessageId(10), 42, false))
            .await;
        assert_eq!(outcome, Outcome::Ignored(IgnoreReason::Missing));
        assert!(h.platform.reactions().is_empty());
    }

    #[tokio::test]
    async fn concurrent_creates_each_get_their_own_mirror() {
        let h = Arc::new(harness());
        let tasks: Vec<_> = (0..20u64)
            .map(|i| {
                let h = Arc::clone(&h);
                tokio::spawn(async move {
                    h.relay
                        .on_message_created(message(1_000 + i, X.get(), 42, "burst"))
                        .await
                })
            })
            .collect();
        for task in tasks {
            assert!(matches!(task.await.unwrap(), Outcome::Relayed { .. }));
        }
        assert_eq!(h.relay.store().len(), 20);
        for i in 0..20u64 {
            let mirror = h.relay.store().get(MessageId(1_000 + i)).unwrap();
            assert_eq!(h.relay.store().get(mirror), Some(MessageId(1_000 + i)));
        }
    }
}
