//! Cross-channel message correlation and synchronisation.
//!
//! Mirrors messages between paired channels and keeps the copies in sync:
//! edits, deletes and reactions on either side are replayed onto the peer
//! found through the [`CorrelationStore`].

pub mod error;
pub mod guard;
pub mod relay;
pub mod reply;
pub mod routes;
pub mod store;
pub mod transform;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod testing;

pub use {
    error::{Error, Result},
    guard::LoopGuard,
    relay::{IgnoreReason, Outcome, Relay, RelayEvent},
    reply::{QuotedReply, ReplyResolver},
    routes::{RelayRoutes, Route},
    store::CorrelationStore,
};
