//! Discord adapter for the mirror relay.
//!
//! Uses serenity for the gateway and REST API: gateway events are turned into
//! relay events, reads and reactions go through [`DiscordPlatform`], and
//! mirrored posts go out through one [`WebhookEndpoint`] per channel.

pub mod bot;
pub mod convert;
pub mod error;
pub mod handler;
pub mod outbound;
pub mod platform;

pub use {
    bot::run,
    error::{Error, Result},
    handler::RelayHandler,
    outbound::WebhookEndpoint,
    platform::DiscordPlatform,
};
