//! Webhook URL parsing.
//!
//! Discord webhook URLs look like
//! `https://discord.com/api/webhooks/<id>/<token>`, optionally with an API
//! version segment (`/api/v10/webhooks/...`). The numeric id is the identity
//! Discord stamps on every message the webhook posts.

use url::Url;

/// Parsed `(id, token)` of a webhook URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookParts {
    pub id: u64,
    pub token: String,
}

/// Split a webhook URL into its id and token.
pub fn parse_webhook_url(raw: &str) -> Option<WebhookParts> {
    let url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let mut segments = url.path_segments()?;
    segments.find(|s| *s == "webhooks")?;
    let id = segments.next()?.parse().ok()?;
    let token = segments.next().filter(|t| !t.is_empty())?.to_string();
    Some(WebhookParts { id, token })
}

/// The relay identity of a webhook URL.
pub fn webhook_id_from_url(raw: &str) -> Option<u64> {
    parse_webhook_url(raw).map(|p| p.id)
}
