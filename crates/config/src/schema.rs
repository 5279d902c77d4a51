/// Config schema: the bot credential and the static set of relay pairs.
use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    pub discord: DiscordConfig,
    pub pairs: Vec<PairConfig>,
}

/// Gateway credentials.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token. `DISCORD_BOT_TOKEN` in the environment takes precedence.
    #[serde(
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub token: Option<Secret<String>>,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl DiscordConfig {
    /// The token, if one is configured and non-empty.
    pub fn token(&self) -> Option<&str> {
        self.token
            .as_ref()
            .map(|t| t.expose_secret().as_str())
            .filter(|t| !t.trim().is_empty())
    }
}

/// Two channels that mirror each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairConfig {
    pub a: PairSide,
    pub b: PairSide,
}

/// One channel of a pair plus the endpoint that relays its messages into the
/// *other* channel.
#[derive(Clone, Serialize, Deserialize)]
pub struct PairSide {
    pub channel_id: u64,
    /// Webhook URL (contains the webhook token).
    #[serde(serialize_with = "serialize_secret")]
    pub webhook_url: Secret<String>,
}

impl std::fmt::Debug for PairSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairSide")
            .field("channel_id", &self.channel_id)
            .field("webhook_url", &"[REDACTED]")
            .finish()
    }
}

// ── Serde helpers for Secret<String> ────────────────────────────────────────

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}
