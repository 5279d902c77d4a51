//! Configuration validation engine.
//!
//! Parses the config file the same way the loader does, then checks the relay
//! pairs for shapes the bot cannot run with: no pairs, self-pairs, channels
//! claimed by two pairs, broken webhook URLs and a missing bot token.

use std::{
    collections::{HashMap, hash_map::Entry},
    path::{Path, PathBuf},
};

use crate::{
    env_subst::substitute_env,
    loader::{TOKEN_ENV, apply_env_overrides, find_config_file, parse_config},
    schema::MirrorConfig,
    webhook::parse_webhook_url,
};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "file-ref", "pairs", "webhook", "credentials"
    pub category: &'static str,
    /// Dotted path, e.g. "pairs[0].b.webhook_url"
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn error(category: &'static str, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            category,
            path: path.into(),
            message: message.into(),
        }
    }

    fn warning(category: &'static str, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(category, path, message)
        }
    }
}

/// Result of validating a configuration file.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Validate a config file at the given path, or discover the default config
/// file location if `path` is `None`.
///
/// Environment overrides are applied before the checks run, so a token that
/// only lives in `DISCORD_BOT_TOKEN` does not count as missing.
#[must_use]
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config_file(),
    };

    let Some(ref actual_path) = config_path else {
        let mut diagnostics = vec![Diagnostic {
            severity: Severity::Info,
            category: "file-ref",
            path: String::new(),
            message: "no config file found; using defaults".into(),
        }];
        diagnostics.extend(validate_config(&apply_env_overrides(
            MirrorConfig::default(),
        )));
        return ValidationResult {
            diagnostics,
            config_path: None,
        };
    };

    let raw = match std::fs::read_to_string(actual_path) {
        Ok(raw) => raw,
        Err(e) => {
            return ValidationResult {
                diagnostics: vec![Diagnostic::error(
                    "syntax",
                    "",
                    format!("failed to read config file: {e}"),
                )],
                config_path,
            };
        },
    };

    let diagnostics = match parse_config(&substitute_env(&raw), actual_path) {
        Ok(config) => validate_config(&apply_env_overrides(config)),
        Err(e) => vec![Diagnostic::error(
            "syntax",
            "",
            format!("failed to parse config: {e}"),
        )],
    };

    ValidationResult {
        diagnostics,
        config_path,
    }
}

/// Run the semantic checks on an already-parsed config.
#[must_use]
pub fn validate_config(config: &MirrorConfig) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if config.discord.token().is_none() {
        diagnostics.push(Diagnostic::error(
            "credentials",
            "discord.token",
            format!("no bot token configured (set discord.token or {TOKEN_ENV})"),
        ));
    }

    if config.pairs.is_empty() {
        diagnostics.push(Diagnostic::error(
            "pairs",
            "pairs",
            "no relay pairs configured",
        ));
    }

    let mut channels: HashMap<u64, String> = HashMap::new();
    let mut webhooks: HashMap<u64, String> = HashMap::new();

    for (i, pair) in config.pairs.iter().enumerate() {
        if pair.a.channel_id == pair.b.channel_id {
            diagnostics.push(Diagnostic::error(
                "pairs",
                format!("pairs[{i}]"),
                format!("channel {} is paired with itself", pair.a.channel_id),
            ));
        }

        for (label, side) in [("a", &pair.a), ("b", &pair.b)] {
            let side_path = format!("pairs[{i}].{label}");

            if side.channel_id == 0 {
                diagnostics.push(Diagnostic::error(
                    "pairs",
                    format!("{side_path}.channel_id"),
                    "channel id must be non-zero",
                ));
            } else if pair.a.channel_id != pair.b.channel_id || label == "a" {
                match channels.entry(side.channel_id) {
                    Entry::Occupied(first) => diagnostics.push(Diagnostic::error(
                        "pairs",
                        format!("{side_path}.channel_id"),
                        format!(
                            "channel {} is already relayed by {}",
                            side.channel_id,
                            first.get()
                        ),
                    )),
                    Entry::Vacant(slot) => {
                        slot.insert(side_path.clone());
                    },
                }
            }

            check_webhook(side, &side_path, &mut webhooks, &mut diagnostics);
        }
    }

    diagnostics
}

fn check_webhook(
    side: &crate::schema::PairSide,
    side_path: &str,
    seen: &mut HashMap<u64, String>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    use secrecy::ExposeSecret;

    let path = format!("{side_path}.webhook_url");
    let raw = side.webhook_url.expose_secret();

    let Some(parts) = parse_webhook_url(raw) else {
        let message = if raw.contains("${") {
            "webhook URL contains an unresolved environment placeholder"
        } else {
            "not a webhook URL (expected https://discord.com/api/webhooks/<id>/<token>)"
        };
        diagnostics.push(Diagnostic::error("webhook", path, message));
        return;
    };

    match seen.entry(parts.id) {
        Entry::Occupied(first) => diagnostics.push(Diagnostic::warning(
            "webhook",
            path,
            format!(
                "webhook {} is also configured at {}; both channels will post through it",
                parts.id,
                first.get()
            ),
        )),
        Entry::Vacant(slot) => {
            slot.insert(path);
        },
    }
}
