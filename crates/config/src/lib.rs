//! Configuration loading, validation and env substitution.
//!
//! Config files: `mirror.toml`, `mirror.yaml`, `mirror.yml` or `mirror.json`,
//! searched in `./` then `~/.config/mirror/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod template;
pub mod validate;
pub mod webhook;

pub use {
    loader::{
        LoadedConfig, TOKEN_ENV, apply_env_overrides, config_dir, discover_and_load, load_config,
    },
    schema::{DiscordConfig, MirrorConfig, PairConfig, PairSide},
    template::{default_config_template, write_default_config},
    validate::{Diagnostic, Severity, ValidationResult, validate, validate_config},
    webhook::{WebhookParts, parse_webhook_url, webhook_id_from_url},
};
