use std::path::{Path, PathBuf};

use {secrecy::Secret, tracing::debug};

use crate::{env_subst::substitute_env, schema::MirrorConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["mirror.toml", "mirror.yaml", "mirror.yml", "mirror.json"];

/// Environment variable that supplies (and overrides) the bot token.
pub const TOKEN_ENV: &str = "DISCORD_BOT_TOKEN";

/// A loaded config together with the file it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: MirrorConfig,
    pub path: Option<PathBuf>,
}

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<MirrorConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Load the config at `explicit`, or discover one in the standard
/// locations, then apply environment overrides.
///
/// Search order when no path is given:
/// 1. `./mirror.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/mirror/mirror.{toml,yaml,yml,json}` (user-global)
///
/// With no file anywhere the result is an empty config (no pairs), which
/// validation reports as an error; a file that exists but does not parse is
/// an error right away.
pub fn discover_and_load(explicit: Option<&Path>) -> anyhow::Result<LoadedConfig> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => find_config_file(),
    };

    let config = match &path {
        Some(p) => {
            debug!(path = %p.display(), "loading config");
            load_config(p)?
        },
        None => {
            debug!("no config file found, using defaults");
            MirrorConfig::default()
        },
    };

    Ok(LoadedConfig {
        config: apply_env_overrides(config),
        path,
    })
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: MirrorConfig) -> MirrorConfig {
    apply_env_overrides_with(config, |name| std::env::var(name).ok())
}

fn apply_env_overrides_with(
    mut config: MirrorConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> MirrorConfig {
    if let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
        debug!("using bot token from {TOKEN_ENV}");
        config.discord.token = Some(Secret::new(token));
    }
    config
}

/// Find the first config file in standard locations.
pub(crate) fn find_config_file() -> Option<PathBuf> {
    // Project-local
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    // User-global: ~/.config/mirror/
    if let Some(dir) = config_dir() {
        for name in CONFIG_FILENAMES {
            let p = dir.join(name);
            if p.exists() {
                return Some(p);
            }
        }
    }

    None
}

/// Returns the user-global config directory (`~/.config/mirror/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "mirror").map(|d| d.config_dir().to_path_buf())
}

pub(crate) fn parse_config(raw: &str, path: &Path) -> anyhow::Result<MirrorConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
