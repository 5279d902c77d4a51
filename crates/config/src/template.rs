//! Starter configuration written by `mirror init`.
//!
//! Every option is listed with a short description so a new deployment only
//! has to fill in channel ids and webhook URLs.

use std::path::Path;

/// The documented starter config (TOML).
pub fn default_config_template() -> &'static str {
    r##"# Mirror Configuration
# ====================
# Relays messages between pairs of channels and keeps edits, deletes and
# reactions in sync. Changes require a restart to take effect.
#
# Environment variable substitution is supported: ${ENV_VAR}
# A fallback can be given with ${ENV_VAR:-value}.

# ══════════════════════════════════════════════════════════════════════════════
# DISCORD
# ══════════════════════════════════════════════════════════════════════════════

[discord]
# Bot token. DISCORD_BOT_TOKEN in the environment (or a .env file) always wins.
# The bot needs the Message Content intent enabled in the developer portal.
token = "${DISCORD_BOT_TOKEN}"

# ══════════════════════════════════════════════════════════════════════════════
# RELAY PAIRS
# ══════════════════════════════════════════════════════════════════════════════
# Each pair links two channels. A side's webhook_url is that channel's
# outbound endpoint: it must be a webhook created in the OTHER channel of
# the pair, because messages from `a` are posted through it into `b`.
#
# A channel may belong to at most one pair.

# [[pairs]]
# a = { channel_id = 1402684679521308742, webhook_url = "${WEBHOOK_INTO_B}" }
# b = { channel_id = 1402685090408042580, webhook_url = "${WEBHOOK_INTO_A}" }
"##
}

/// Write the starter config to `path`, refusing to overwrite an existing file.
pub fn write_default_config(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!("config file already exists: {}", path.display());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, default_config_template())?;
    Ok(())
}
