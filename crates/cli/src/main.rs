mod config_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    tracing::{error, info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use mirror_config::{Severity, validate_config};

#[derive(Parser)]
#[command(name = "mirror", about = "Mirror messages between paired Discord channels")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (overrides discovery of ./mirror.toml and ~/.config/mirror/).
    #[arg(long, global = true, env = "MIRROR_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and start relaying (default when no subcommand is provided).
    Run,
    /// Validate the configuration file and report errors/warnings.
    Check {
        /// Show informational diagnostics in addition to errors and warnings.
        #[arg(long)]
        verbose: bool,
    },
    /// Write a documented starter config.
    Init {
        /// Where to write it (default: ~/.config/mirror/mirror.toml).
        path: Option<PathBuf>,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let loaded = mirror_config::discover_and_load(cli.config.as_deref())?;
    match &loaded.path {
        Some(path) => info!(path = %path.display(), "config loaded"),
        None => warn!("no config file found"),
    }

    let diagnostics = validate_config(&loaded.config);
    for d in &diagnostics {
        match d.severity {
            Severity::Error => error!(path = %d.path, category = d.category, "{}", d.message),
            Severity::Warning => warn!(path = %d.path, category = d.category, "{}", d.message),
            Severity::Info => info!(path = %d.path, category = d.category, "{}", d.message),
        }
    }
    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    if errors > 0 {
        anyhow::bail!("configuration has {errors} error(s); run `mirror check` for details");
    }

    mirror_discord::run(&loaded.config).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    match cli.command {
        None | Some(Commands::Run) => {
            info!(version = env!("CARGO_PKG_VERSION"), "mirror starting");
            run(&cli).await
        },
        Some(Commands::Check { verbose }) => config_commands::check(cli.config.as_deref(), verbose),
        Some(Commands::Init { ref path }) => config_commands::init(path.clone()),
    }
}
