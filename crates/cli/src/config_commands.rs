use std::path::{Path, PathBuf};

use anyhow::Result;

use mirror_config::validate::{self, Diagnostic, Severity};

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Validate the config and print diagnostics. Exits with status 1 on errors.
pub fn check(config: Option<&Path>, verbose: bool) -> Result<()> {
    let result = validate::validate(config);

    // Print which file we're checking
    if let Some(ref path) = result.config_path {
        eprintln!("Checking {}\n", path.display());
    } else {
        eprintln!("No config file found; checking defaults.\n");
    }

    let mut shown = 0;
    for d in &result.diagnostics {
        if d.severity == Severity::Info && !verbose {
            continue;
        }
        eprintln!("  {}", render(d));
        shown += 1;
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);

    if shown > 0 {
        eprintln!();
    }

    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    if errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// Write a starter config to `path`, or to the user config dir.
pub fn init(path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(|| {
        mirror_config::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mirror.toml")
    });
    mirror_config::write_default_config(&path)?;
    eprintln!("Wrote {}", path.display());
    eprintln!("Fill in the [[pairs]] section, then run `mirror check`.");
    Ok(())
}

fn render(d: &Diagnostic) -> String {
    let (color, label) = match d.severity {
        Severity::Error => (RED, "error"),
        Severity::Warning => (YELLOW, "warning"),
        Severity::Info => (CYAN, "info"),
    };

    if d.path.is_empty() {
        format!("{BOLD}{color}{label}{RESET} {}", d.message)
    } else {
        format!("{BOLD}{color}{label}{RESET} {}: {}", d.path, d.message)
    }
}
