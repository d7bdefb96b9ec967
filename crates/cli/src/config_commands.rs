use std::path::Path;

use anyhow::{Result, bail};

use jabberfeed_config::{Severity, ValidationResult, find_config_file, validate};

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// `jabberfeed check`: validate a config file and print its diagnostics.
pub fn check(explicit: Option<&Path>) -> Result<()> {
    let Some(path) = explicit.map(Path::to_path_buf).or_else(find_config_file) else {
        bail!("no config file found; pass --config or create jabberfeed.toml");
    };

    eprintln!("Checking {}\n", path.display());
    let result = validate(&path);
    report(&result);

    let errors = result.count(Severity::Error);
    if errors > 0 {
        bail!("{errors} error(s) in {}", path.display());
    }
    Ok(())
}

/// Print diagnostics to stderr followed by a summary line.
pub fn report(result: &ValidationResult) {
    for d in &result.diagnostics {
        let color = match d.severity {
            Severity::Error => RED,
            Severity::Warning => YELLOW,
        };
        if d.path.is_empty() {
            eprintln!("  {BOLD}{color}{}{RESET} {}", d.severity, d.message);
        } else {
            eprintln!("  {BOLD}{color}{}{RESET} {}: {}", d.severity, d.path, d.message);
        }
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);
    if !result.diagnostics.is_empty() {
        eprintln!();
    }
    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }
}
