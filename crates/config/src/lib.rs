//! Configuration loading and validation.
//!
//! Config files: `jabberfeed.toml`, `jabberfeed.yaml`, or `jabberfeed.json`,
//! searched in `./` then `~/.config/jabberfeed/`.
//!
//! `${ENV_VAR}` references are expanded before parsing.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{Format, config_dir, discover_and_load, find_config_file, load_config},
    schema::{CodecSection, JabberfeedConfig, MetricsConfig, OutputConfig},
    validate::{Diagnostic, Severity, ValidationResult, check_config, validate},
};
