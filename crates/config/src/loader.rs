use std::path::{Path, PathBuf};

use {
    anyhow::{Context, bail},
    tracing::debug,
};

use crate::{env_subst::substitute_env, schema::JabberfeedConfig};

/// Config file names, checked in order in each search directory.
const CONFIG_FILENAMES: &[&str] = &[
    "jabberfeed.toml",
    "jabberfeed.yaml",
    "jabberfeed.yml",
    "jabberfeed.json",
];

/// Supported on-disk formats, picked by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Yaml,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        match path.extension().and_then(|e| e.to_str()).unwrap_or("toml") {
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => bail!("unsupported config format: .{other}"),
        }
    }
}

/// User-global config directory (`~/.config/jabberfeed/` on Linux).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "jabberfeed").map(|d| d.config_dir().to_path_buf())
}

/// First config file found in `./`, then in [`config_dir`].
pub fn find_config_file() -> Option<PathBuf> {
    find_in(Path::new(".")).or_else(|| config_dir().and_then(|dir| find_in(&dir)))
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Read `path` with `${ENV}` substitution applied to the raw text.
pub fn read_config(path: &Path) -> anyhow::Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(substitute_env(&raw))
}

/// Load and parse the config at `path`.
pub fn load_config(path: &Path) -> anyhow::Result<JabberfeedConfig> {
    debug!(path = %path.display(), "loading config");
    let raw = read_config(path)?;
    parse_config(&raw, Format::from_path(path)?)
        .with_context(|| format!("invalid config {}", path.display()))
}

/// Load `explicit` if given, otherwise the first config file discovered.
///
/// Returns the path that was loaded alongside the parsed config.
pub fn discover_and_load(explicit: Option<&Path>) -> anyhow::Result<(PathBuf, JabberfeedConfig)> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => find_config_file().with_context(|| {
            format!(
                "no config file found; looked for {} in ./ and {}",
                CONFIG_FILENAMES.join(", "),
                config_dir()
                    .map(|d| d.display().to_string())
                    .unwrap_or_else(|| "the user config directory".into())
            )
        })?,
    };
    let config = load_config(&path)?;
    Ok((path, config))
}

pub fn parse_config(raw: &str, format: Format) -> anyhow::Result<JabberfeedConfig> {
    Ok(match format {
        Format::Toml => toml::from_str(raw)?,
        Format::Yaml => serde_yaml::from_str(raw)?,
        Format::Json => serde_json::from_str(raw)?,
    })
}

/// Parse into a format-neutral tree, for field-level validation.
pub fn parse_config_value(raw: &str, format: Format) -> anyhow::Result<serde_json::Value> {
    Ok(match format {
        Format::Toml => serde_json::to_value(toml::from_str::<toml::Value>(raw)?)?,
        Format::Yaml => serde_json::to_value(serde_yaml::from_str::<serde_yaml::Value>(raw)?)?,
        Format::Json => serde_json::from_str(raw)?,
    })
}
