// TOML config adapter - Reads the `[merge]` section of a config file

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config_initialization::MergeConfig;

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    merge: Option<MergeConfig>,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Default config file location: `$XDG_CONFIG_HOME/clipmerge/config.toml`,
    /// falling back to the working directory
    pub fn default_config_path() -> PathBuf {
        if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(dir).join("clipmerge").join("config.toml")
        } else if let Some(appdata) = std::env::var_os("APPDATA") {
            PathBuf::from(appdata).join("ClipMerge").join("config.toml")
        } else {
            PathBuf::from("clipmerge.toml")
        }
    }

    /// Parse a TOML document; a missing `[merge]` section yields defaults
    pub fn parse(content: &str) -> Result<MergeConfig> {
        let parsed: ConfigFile =
            toml::from_str(content).context("Failed to parse TOML config")?;
        Ok(parsed.merge.unwrap_or_default())
    }

    pub fn load(path: &Path) -> Result<MergeConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content)
    }

    /// Serialize a config back into the file layout
    pub fn render(config: &MergeConfig) -> Result<String> {
        #[derive(serde::Serialize)]
        struct Out<'a> {
            merge: &'a MergeConfig,
        }
        toml::to_string(&Out { merge: config }).context("Failed to serialize config")
    }
}
