//! Configuration initialization and hierarchy management

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::adapters::TomlConfigAdapter;
use crate::engine::{DEFAULT_LOG_CAPACITY, DEFAULT_READY_TIMEOUT};

/// Runtime settings for merge jobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Bound on waiting for the engine to load
    pub ready_timeout_secs: u64,
    /// ffmpeg executable used by the process engine
    pub ffmpeg_binary: String,
    /// Target bitrate for re-encoded audio
    pub audio_bitrate: String,
    /// Characters of engine log kept in memory
    pub log_capacity: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            ready_timeout_secs: DEFAULT_READY_TIMEOUT.as_secs(),
            ffmpeg_binary: "ffmpeg".to_string(),
            audio_bitrate: "192k".to_string(),
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

impl MergeConfig {
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ready_timeout_secs == 0 {
            bail!("ready_timeout_secs must be greater than zero");
        }
        if self.ffmpeg_binary.trim().is_empty() {
            bail!("ffmpeg_binary cannot be empty");
        }
        let digits = self.audio_bitrate.trim_end_matches(['k', 'K']);
        if digits.is_empty() || digits.parse::<u32>().is_err() {
            bail!("Invalid audio bitrate: {}", self.audio_bitrate);
        }
        if self.log_capacity == 0 {
            bail!("log_capacity must be greater than zero");
        }
        Ok(())
    }
}

/// Values supplied on the command line; `None` leaves the lower layer intact
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub ready_timeout_secs: Option<u64>,
    pub ffmpeg_binary: Option<String>,
    pub audio_bitrate: Option<String>,
}

/// Environment variables and the fields they set
pub const ENV_MAPPINGS: &[(&str, &str)] = &[
    ("CLIPMERGE_READY_TIMEOUT_SECS", "ready_timeout_secs"),
    ("CLIPMERGE_FFMPEG", "ffmpeg_binary"),
    ("CLIPMERGE_AUDIO_BITRATE", "audio_bitrate"),
    ("CLIPMERGE_LOG_CAPACITY", "log_capacity"),
];

/// Initialize configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration(
    config_file: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<MergeConfig> {
    info!("Initializing configuration hierarchy");

    let mut config = match config_file {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            TomlConfigAdapter::load(path)?
        }
        None => {
            let default_path = TomlConfigAdapter::default_config_path();
            if default_path.exists() {
                info!("Loading configuration from: {}", default_path.display());
                TomlConfigAdapter::load(&default_path)?
            } else {
                MergeConfig::default()
            }
        }
    };

    apply_environment(&mut config, |key| std::env::var(key).ok())?;
    apply_overrides(&mut config, overrides);
    config.validate()?;

    info!("Configuration hierarchy initialized successfully");
    Ok(config)
}

/// Apply environment overrides from the given lookup
pub fn apply_environment(
    config: &mut MergeConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    let mut env_overrides = 0;
    for (env_var, field) in ENV_MAPPINGS {
        let Some(value) = lookup(env_var) else {
            continue;
        };
        info!("Found environment override: {} = {}", env_var, value);
        match *field {
            "ready_timeout_secs" => {
                config.ready_timeout_secs = value
                    .parse()
                    .map_err(|e| anyhow::anyhow!("Invalid {}: {}", env_var, e))?;
            }
            "log_capacity" => {
                config.log_capacity = value
                    .parse()
                    .map_err(|e| anyhow::anyhow!("Invalid {}: {}", env_var, e))?;
            }
            "ffmpeg_binary" => config.ffmpeg_binary = value,
            "audio_bitrate" => config.audio_bitrate = value,
            _ => continue,
        }
        env_overrides += 1;
    }

    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }
    Ok(())
}

/// Apply CLI argument overrides to configuration
pub fn apply_overrides(config: &mut MergeConfig, overrides: &ConfigOverrides) {
    if let Some(secs) = overrides.ready_timeout_secs {
        config.ready_timeout_secs = secs;
    }
    if let Some(binary) = &overrides.ffmpeg_binary {
        config.ffmpeg_binary = binary.clone();
    }
    if let Some(bitrate) = &overrides.audio_bitrate {
        config.audio_bitrate = bitrate.clone();
    }
}
