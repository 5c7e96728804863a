use crate::global;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub transcoder: TranscoderConfig,
    pub network: NetworkConfig,
    pub behavior: BehaviorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscoderConfig {
    /// Explicit ffmpeg binary. Falls back to a PATH lookup when unset or missing.
    pub ffmpeg_path: Option<String>,
    /// Frame rate of the rendered slide clips.
    pub frame_rate: u32,
    pub video_codec: String,
    pub pixel_format: String,
    /// Codec for the audio track muxed over the slides.
    pub audio_codec: String,
    /// Upper bound for a single ffmpeg invocation.
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub connect_timeout_seconds: u64,
    pub user_agent: String,
    /// Recording files to try, relative to the presentation root, in order.
    pub recording_assets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Leave the working directory in place when a run fails.
    pub keep_failed_workdir: bool,
    pub show_progress: bool,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            frame_rate: 24,
            video_codec: "libx264".to_string(),
            pixel_format: "yuv420p".to_string(),
            audio_codec: "aac".to_string(),
            timeout_seconds: 3600,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout_seconds: 30,
            user_agent: format!("bbb-downloader/{}", env!("CARGO_PKG_VERSION")),
            recording_assets: vec![
                "video/webcams.webm".to_string(),
                "video/webcams.mp4".to_string(),
            ],
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            keep_failed_workdir: false,
            show_progress: true,
        }
    }
}

impl Config {
    /// Load the user config. A config location that cannot be resolved or
    /// written falls back to the defaults.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            Err(e) => {
                warn!("Could not locate config directory ({e:#}), using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            if let Err(e) = config.save_to(config_path) {
                warn!("Could not write default config ({e:#}), using defaults");
            }
            return Ok(config);
        }

        let content =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.network.recording_assets.is_empty() {
            bail!("network.recording_assets must list at least one recording path");
        }
        Ok(())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        global::config_file()
    }
}
