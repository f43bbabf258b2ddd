use crate::error::{Result, VidsplitError};
use crate::media::FfmpegEngine;
use crate::pipeline::PipelineConfig;
use crate::workspace::Workspace;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub audio_dir: PathBuf,
    pub video_dir: PathBuf,
    pub chunk_size: i64,
    pub audio_codec: String,
    pub audio_extension: String,
    pub chunk_extension: String,
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            audio_dir: PathBuf::from("audio"),
            video_dir: PathBuf::from("video"),
            chunk_size: 5,
            audio_codec: "libmp3lame".to_string(),
            audio_extension: "mp3".to_string(),
            chunk_extension: "mp4".to_string(),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            timeout_secs: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                config = toml::from_str(&contents).map_err(|e| {
                    VidsplitError::Config(format!("{}: {e}", config_path.display()))
                })?;
            }
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Override fields from `VIDSPLIT_*` variables as resolved by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("VIDSPLIT_AUDIO_DIR") {
            self.audio_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("VIDSPLIT_VIDEO_DIR") {
            self.video_dir = PathBuf::from(dir);
        }
        if let Some(size) = lookup("VIDSPLIT_CHUNK_SIZE") {
            self.chunk_size = size.trim().parse().map_err(|_| {
                VidsplitError::Config(format!("VIDSPLIT_CHUNK_SIZE is not an integer: {size}"))
            })?;
        }
        if let Some(secs) = lookup("VIDSPLIT_TIMEOUT_SECS") {
            self.timeout_secs = Some(secs.trim().parse().map_err(|_| {
                VidsplitError::Config(format!("VIDSPLIT_TIMEOUT_SECS is not a number: {secs}"))
            })?);
        }
        if let Some(path) = lookup("VIDSPLIT_FFMPEG") {
            self.ffmpeg_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("VIDSPLIT_FFPROBE") {
            self.ffprobe_path = PathBuf::from(path);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size <= 0 {
            return Err(VidsplitError::InvalidChunkSize(self.chunk_size));
        }

        if self.audio_dir.as_os_str().is_empty() || self.video_dir.as_os_str().is_empty() {
            return Err(VidsplitError::Config(
                "Audio and video directories must not be empty".to_string(),
            ));
        }
        if self.audio_dir == self.video_dir {
            return Err(VidsplitError::Config(format!(
                "Audio and video directories must differ (both are {})",
                self.audio_dir.display()
            )));
        }

        for (name, value) in [
            ("audio_codec", &self.audio_codec),
            ("audio_extension", &self.audio_extension),
            ("chunk_extension", &self.chunk_extension),
        ] {
            if value.trim().is_empty() {
                return Err(VidsplitError::Config(format!("{name} must not be empty")));
            }
        }

        if self.timeout_secs == Some(0) {
            return Err(VidsplitError::Config(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::new(&self.audio_dir, &self.video_dir)
    }

    pub fn engine(&self) -> FfmpegEngine {
        FfmpegEngine::new(&self.ffmpeg_path, &self.ffprobe_path).with_timeout(self.timeout())
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            workspace: self.workspace(),
            chunk_size: self.chunk_size,
            audio_codec: self.audio_codec.clone(),
            audio_extension: self.audio_extension.clone(),
            chunk_extension: self.chunk_extension.clone(),
        }
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vidsplit").join("config.toml"))
    }
}
