// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::infra::errors::MoodChatError;
use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub capture: CaptureConfig,

    /// Frame source. Absent means no camera: the detect cycle idles.
    #[serde(default)]
    pub camera: Option<CameraConfig>,

    #[serde(default)]
    pub devserver: DevServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".into(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub user_id: String,
    pub greeting: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_id: "anonymous".into(),
            greeting: "Hey there! I'm here to chat and understand how you're feeling!".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    pub interval_ms: u64,
    pub width: u32,
    pub height: u32,
    pub jpeg_quality: u8,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2_000,
            width: 640,
            height: 480,
            jpeg_quality: 85,
        }
    }
}

/// `[camera]` section, e.g. `kind = "dir"` + `path = "frames/"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CameraConfig {
    /// A still image re-read on every tick.
    File { path: PathBuf },
    /// Image files of a directory, cycled in name order.
    Dir { path: PathBuf },
    /// Shell command writing one encoded image to stdout.
    Command { command: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevServerConfig {
    pub port: u16,
    /// Labels returned by `/detect_emotion`, in order, wrapping around.
    pub rotation: Vec<String>,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            rotation: vec![
                "neutral".into(),
                "neutral".into(),
                "happy".into(),
                "happy".into(),
                "surprise".into(),
                "sad".into(),
            ],
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Reject values the client cannot run with.
    pub fn validate(&self) -> Result<(), MoodChatError> {
        url::Url::parse(&self.server.base_url).map_err(|e| {
            MoodChatError::Config(format!("invalid server.base_url '{}': {e}", self.server.base_url))
        })?;
        if self.server.timeout_secs == 0 {
            return Err(MoodChatError::Config("server.timeout_secs must be > 0".into()));
        }
        if self.capture.interval_ms == 0 {
            return Err(MoodChatError::Config("capture.interval_ms must be > 0".into()));
        }
        if self.capture.width == 0 || self.capture.height == 0 {
            return Err(MoodChatError::Config(format!(
                "capture size must be non-zero, got {}x{}",
                self.capture.width, self.capture.height
            )));
        }
        if !(1..=100).contains(&self.capture.jpeg_quality) {
            return Err(MoodChatError::Config(format!(
                "capture.jpeg_quality must be 1-100, got {}",
                self.capture.jpeg_quality
            )));
        }
        if self.session.user_id.trim().is_empty() {
            return Err(MoodChatError::Config("session.user_id must not be empty".into()));
        }
        Ok(())
    }
}
