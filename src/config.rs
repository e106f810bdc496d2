use anyhow::{Context, Result};
use assertive_rewriter::HubModel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schema_version: u32,
    /// `null` switches sentiment analysis off.
    pub sentiment_model: Option<HubModel>,
    pub emotion_model: HubModel,
    /// Run on this CUDA device instead of the CPU.
    pub cuda_device: Option<usize>,
    /// Load models at startup rather than on the first request.
    pub eager_load: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: 1,
            sentiment_model: Some(HubModel::default_sentiment()),
            emotion_model: HubModel::english_emotion(),
            cuda_device: None,
            eager_load: true,
        }
    }
}

impl Config {
    /// Load config from file, or fall back to defaults
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file, creating its directory if needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")
    }

    pub fn default_config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(".assertive-rewriter"))
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::default_config_dir()?.join("config.json"))
    }
}
