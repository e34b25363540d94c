use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use crate::gemini::{DEFAULT_IMAGE_MODEL, DEFAULT_VIDEO_MODEL};

/// Which backend renders still images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImageBackend {
    #[default]
    Gemini,
    HuggingFace,
}

/// Settings exposed to the frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub gemini_api_key: String,
    pub huggingface_token: String,
    pub image_backend: ImageBackend,
    pub video_aspect_ratio: String,
}

/// Internal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub schema_version: u32,
    pub gemini_api_key: String,
    pub huggingface_token: String,
    pub image_backend: ImageBackend,
    pub image_model: String,
    pub video_model: String,
    pub video_aspect_ratio: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: 1,
            gemini_api_key: String::new(),
            huggingface_token: String::new(),
            image_backend: ImageBackend::Gemini,
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
            video_aspect_ratio: "9:16".to_string(),
        }
    }
}

impl Config {
    /// Get the app config directory
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(".mesversario-studio"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Get the history file path
    pub fn history_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("history.json"))
    }

    /// Load config from file or return default
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                debug!("Failed to load config, using default: {}", e);
                Self::default()
            }
        }
    }

    /// Load config from file
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Convert to frontend Settings
    pub fn to_settings(&self) -> Settings {
        Settings {
            gemini_api_key: self.gemini_api_key.clone(),
            huggingface_token: self.huggingface_token.clone(),
            image_backend: self.image_backend,
            video_aspect_ratio: self.video_aspect_ratio.clone(),
        }
    }

    /// Update from frontend Settings
    pub fn update_from_settings(&mut self, settings: &Settings) {
        self.gemini_api_key = settings.gemini_api_key.trim().to_string();
        self.huggingface_token = settings.huggingface_token.trim().to_string();
        self.image_backend = settings.image_backend;
        self.video_aspect_ratio = settings.video_aspect_ratio.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.schema_version, 1);
        assert_eq!(config.image_backend, ImageBackend::Gemini);
        assert_eq!(config.image_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(config.video_model, DEFAULT_VIDEO_MODEL);
        assert_eq!(config.video_aspect_ratio, "9:16");
        assert!(config.gemini_api_key.is_empty());
    }

    #[test]
    fn test_settings_roundtrip() {
        let settings = Settings {
            gemini_api_key: "key-123".to_string(),
            huggingface_token: "hf_tok".to_string(),
            image_backend: ImageBackend::HuggingFace,
            video_aspect_ratio: "16:9".to_string(),
        };

        let mut config = Config::default();
        config.update_from_settings(&settings);

        assert_eq!(config.gemini_api_key, "key-123");
        assert_eq!(config.huggingface_token, "hf_tok");
        assert_eq!(config.image_backend, ImageBackend::HuggingFace);
        assert_eq!(config.video_aspect_ratio, "16:9");

        let back = config.to_settings();
        assert_eq!(back.gemini_api_key, "key-123");
        assert_eq!(back.image_backend, ImageBackend::HuggingFace);
    }

    #[test]
    fn test_update_trims_keys() {
        let settings = Settings {
            gemini_api_key: "  key  ".to_string(),
            huggingface_token: " tok ".to_string(),
            image_backend: ImageBackend::Gemini,
            video_aspect_ratio: "9:16".to_string(),
        };

        let mut config = Config::default();
        config.update_from_settings(&settings);
        assert_eq!(config.gemini_api_key, "key");
        assert_eq!(config.huggingface_token, "tok");
    }

    #[test]
    fn test_config_dir() {
        let path = Config::config_dir().unwrap();
        assert!(path.to_string_lossy().contains(".mesversario-studio"));
    }

    #[test]
    fn test_config_path() {
        let path = Config::config_path().unwrap();
        assert!(path.to_string_lossy().ends_with("config.json"));
    }

    #[test]
    fn test_history_path() {
        let path = Config::history_path().unwrap();
        assert!(path.to_string_lossy().ends_with("history.json"));
    }
}
