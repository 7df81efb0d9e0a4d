use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::provider::accuweather::{DEFAULT_BASE_URL, DEFAULT_LANGUAGE};

pub const ENV_API_KEY: &str = "ROUTE_WEATHER_API_KEY";
pub const ENV_LANGUAGE: &str = "ROUTE_WEATHER_LANGUAGE";
pub const ENV_BASE_URL: &str = "ROUTE_WEATHER_BASE_URL";

/// Weather provider credentials and request settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    /// Response language, e.g. "en-us" or "ru-ru".
    pub language: Option<String>,
    /// Override for the provider endpoint, mostly for testing.
    pub base_url: Option<String>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// [provider]
/// api_key = "..."
/// language = "ru-ru"
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "route-weather", "route-weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply `ROUTE_WEATHER_*` overrides. `lookup` is usually `std::env::var`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v: &String| !v.trim().is_empty());

        if let Some(key) = non_empty(ENV_API_KEY) {
            self.provider.api_key = Some(key);
        }
        if let Some(language) = non_empty(ENV_LANGUAGE) {
            self.provider.language = Some(language);
        }
        if let Some(url) = non_empty(ENV_BASE_URL) {
            self.provider.base_url = Some(url);
        }

        self
    }

    pub fn api_key(&self) -> Result<&str> {
        self.provider.api_key.as_deref().filter(|k| !k.is_empty()).ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `route-weather configure` or set {ENV_API_KEY}."
            )
        })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.provider.api_key = Some(api_key);
    }

    pub fn language(&self) -> &str {
        self.provider.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    pub fn set_language(&mut self, language: String) {
        self.provider.language = Some(language);
    }

    pub fn base_url(&self) -> &str {
        self.provider.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_ok()
    }
}
