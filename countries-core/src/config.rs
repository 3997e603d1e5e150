use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::{directory::restcountries::DEFAULT_DIRECTORY_URL, provider::ProviderId};

/// Credentials and, optionally, a non-default endpoint for one weather provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Settings read from `config.toml`.
///
/// ```toml
/// default_provider = "openweather"
/// directory_url = "http://localhost:3001/api/all"
///
/// [providers.openweather]
/// api_key = "..."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub default_provider: Option<String>,

    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory_url: Option<String>,
}

impl Config {
    pub fn default_provider_id(&self) -> Result<ProviderId> {
        let name = self.default_provider.as_deref().ok_or_else(|| {
            anyhow!(
                "No default provider configured.\n\
                 Hint: run `countries configure <provider>` (e.g. `countries configure openweather`) first."
            )
        })?;

        name.parse()
    }

    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.default_provider = Some(id.to_string());
    }

    /// Country directory endpoint, falling back to the public instance.
    pub fn directory_url(&self) -> &str {
        self.directory_url.as_deref().unwrap_or(DEFAULT_DIRECTORY_URL)
    }

    pub fn provider(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    pub fn has_api_key(&self, id: ProviderId) -> bool {
        self.provider(id).is_some()
    }

    /// Set the API key for `id`, keeping any custom endpoint already stored.
    /// The first provider given a key becomes the default.
    pub fn store_api_key(&mut self, id: ProviderId, api_key: String) {
        self.providers
            .entry(id.to_string())
            .and_modify(|p| p.api_key.clone_from(&api_key))
            .or_insert_with(|| ProviderConfig { api_key: api_key.clone(), base_url: None });

        if self.default_provider.is_none() {
            self.set_default_provider(id);
        }
    }

    /// Load from the platform config directory; a missing file means defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Write to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "countries", "countries-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
