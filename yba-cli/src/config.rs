//! CLI configuration management

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use yba_console::FeatureFlags;

/// Environment variable that takes precedence over the stored API token
pub const TOKEN_ENV: &str = "YBA_API_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub default_server: String,
    pub default_output: String,
    pub api_token: Option<String>,
    pub customer_uuid: Option<String>,
    pub feature_flags: FeatureFlags,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_server: "http://localhost:9000".to_string(),
            default_output: "table".to_string(),
            api_token: None,
            customer_uuid: None,
            feature_flags: FeatureFlags::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(config_path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(config_path, contents)?;
        tracing::debug!("configuration saved");

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")?;
        Ok(PathBuf::from(home).join(".config/yba/cli.toml"))
    }

    /// API token from the environment, falling back to the stored one
    pub fn resolve_token(&self) -> Option<String> {
        Self::token_from(std::env::var(TOKEN_ENV).ok(), self.api_token.as_deref())
    }

    fn token_from(env_token: Option<String>, stored: Option<&str>) -> Option<String> {
        env_token
            .filter(|token| !token.is_empty())
            .or_else(|| stored.map(str::to_string))
    }
}
