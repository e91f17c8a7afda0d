use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::error::{AppError, Result};
use crate::models::Difficulty;
use crate::services::Destination;

const CONFIG_PATH_ENV: &str = "DAILY_LEETCODE_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_recommended_list_id")]
    pub recommended_list_id: String,

    #[serde(default = "default_difficulties")]
    pub difficulties: Vec<Difficulty>,

    pub request_timeout_secs: Option<u64>,

    pub slack_webhook_url: Option<String>,
    pub discord_webhook_url: Option<String>,

    #[serde(default = "default_discord_username")]
    pub discord_username: String,
}

fn default_base_url() -> String {
    "https://leetcode.com/".to_string()
}

fn default_recommended_list_id() -> String {
    "xo2bgr0r".to_string()
}

fn default_difficulties() -> Vec<Difficulty> {
    vec![Difficulty::Easy]
}

fn default_discord_username() -> String {
    "LeetCode Daily".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            recommended_list_id: default_recommended_list_id(),
            difficulties: default_difficulties(),
            request_timeout_secs: None,
            slack_webhook_url: None,
            discord_webhook_url: None,
            discord_username: default_discord_username(),
        }
    }
}

impl Config {
    /// Defaults, then the TOML file, then `.env` / process environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(Self::config_path);

        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("daily-leetcode")
            .join("config.toml")
    }

    /// Override fields from environment variables. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("SLACK_WEBHOOK_URL") {
            self.slack_webhook_url = Some(url);
        }
        if let Some(url) = get("DISCORD_WEBHOOK_URL") {
            self.discord_webhook_url = Some(url);
        }
        if let Some(username) = get("DISCORD_USERNAME") {
            self.discord_username = username;
        }
        if let Some(base) = get("LEETCODE_BASE_URL") {
            self.base_url = base;
        }
        if let Some(list) = get("LEETCODE_DIFFICULTIES") {
            let parsed: Result<Vec<Difficulty>> = list
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(str::parse)
                .collect();
            match parsed {
                Ok(difficulties) => self.difficulties = difficulties,
                Err(e) => tracing::warn!("Ignoring LEETCODE_DIFFICULTIES: {}", e),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.base_url()?;
        if self.difficulties.is_empty() {
            return Err(AppError::Config("difficulties must not be empty".to_string()));
        }
        if self.destinations().is_empty() {
            return Err(AppError::Config(
                "no webhook configured: set SLACK_WEBHOOK_URL or DISCORD_WEBHOOK_URL".to_string(),
            ));
        }
        Ok(())
    }

    /// Base URL with a guaranteed trailing slash so relative joins keep its path.
    pub fn base_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn destinations(&self) -> Vec<Destination> {
        let mut destinations = Vec::new();
        if let Some(url) = &self.slack_webhook_url {
            destinations.push(Destination::Slack { url: url.clone() });
        }
        if let Some(url) = &self.discord_webhook_url {
            destinations.push(Destination::Discord {
                url: url.clone(),
                username: self.discord_username.clone(),
            });
        }
        destinations
    }
}
