use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub narrative: NarrativeConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    FootballData,
    ApiFootball,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Override the provider base URL (used by tests against a local mock).
    pub base_url: Option<String>,
    /// Competition filter passed to the provider. Codes for football-data,
    /// numeric league ids for API-FOOTBALL. Empty means no filter.
    pub competitions: Vec<String>,
    /// Days fetched either side of the requested day before filtering back
    /// down to the exact local date.
    pub window_days: u32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NarrativeConfig {
    pub model: String,
    pub max_tokens: u32,
    /// Override the LLM API base URL (used by tests against a local mock).
    pub base_url: Option<String>,
    /// How many recent fixtures feed a team's form line.
    pub form_matches: u32,
    /// How many historical meetings feed the head-to-head tally.
    pub head_to_head_limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Secrets loaded exclusively from environment variables.
/// Not serializable, not stored in config files.
pub struct Secrets {
    pub football_data_api_key: Option<String>,
    pub api_football_key: Option<String>,
    pub anthropic_api_key: Option<String>,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self {
            football_data_api_key: std::env::var("FOOTBALL_DATA_API_KEY").ok(),
            api_football_key: std::env::var("API_FOOTBALL_KEY").ok(),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, overlaying environment variables
    /// for secrets.
    pub fn load(config_path: &Path) -> Result<(Self, Secrets)> {
        dotenvy::dotenv().ok();

        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        let secrets = Secrets::from_env();

        Ok((config, secrets))
    }
}
