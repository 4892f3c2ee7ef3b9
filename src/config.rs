// Settings for the inventory API and the HTTP listener
// Sources, lowest to highest priority: defaults, config.toml, STOCK_API_* env vars

use anyhow::{Context, Result};
use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    // STOCK_API_KEY, part of the request path
    #[serde(rename = "key")]
    pub api_key: String,
    pub country: String,
    pub base_url: String,
    pub server_address: String,
    pub request_timeout_secs: u64,
}

impl Settings {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let builder = Config::builder()
            // Load from a configuration file (e.g., config.toml)
            .add_source(File::with_name("config").required(false))
            // STOCK_API_KEY -> key, STOCK_API_BASE_URL -> base_url
            .add_source(Environment::with_prefix("STOCK_API").prefix_separator("_"));

        Self::from_builder(builder)
    }

    // Applies defaults on top of whatever sources the builder already has
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings: Settings = builder
            .set_default("country", "it")?
            .set_default("base_url", "https://stock-api.dealerk.com")?
            .set_default("server_address", "127.0.0.1:3000")?
            .set_default("request_timeout_secs", 10)?
            .build()?
            .try_deserialize()
            .context("STOCK_API_KEY is required")?;

        if settings.api_key.trim().is_empty() {
            anyhow::bail!("STOCK_API_KEY is required");
        }
        Ok(settings)
    }

    // Only the first 8 characters ever reach the logs
    pub fn masked_key(&self) -> String {
        let prefix: String = self.api_key.chars().take(8).collect();
        format!("{}...", prefix)
    }
}
