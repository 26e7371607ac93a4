//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (the wagering API token) are referenced by env-var name in the
//! config and resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::fs;

use crate::store::DEFAULT_MAX_SELECTIONS;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub slip: SlipConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SlipConfig {
    /// Stake given to a selection added without one.
    #[serde(default = "default_stake")]
    pub default_stake: Decimal,
    #[serde(default = "default_max_selections")]
    pub max_selections: usize,
}

impl Default for SlipConfig {
    fn default() -> Self {
        Self {
            default_stake: default_stake(),
            max_selections: default_max_selections(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SubmissionConfig {
    /// Log batches instead of sending them.
    #[serde(default = "default_true")]
    pub dry_run: bool,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Name of the env var holding the API bearer token.
    #[serde(default = "default_token_env")]
    pub api_token_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            dry_run: true,
            base_url: None,
            api_token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_port(),
        }
    }
}

fn default_stake() -> Decimal {
    dec!(10)
}

fn default_max_selections() -> usize {
    DEFAULT_MAX_SELECTIONS
}

fn default_true() -> bool {
    true
}

fn default_token_env() -> String {
    "BOLETO_API_TOKEN".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_port() -> u16 {
    8080
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse configuration from TOML text and check it for consistency.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents).context("Invalid TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.slip.default_stake <= Decimal::ZERO {
            anyhow::bail!("slip.default_stake must be positive");
        }
        if self.slip.max_selections == 0 {
            anyhow::bail!("slip.max_selections must be at least 1");
        }
        if !self.submission.dry_run && self.submission.base_url.is_none() {
            anyhow::bail!("submission.base_url is required unless dry_run is set");
        }
        Ok(())
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
