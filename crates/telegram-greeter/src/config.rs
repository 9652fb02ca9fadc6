//! Configuration management for telegram-greeter

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use greeter_core::config::{
    default_trigger_phrase, DEFAULT_GREETING_THRESHOLD, DEFAULT_TRIGGER_COOLDOWN_SECS,
};
use greeter_core::{GateConfig, Messages};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::env::ReadEnv;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("bot token is not set (TELEGRAM_BOT_TOKEN or TG_TOKEN)")]
    MissingToken,

    #[error("{key} must be a non-negative integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    #[error(transparent)]
    Gate(#[from] greeter_core::ConfigError),
}

/// Complete bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub telegram: TelegramBotConfig,
    #[serde(default)]
    pub gate: GateSection,
    #[serde(default)]
    pub messages: Messages,
}

/// Telegram bot specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramBotConfig {
    /// Bot token from BotFather
    #[serde(default)]
    pub bot_token: String,
    /// Handle every update concurrently instead of serialising per chat
    #[serde(default)]
    pub concurrent_updates: bool,
}

/// Gate thresholds as they appear in the TOML file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GateSection {
    #[serde(default = "default_greeting_threshold")]
    pub greeting_threshold: u64,
    /// Empty disables the keyword reply
    #[serde(default = "default_trigger_phrase")]
    pub trigger_phrase: String,
    #[serde(default = "default_trigger_cooldown_secs")]
    pub trigger_cooldown_secs: u64,
}

fn default_greeting_threshold() -> u64 {
    DEFAULT_GREETING_THRESHOLD
}

fn default_trigger_cooldown_secs() -> u64 {
    DEFAULT_TRIGGER_COOLDOWN_SECS
}

impl Default for GateSection {
    fn default() -> Self {
        Self {
            greeting_threshold: default_greeting_threshold(),
            trigger_phrase: default_trigger_phrase(),
            trigger_cooldown_secs: default_trigger_cooldown_secs(),
        }
    }
}

impl GateSection {
    pub fn to_gate_config(&self) -> GateConfig {
        GateConfig {
            greeting_threshold: self.greeting_threshold,
            trigger_phrase: self.trigger_phrase.clone(),
            trigger_cooldown: Duration::from_secs(self.trigger_cooldown_secs),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Startup entry point: the file at `path` when it exists, the environment
    /// otherwise. `cli_token` takes precedence over both token sources.
    pub fn load<E: ReadEnv>(path: &str, cli_token: Option<String>, env: &E) -> Result<Self> {
        if Path::new(path).exists() {
            info!("Loading config from file: {}", path);
            let mut config = Self::from_file(path)?;
            if let Some(bot_token) = cli_token.or_else(|| env_token(env)) {
                config.telegram.bot_token = bot_token;
            }
            Ok(config)
        } else {
            info!("Config file not found, using environment variables");
            Ok(Self::from_env_with_token(env, cli_token)?)
        }
    }

    /// Load configuration from environment variables
    pub fn from_env<E: ReadEnv>(env: &E) -> Result<Self, ConfigError> {
        Self::from_env_with_token(env, None)
    }

    fn from_env_with_token<E: ReadEnv>(
        env: &E,
        bot_token: Option<String>,
    ) -> Result<Self, ConfigError> {
        let bot_token = bot_token
            .or_else(|| env_token(env))
            .ok_or(ConfigError::MissingToken)?;

        let concurrent_updates = env
            .var("CONCURRENT_UPDATES")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let mut gate = GateSection::default();
        if let Some(threshold) = read_number(env, "GREETING_THRESHOLD")? {
            gate.greeting_threshold = threshold;
        }
        if let Some(cooldown) = read_number(env, "TRIGGER_COOLDOWN_SECS")? {
            gate.trigger_cooldown_secs = cooldown;
        }
        if let Ok(phrase) = env.var("TRIGGER_PHRASE") {
            gate.trigger_phrase = phrase;
        }

        let mut messages = Messages::default();
        if let Ok(url) = env.var("RULES_PREVIEW_URL") {
            messages.rules_preview_url = Some(url);
        }

        Ok(Config {
            telegram: TelegramBotConfig {
                bot_token,
                concurrent_updates,
            },
            gate,
            messages,
        })
    }

    /// Checks that must hold before the bot starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        self.messages.validate(&self.gate.to_gate_config())?;
        Ok(())
    }
}

fn env_token<E: ReadEnv>(env: &E) -> Option<String> {
    env.var("TELEGRAM_BOT_TOKEN")
        .or_else(|_| env.var("TG_TOKEN"))
        .ok()
}

fn read_number<E: ReadEnv>(env: &E, key: &'static str) -> Result<Option<u64>, ConfigError> {
    match env.var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
        Err(_) => Ok(None),
    }
}
