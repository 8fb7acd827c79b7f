//! Configuration
//!
//! Layered, lowest priority first:
//!
//! 1. compiled-in defaults
//! 2. `~/.mathtutor/config.toml` (or the file given with `--config`)
//! 3. `MATHTUTOR__SECTION__KEY` environment variables
//! 4. `TELEGRAM_BOT_TOKEN` and `DEEPSEEK_API_KEY`
//!
//! Credentials are optional at load time; each command asks for the ones it
//! needs via [`Config::telegram_token`] / [`Config::deepseek_api_key`].

mod secret;

pub use secret::Secret;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::brain::provider::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::tutor::DEFAULT_CHUNK_LIMIT;

pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const DEEPSEEK_KEY_VAR: &str = "DEEPSEEK_API_KEY";
const ENV_PREFIX: &str = "MATHTUTOR";

/// Telegram refuses messages longer than this many UTF-16 code units.
///
/// `bot.chunk_limit` counts chars, so the clamp is exact for BMP text only;
/// answers heavy in emoji or math alphanumerics (two units each) can still
/// overrun it at the maximum limit. The 4000 default leaves some headroom.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not set; export it before starting the bot")]
    MissingCredential { var: &'static str },

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    pub deepseek: DeepSeekConfig,
    pub bot: BotConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: Option<Secret>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeepSeekConfig {
    #[serde(default)]
    pub api_key: Option<Secret>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl DeepSeekConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Maximum characters per answer message.
    pub chunk_limit: usize,
    /// Idle time after which a chat's session record is dropped.
    pub session_ttl_secs: u64,
    /// How often idle sessions are swept.
    pub sweep_interval_secs: u64,
}

impl BotConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Config {
    /// Load from the default locations and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Like [`Config::load`], but reads variables from `env` instead of the
    /// process environment when given.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let lookup = |var: &str| -> Option<String> {
            let value = match &env {
                Some(map) => map.get(var).cloned(),
                None => std::env::var(var).ok(),
            };
            value.filter(|v| !v.trim().is_empty())
        };

        let file = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::from(default_config_path()).required(false),
        };

        let settings = config::Config::builder()
            .set_default("deepseek.base_url", DEFAULT_BASE_URL)?
            .set_default("deepseek.model", DEFAULT_MODEL)?
            .set_default("deepseek.timeout_secs", 120_i64)?
            .set_default("bot.chunk_limit", DEFAULT_CHUNK_LIMIT as i64)?
            .set_default("bot.session_ttl_secs", 86_400_i64)?
            .set_default("bot.sweep_interval_secs", 600_i64)?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(env.clone()),
            )
            .set_override_option("telegram.token", lookup(TELEGRAM_TOKEN_VAR))?
            .set_override_option("deepseek.api_key", lookup(DEEPSEEK_KEY_VAR))?
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()
    }

    fn validate(mut self) -> Result<Self, ConfigError> {
        if self.bot.chunk_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "bot.chunk_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.bot.chunk_limit > TELEGRAM_MESSAGE_LIMIT {
            tracing::warn!(
                requested = self.bot.chunk_limit,
                "bot.chunk_limit exceeds Telegram's message limit, clamping to {}",
                TELEGRAM_MESSAGE_LIMIT
            );
            self.bot.chunk_limit = TELEGRAM_MESSAGE_LIMIT;
        }
        if self.deepseek.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "deepseek.timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.bot.sweep_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "bot.sweep_interval_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        match self.deepseek.temperature {
            Some(t) if !(0.0..=2.0).contains(&t) => {
                return Err(ConfigError::InvalidValue {
                    key: "deepseek.temperature",
                    reason: format!("{t} is outside 0.0..=2.0"),
                });
            }
            _ => {}
        }
        Ok(self)
    }

    /// The bot token, or a fatal error naming the variable to set.
    pub fn telegram_token(&self) -> Result<&Secret, ConfigError> {
        self.telegram
            .token
            .as_ref()
            .ok_or(ConfigError::MissingCredential {
                var: TELEGRAM_TOKEN_VAR,
            })
    }

    /// The DeepSeek API key, or a fatal error naming the variable to set.
    pub fn deepseek_api_key(&self) -> Result<&Secret, ConfigError> {
        self.deepseek
            .api_key
            .as_ref()
            .ok_or(ConfigError::MissingCredential {
                var: DEEPSEEK_KEY_VAR,
            })
    }
}

/// `~/.mathtutor`, or `./.mathtutor` when there is no home directory.
pub fn mathtutor_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mathtutor")
}

pub fn default_config_path() -> PathBuf {
    mathtutor_home().join("config.toml")
}
