//! Configuration and settings management
//!
//! Loads settings from a YAML file with environment overrides on top.

use config::{Config, Environment, File, FileFormat, Source};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable holding the path to the config file.
pub const CONFIG_PATH_ENV: &str = "CAMSNAP_CONFIG";
/// Config file used when `CAMSNAP_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.yml";
/// Prefix of environment variables overriding file values.
pub const ENV_PREFIX: &str = "CAMSNAP";

/// Errors raised while loading settings
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file is missing, malformed, or does not match the settings shape
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    /// `telegram.bot_token` is absent or blank
    #[error("telegram.bot_token is not set")]
    MissingBotToken,
}

/// Application settings, loaded once at startup and never mutated
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    /// Telegram bot settings
    #[serde(default)]
    pub telegram: TelegramSettings,
    /// Camera settings
    #[serde(default)]
    pub camera: CameraSettings,
}

/// Telegram section of the config file
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TelegramSettings {
    /// Telegram Bot API token
    #[serde(default)]
    pub bot_token: String,
    /// Text sent in reply to `/start`
    #[serde(default = "default_welcome_msg")]
    pub welcome_msg: String,
    /// Telegram user IDs allowed to use the bot
    #[serde(default)]
    pub allowed_users: Vec<i64>,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            welcome_msg: default_welcome_msg(),
            allowed_users: Vec::new(),
        }
    }
}

/// Camera section of the config file
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CameraSettings {
    /// Output file for the captured frame; the extension picks the encoder
    #[serde(default = "default_filename")]
    pub filename: PathBuf,
    /// Index of the capture device
    #[serde(default)]
    pub device_id: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            filename: default_filename(),
            device_id: 0,
        }
    }
}

fn default_welcome_msg() -> String {
    "📷 Камера на связи. Отправьте /photo, чтобы получить снимок.".to_string()
}

fn default_filename() -> PathBuf {
    PathBuf::from("snapshot.jpg")
}

/// Returns the config file path from `CAMSNAP_CONFIG` or the default.
#[must_use]
pub fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .ok()
        .filter(|s| !s.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Environment layer applied on top of the config file.
///
/// Nested keys use `__`, e.g. `CAMSNAP_TELEGRAM__BOT_TOKEN`.
/// `CAMSNAP_TELEGRAM__ALLOWED_USERS` takes a comma-separated list.
#[must_use]
pub fn env_overrides() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("telegram.allowed_users")
        .ignore_empty(true)
}

impl Settings {
    /// Load settings from the YAML file at `path` plus environment overrides.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use camsnap_core::config::{config_path, Settings};
    ///
    /// let settings = Settings::load(config_path()).expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if the file is missing or malformed and
    /// `ConfigError::MissingBotToken` if the bot token is empty.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_string_lossy().into_owned();
        Self::from_sources(
            File::new(&path, FileFormat::Yaml).required(true),
            env_overrides(),
        )
    }

    /// Build settings from an arbitrary file source and environment layer.
    ///
    /// # Errors
    ///
    /// Same as [`Settings::load`].
    pub fn from_sources<S>(file: S, env: Environment) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let settings: Self = Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(ConfigError::MissingBotToken);
        }
        Ok(())
    }

    /// Returns true if `user_id` is on the allow-list.
    #[must_use]
    pub fn is_allowed(&self, user_id: i64) -> bool {
        crate::access::is_allowed(user_id, &self.telegram.allowed_users)
    }
}
