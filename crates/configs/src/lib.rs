//! # configs
//!
//! Layered settings: built-in defaults, then `config/default.toml`, then
//! `config/{APP_ENV}.toml`, then `FHC__*` environment variables. Files are
//! optional. `.env` is loaded first so its values count as environment.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

pub const ENV_PREFIX: &str = "FHC";
pub const ENV_SEPARATOR: &str = "__";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub mail: MailSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Absent: run on the in-memory repositories.
    pub url: Option<SecretString>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Upper bound on closing the pool at shutdown.
    pub shutdown_timeout_secs: u64,
    pub run_migrations: bool,
    pub migrations_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: SecretString,
    pub token_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailSettings {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub from_address: String,
    pub from_name: Option<String>,
    pub starttls: bool,
    /// SMTP connection and command timeout.
    pub timeout_secs: u64,
    /// Broadcast time allowed per recipient; a batch gets this times its size.
    pub per_recipient_budget_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub format: LogFormat,
}

impl Settings {
    /// Loads `.env`, then layers `config/` files from the working directory
    /// and the process environment. `APP_ENV` picks the environment file
    /// (default `development`).
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let settings = Self::from_sources(Path::new("config"), &app_env, Self::environment())?;
        settings.validate()?;
        Ok(settings)
    }

    /// The environment source used by [`Settings::load`].
    pub fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
    }

    /// Builds settings from an explicit config directory and environment
    /// source, without validating.
    pub fn from_sources(config_dir: &Path, app_env: &str, env: Environment) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("database.max_connections", 10)?
            .set_default("database.acquire_timeout_secs", 5)?
            .set_default("database.shutdown_timeout_secs", 5)?
            .set_default("database.run_migrations", true)?
            .set_default("database.migrations_dir", "migrations")?
            .set_default("auth.jwt_secret", "")?
            .set_default("auth.token_ttl_minutes", 60 * 24 * 7)?
            .set_default("mail.enabled", false)?
            .set_default("mail.smtp_host", "localhost")?
            .set_default("mail.smtp_port", 587)?
            .set_default("mail.from_address", "alerts@fruit-health.local")?
            .set_default("mail.from_name", "Fruit Health Cloud")?
            .set_default("mail.starttls", true)?
            .set_default("mail.timeout_secs", 30)?
            .set_default("mail.per_recipient_budget_secs", 10)?
            .set_default("log.level", "info")?
            .set_default("log.format", "pretty")?
            .add_source(File::from(config_dir.join("default")).required(false))
            .add_source(File::from(config_dir.join(app_env)).required(false))
            .add_source(env)
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.expose_secret().trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "auth.jwt_secret",
                reason: "must be set (FHC__AUTH__JWT_SECRET)".into(),
            });
        }
        if self.auth.token_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                key: "auth.token_ttl_minutes",
                reason: "must be positive".into(),
            });
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "database.max_connections",
                reason: "must be at least 1".into(),
            });
        }
        if self.mail.enabled && self.mail.smtp_host.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "mail.smtp_host",
                reason: "required when mail is enabled".into(),
            });
        }
        if self.mail.per_recipient_budget_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "mail.per_recipient_budget_secs",
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }
}
