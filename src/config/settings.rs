//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
    pub webhook_url: Option<String>,
    /// Identity guaranteed to hold super-admin rights
    pub super_admin_id: Option<i64>,
    /// Extra admins granted access without a database record
    #[serde(default)]
    pub admin_ids: Vec<i64>,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Where per-user navigation state lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StateBackend {
    Memory,
    Redis,
}

/// Navigation state configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StateConfig {
    pub backend: StateBackend,
    /// Idle time after which a user's position is forgotten
    pub idle_ttl_seconds: u64,
    pub cleanup_interval_seconds: u64,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
    pub ttl_seconds: u64,
}

/// Subscription gate configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GateConfig {
    /// Upper bound for a single membership query
    pub check_timeout_seconds: u64,
}

/// Broadcast configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BroadcastConfig {
    /// Fixed pause between two deliveries
    pub delay_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
    #[serde(default)]
    pub json: bool,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("MENUGATE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("bot.admin_ids")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::MenuGateError> {
        super::validation::validate_settings(self)
    }

    /// Whether the given user is the configured super-admin
    pub fn is_configured_super_admin(&self, user_id: i64) -> bool {
        self.bot.super_admin_id == Some(user_id)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://menugate.db?mode=rwc".to_string(),
            max_connections: 5,
            min_connections: 1,
        }
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            backend: StateBackend::Memory,
            idle_ttl_seconds: 60 * 60 * 24,
            cleanup_interval_seconds: 300,
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            prefix: "menugate:".to_string(),
            ttl_seconds: 60 * 60 * 24,
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self { check_timeout_seconds: 10 }
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self { delay_ms: 50 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: "logs".to_string(),
            json: false,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
                webhook_url: None,
                super_admin_id: None,
                admin_ids: vec![],
            },
            database: DatabaseConfig::default(),
            state: StateConfig::default(),
            redis: RedisConfig::default(),
            gate: GateConfig::default(),
            broadcast: BroadcastConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.state.backend, StateBackend::Memory);
        assert_eq!(settings.broadcast.delay_ms, 50);
        assert!(settings.database.url.starts_with("sqlite:"));
    }

    #[test]
    fn test_configured_super_admin() {
        let mut settings = Settings::default();
        assert!(!settings.is_configured_super_admin(1));
        settings.bot.super_admin_id = Some(1);
        assert!(settings.is_configured_super_admin(1));
        assert!(!settings.is_configured_super_admin(2));
    }

    #[test]
    fn test_state_backend_deserialize() {
        let backend: StateBackend = serde_json::from_str("\"redis\"").unwrap();
        assert_eq!(backend, StateBackend::Redis);
    }
}
