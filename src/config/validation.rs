//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{MenuGateError, Result};
use super::{Settings, StateBackend};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_database_config(&settings.database)?;
    validate_state_config(&settings.state)?;
    if settings.state.backend == StateBackend::Redis {
        validate_redis_config(&settings.redis)?;
    }
    validate_gate_config(&settings.gate)?;
    validate_broadcast_config(&settings.broadcast)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.trim().is_empty() {
        return Err(MenuGateError::Config(
            "Bot token is required".to_string()
        ));
    }

    if let Some(id) = config.super_admin_id {
        if id <= 0 {
            return Err(MenuGateError::Config(
                format!("Super admin id must be a positive user id, got {}", id)
            ));
        }
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(MenuGateError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(MenuGateError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(MenuGateError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate navigation state configuration
fn validate_state_config(config: &super::StateConfig) -> Result<()> {
    if config.idle_ttl_seconds == 0 {
        return Err(MenuGateError::Config(
            "State idle TTL must be greater than 0".to_string()
        ));
    }

    if config.cleanup_interval_seconds == 0 {
        return Err(MenuGateError::Config(
            "State cleanup interval must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(MenuGateError::Config(
            "Redis URL is required when the redis state backend is selected".to_string()
        ));
    }

    Ok(())
}

/// Validate subscription gate configuration
fn validate_gate_config(config: &super::GateConfig) -> Result<()> {
    if config.check_timeout_seconds == 0 {
        return Err(MenuGateError::Config(
            "Gate check timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate broadcast configuration
fn validate_broadcast_config(config: &super::BroadcastConfig) -> Result<()> {
    if config.delay_ms == 0 {
        return Err(MenuGateError::Config(
            "Broadcast delay must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(MenuGateError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(MenuGateError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
