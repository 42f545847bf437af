//! Error handling for MenuGate
//!
//! This module defines the main error type used throughout the application
//! and how each failure class is treated (recoverable or not, severity).

use thiserror::Error;

/// Main error type for MenuGate application
#[derive(Error, Debug)]
pub enum MenuGateError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Result type alias for MenuGate operations
pub type Result<T> = std::result::Result<T, MenuGateError>;

impl MenuGateError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            MenuGateError::Database(_) => false,
            MenuGateError::Migration(_) => false,
            MenuGateError::Telegram(_) => true,
            MenuGateError::Transport(_) => true,
            MenuGateError::Config(_) => false,
            MenuGateError::PermissionDenied(_) => false,
            MenuGateError::InvalidStateTransition { .. } => false,
            MenuGateError::Redis(_) => true,
            MenuGateError::Serialization(_) => false,
            MenuGateError::Io(_) => true,
            MenuGateError::UrlParse(_) => false,
            MenuGateError::InvalidInput(_) => false,
            MenuGateError::ServiceUnavailable(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            MenuGateError::Database(_) => ErrorSeverity::Critical,
            MenuGateError::Migration(_) => ErrorSeverity::Critical,
            MenuGateError::Config(_) => ErrorSeverity::Critical,
            MenuGateError::PermissionDenied(_) => ErrorSeverity::Warning,
            MenuGateError::InvalidStateTransition { .. } => ErrorSeverity::Warning,
            MenuGateError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// Whether Telegram rejected an edit because nothing changed
    pub fn is_not_modified(&self) -> bool {
        match self {
            MenuGateError::Telegram(teloxide::RequestError::Api(teloxide::ApiError::MessageNotModified)) => true,
            MenuGateError::Telegram(e) => e.to_string().to_lowercase().contains("message is not modified"),
            MenuGateError::Transport(msg) => msg.to_lowercase().contains("message is not modified"),
            _ => false,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_mapping() {
        assert_eq!(MenuGateError::Config("x".into()).severity(), ErrorSeverity::Critical);
        assert_eq!(MenuGateError::InvalidInput("x".into()).severity(), ErrorSeverity::Info);
        assert_eq!(MenuGateError::PermissionDenied("x".into()).severity(), ErrorSeverity::Warning);
        assert_eq!(MenuGateError::Transport("x".into()).severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_not_modified_detection() {
        let err = MenuGateError::Telegram(teloxide::RequestError::Api(teloxide::ApiError::MessageNotModified));
        assert!(err.is_not_modified());
        assert!(MenuGateError::Transport("Bad Request: message is not modified".into()).is_not_modified());
        assert!(!MenuGateError::Transport("chat not found".into()).is_not_modified());
    }

    #[test]
    fn test_recoverable() {
        assert!(MenuGateError::ServiceUnavailable("redis".into()).is_recoverable());
        assert!(!MenuGateError::Config("token".into()).is_recoverable());
    }
}
