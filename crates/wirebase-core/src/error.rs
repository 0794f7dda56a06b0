//! Unified error handling for Wirebase Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::{ConfigError, ConnectionError, DeployError, MiddlewareError};

pub use crate::domain::ErrorCategory;

/// Root error type for Wirebase Core operations.
#[derive(Debug, Error, Clone)]
pub enum WirebaseError {
    /// A configuration lookup failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The database connection could not be resolved.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Middleware declarations were malformed.
    #[error(transparent)]
    Middleware(#[from] MiddlewareError),

    /// The deploy saga failed.
    #[error(transparent)]
    Deploy(#[from] DeployError),

    /// Errors from the application layer (source loading, adapters).
    #[error("Application error: {0}")]
    Application(#[from] ApplicationError),

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl WirebaseError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(ConfigError::KeyMissing { key }) => vec![
                format!("Set '{key}' in config/common.toml or the environment's config file"),
                "Run 'wirebase config sources' to see which files were loaded".into(),
            ],
            Self::Config(ConfigError::TypeMismatch { key, expected, .. }) => {
                vec![format!("Change '{key}' to a {expected}")]
            }
            Self::Config(ConfigError::InvalidKey { .. }) => {
                vec!["Keys are dot-separated, e.g. 'db.dbname'".into()]
            }
            Self::Connection(ConnectionError::MissingKey { key }) => vec![
                format!("Set '{key}', or set 'db.dsn' to a complete connection string"),
                "Credentials (db.username, db.password) are always required".into(),
            ],
            Self::Connection(ConnectionError::InvalidValue { key, .. }) => {
                vec![format!("Check the value of '{key}'")]
            }
            Self::Middleware(_) => vec![
                "Pre-router entries are names or { name, requires } tables".into(),
                "Post-router entries are { name, priority, requires? } tables".into(),
            ],
            Self::Deploy(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Internal { .. } => vec![
                "This appears to be a bug in Wirebase".into(),
                "Please report this issue at: https://github.com/cosecruz/wirebase/issues".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) | Self::Connection(_) | Self::Middleware(_) => {
                ErrorCategory::Configuration
            }
            Self::Deploy(DeployError::InvalidPlan(_)) => ErrorCategory::Validation,
            Self::Deploy(_) => ErrorCategory::Internal,
            Self::Application(e) => e.category(),
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Convenient result type alias.
pub type WirebaseResult<T> = Result<T, WirebaseError>;
