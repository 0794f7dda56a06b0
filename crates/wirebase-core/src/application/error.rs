//! Application layer errors.
//!
//! These errors represent failures in orchestration and in the adapters
//! behind the ports, not rule violations. Rule violations are the domain
//! errors in `crate::domain::error`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A required configuration source does not exist.
    #[error("Configuration source '{source_name}' not found at {path}")]
    SourceMissing { source_name: String, path: PathBuf },

    /// A configuration source exists but could not be read or parsed.
    #[error("Configuration source '{source_name}' is invalid: {reason}")]
    SourceInvalid { source_name: String, reason: String },

    /// The connection factory refused to build a handle.
    #[error("Database connection failed: {reason}")]
    ConnectFailed { reason: String },

    /// A deploy step's command could not be run or exited non-zero.
    #[error("Step '{step}' failed: {reason}")]
    StepExecution { step: String, reason: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::SourceMissing { path, .. } => vec![
                format!("Create {}", path.display()),
                "Or pass --base to point at the application root".into(),
            ],
            Self::SourceInvalid { source_name, .. } => vec![
                format!("Fix the syntax of '{source_name}'"),
                "Config files are TOML documents".into(),
            ],
            Self::ConnectFailed { .. } => vec![
                "Check the resolved DSN with 'wirebase dsn'".into(),
            ],
            Self::StepExecution { step, .. } => vec![
                format!("Check 'deploy.tasks.{step}' in your configuration"),
                "Run with -vv to see the command output".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SourceMissing { .. } => ErrorCategory::NotFound,
            Self::SourceInvalid { .. } => ErrorCategory::Configuration,
            Self::ConnectFailed { .. } | Self::StepExecution { .. } | Self::FilesystemError { .. } => {
                ErrorCategory::Internal
            }
        }
    }
}
