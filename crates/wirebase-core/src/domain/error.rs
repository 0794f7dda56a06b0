// ============================================================================
// domain/error.rs - ERROR DOMAIN
// ============================================================================

use thiserror::Error;

/// Lookup and shape errors raised by [`crate::domain::ConfigTree`].
///
/// Callers doing optional reads are expected to guard with `has` first; an
/// unguarded `get` on an absent key surfaces `KeyMissing` as a fatal
/// bootstrap error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("configuration key '{key}' is not set")]
    KeyMissing { key: String },

    #[error("configuration key '{key}' is a {found}, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid configuration key '{key}'")]
    InvalidKey { key: String },
}

/// Raised while resolving the database connection string.
///
/// Fatal: there is no degraded mode without a database.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConnectionError {
    #[error("cannot resolve database connection: '{key}' is not configured")]
    MissingKey { key: String },

    #[error("cannot resolve database connection: '{key}' {reason}")]
    InvalidValue { key: String, reason: String },
}

/// An optional middleware's backing facility is not present at runtime.
///
/// Recovered locally by skipping the registration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("middleware '{middleware}' skipped: facility '{facility}' is not available")]
pub struct FacilityUnavailable {
    pub middleware: String,
    pub facility: String,
}

/// Malformed middleware declarations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MiddlewareError {
    #[error("invalid middleware declaration at '{key}': {reason}")]
    InvalidDeclaration { key: String, reason: String },

    #[error("middleware identifier must not be empty")]
    EmptyIdentifier,
}

/// Failures of the deployment saga.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DeployError {
    #[error("invalid deploy plan: {0}")]
    InvalidPlan(String),

    #[error("deploy step '{step}' failed: {reason}")]
    StepFailed {
        step: String,
        reason: String,
        /// Whether the compensating action ran successfully afterwards.
        compensated: bool,
    },

    #[error(
        "deploy step '{step}' failed ({reason}) and compensation '{compensation}' also failed: {compensation_reason}"
    )]
    CompensationFailed {
        step: String,
        reason: String,
        compensation: String,
        compensation_reason: String,
    },
}

impl DeployError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidPlan(msg) => vec![format!("Fix the deploy plan: {msg}")],
            Self::StepFailed { step, compensated, .. } => {
                let mut out = vec![format!("Inspect the output of step '{step}'")];
                if *compensated {
                    out.push("The deploy lock was released; it is safe to retry".into());
                }
                out
            }
            Self::CompensationFailed { compensation, .. } => vec![
                format!("The compensating step '{compensation}' did not complete"),
                "The deploy target may still be locked; release it manually before retrying"
                    .into(),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    Internal,
}
