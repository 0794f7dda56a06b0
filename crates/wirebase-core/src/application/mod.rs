//! Application layer for Wirebase.
//!
//! This layer contains:
//! - **Services**: bootstrap use cases (compose config, resolve the
//!   connection, compose middleware, run a deploy)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer and emits tracing
//! events; the rules themselves live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    ConfigComposer, ConnectionResolver, DeployReport, DeployService, HttpClientSettings,
    MiddlewareComposer, TemplateSettings,
};

// Re-export port traits (for adapter implementation)
pub use ports::{ConfigSource, ConnectionFactory, DatabaseHandle, FacilityCheck, StepRunner};

pub use error::ApplicationError;
