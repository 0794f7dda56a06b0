// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Wirebase.
//!
//! Pure values and the rules that govern them. All I/O (reading config
//! files, opening connections, running deploy commands) is reached through
//! ports defined in the application layer.
//!
//! - **No async**: bootstrap is synchronous
//! - **No I/O**: no filesystem, network, or process calls
//! - **No tracing**: observability belongs to the application and CLI layers
//! - **Immutable results**: a finished `ConfigTree` or `MiddlewareChain` is
//!   only ever read
pub mod config;
pub mod connection;
pub mod deploy;
pub mod environment;
pub mod error;
pub mod middleware;

pub use config::{ConfigTree, ConfigValue, Table};
pub use connection::{
    ConnectionSettings, ConnectionSpec, Credentials, DEFAULT_DRIVER, DsnSource, MASKED_SECRET,
    SessionOptions, mask_credentials,
};
pub use deploy::{DeployPlan, DeployStep, STANDARD_STEPS};
pub use environment::Environment;
pub use error::{
    ConfigError, ConnectionError, DeployError, ErrorCategory, FacilityUnavailable,
    MiddlewareError,
};
pub use middleware::{
    MiddlewareChain, MiddlewareFragment, MiddlewareId, Phase, Placement, PlanEntry, Registration,
};
