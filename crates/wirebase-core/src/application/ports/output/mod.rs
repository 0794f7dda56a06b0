//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `wirebase-adapters` crate provides implementations.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{ConfigTree, ConnectionSettings, DeployStep, FacilityUnavailable, SessionOptions};
use crate::error::WirebaseResult;

/// Port for one layer of configuration.
///
/// Implemented by:
/// - `wirebase_adapters::config_source::TomlFileSource` (one TOML document)
/// - `wirebase_adapters::config_source::FragmentDirSource` (a directory of fragments)
/// - `wirebase_adapters::config_source::StaticSource` (in-memory)
pub trait ConfigSource: Send + Sync {
    /// Human-readable name used in logs and error messages.
    fn name(&self) -> &str;

    /// Load this layer. An optional source that does not exist yields an
    /// empty tree.
    fn load(&self) -> WirebaseResult<ConfigTree>;
}

/// A live (or deferred) database handle produced by a [`ConnectionFactory`].
pub trait DatabaseHandle: Send + Sync + fmt::Debug {
    /// Identity of this handle; two `connect` calls give two ids.
    fn id(&self) -> Uuid;

    fn dsn(&self) -> &str;

    fn session_options(&self) -> &SessionOptions;
}

/// Port to the external connection library.
///
/// Every call constructs a new handle. Callers cache the result.
#[cfg_attr(test, mockall::automock)]
pub trait ConnectionFactory: Send + Sync {
    fn connect(&self, settings: &ConnectionSettings) -> WirebaseResult<Arc<dyn DatabaseHandle>>;
}

/// Port answering "is this optional facility loadable in this runtime?".
pub trait FacilityCheck: Send + Sync {
    /// `Ok(())` when `facility` is available.
    fn require(&self, middleware: &str, facility: &str) -> Result<(), FacilityUnavailable>;
}

/// Port that executes one deploy step.
///
/// Implemented by:
/// - `wirebase_adapters::deploy::ShellStepRunner` (production)
/// - `wirebase_adapters::deploy::RecordingStepRunner` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait StepRunner: Send + Sync {
    fn run(&self, step: &DeployStep) -> WirebaseResult<()>;
}
