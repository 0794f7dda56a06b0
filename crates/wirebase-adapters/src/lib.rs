//! Infrastructure adapters for Wirebase.
//!
//! This crate implements the ports defined in `wirebase-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod config_source;
pub mod connection;
pub mod deploy;
pub mod facility;

// Re-export commonly used adapters
pub use config_source::{FragmentDirSource, StaticSource, TomlFileSource};
pub use connection::{DeferredConnection, DeferredConnectionFactory};
pub use deploy::{RecordingStepRunner, ShellStepRunner};
pub use facility::InstalledFacilities;
