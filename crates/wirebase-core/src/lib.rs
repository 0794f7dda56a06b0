//! Wirebase Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the Wirebase
//! bootstrap: how configuration values, connection parameters and middleware
//! ordering are assembled from layered sources before being handed to an
//! external web runtime.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           wirebase-cli (CLI)            │
//! │  (APP_ENV, logger, bootstrap context)   │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │ (ConfigComposer, ConnectionResolver,    │
//! │  MiddlewareComposer, DeployService)     │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (ConfigSource, ConnectionFactory,       │
//! │  FacilityCheck, StepRunner)             │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    wirebase-adapters (Infrastructure)   │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (ConfigTree, ConnectionSpec,            │
//! │  MiddlewareChain, DeployPlan)           │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use wirebase_core::prelude::*;
//!
//! # fn sources() -> Vec<Box<dyn ConfigSource>> { Vec::new() }
//! let tree = ConfigComposer::new().compose(&sources()).unwrap();
//! let dsn = ConnectionResolver::resolve_dsn(&tree).unwrap();
//! println!("{dsn}");
//! ```

// Domain layer (pure values and their rules)
pub mod domain;

// Application layer (orchestration logic)
pub mod application;

// Error types
pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ConfigComposer, ConnectionResolver, DeployReport, DeployService, MiddlewareComposer,
        ports::{ConfigSource, ConnectionFactory, DatabaseHandle, FacilityCheck, StepRunner},
    };
    pub use crate::domain::{
        ConfigTree, ConfigValue, ConnectionSettings, ConnectionSpec, DeployPlan, DeployStep,
        Environment, MiddlewareChain, MiddlewareFragment, MiddlewareId, SessionOptions,
    };
    pub use crate::error::{WirebaseError, WirebaseResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
