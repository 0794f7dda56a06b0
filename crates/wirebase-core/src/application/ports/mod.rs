//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `wirebase-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `ConfigSource`: one layer of configuration
//!   - `ConnectionFactory`: builds database handles
//!   - `FacilityCheck`: runtime availability of optional middleware
//!   - `StepRunner`: executes deploy steps
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{ConfigSource, ConnectionFactory, DatabaseHandle, FacilityCheck, StepRunner};

#[cfg(test)]
pub use output::{MockConnectionFactory, MockStepRunner};
