//! Command handlers. Each translates arguments into core calls and prints
//! the result; no business logic lives here.

pub mod check;
pub mod completions;
pub mod config;
pub mod deploy;
pub mod dsn;
pub mod middleware;
