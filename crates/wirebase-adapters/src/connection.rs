//! Deferred database connection factory.
//!
//! The SQL driver is an external collaborator. This factory validates the
//! resolved settings and hands out a handle describing the connection the
//! runtime will open; no socket is opened here.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::debug;
use uuid::Uuid;

use wirebase_core::{
    application::{
        ApplicationError,
        ports::{ConnectionFactory, DatabaseHandle},
    },
    domain::{ConnectionSettings, SessionOptions},
    error::WirebaseResult,
};

#[derive(Debug, Clone)]
pub struct DeferredConnection {
    id: Uuid,
    dsn: String,
    username: String,
    options: SessionOptions,
}

impl DeferredConnection {
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The driver prefix of the DSN (`mysql`, `pgsql`, ...).
    pub fn driver(&self) -> &str {
        self.dsn.split_once(':').map_or("", |(driver, _)| driver)
    }
}

impl DatabaseHandle for DeferredConnection {
    fn id(&self) -> Uuid {
        self.id
    }

    fn dsn(&self) -> &str {
        &self.dsn
    }

    fn session_options(&self) -> &SessionOptions {
        &self.options
    }
}

#[derive(Debug, Default)]
pub struct DeferredConnectionFactory {
    constructed: AtomicUsize,
}

impl DeferredConnectionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many handles this factory has built.
    pub fn constructed(&self) -> usize {
        self.constructed.load(Ordering::SeqCst)
    }
}

impl ConnectionFactory for DeferredConnectionFactory {
    fn connect(&self, settings: &ConnectionSettings) -> WirebaseResult<Arc<dyn DatabaseHandle>> {
        match settings.dsn.split_once(':') {
            Some((driver, _)) if !driver.is_empty() => {}
            _ => {
                return Err(ApplicationError::ConnectFailed {
                    reason: format!("'{}' has no driver prefix", settings.dsn),
                }
                .into());
            }
        }

        let handle = DeferredConnection {
            id: Uuid::new_v4(),
            dsn: settings.dsn.clone(),
            username: settings.credentials.username.clone(),
            options: settings.options.clone(),
        };
        self.constructed.fetch_add(1, Ordering::SeqCst);
        debug!(handle = %handle.id, driver = handle.driver(), "Deferred connection built");

        Ok(Arc::new(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirebase_core::domain::Credentials;

    fn settings(dsn: &str) -> ConnectionSettings {
        ConnectionSettings {
            dsn: dsn.into(),
            credentials: Credentials::new("app", "secret"),
            options: SessionOptions::default(),
        }
    }

    #[test]
    fn each_connect_builds_a_distinct_handle() {
        let factory = DeferredConnectionFactory::new();
        let a = factory.connect(&settings("mysql:dbname=site;host=db;charset=utf8")).unwrap();
        let b = factory.connect(&settings("mysql:dbname=site;host=db;charset=utf8")).unwrap();

        assert_ne!(a.id(), b.id());
        assert_eq!(factory.constructed(), 2);
        assert_eq!(a.session_options(), &SessionOptions::default());
    }

    #[test]
    fn dsn_without_driver_is_refused() {
        let factory = DeferredConnectionFactory::new();
        assert!(factory.connect(&settings("dbname=site")).is_err());
        assert!(factory.connect(&settings(":memory:")).is_err());
        assert_eq!(factory.constructed(), 0);
    }
}
