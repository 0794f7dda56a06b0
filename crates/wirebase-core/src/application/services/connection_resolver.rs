//! Database connection resolution.
//!
//! Turns `db.*` configuration into [`ConnectionSettings`] and, on request,
//! a database handle. Every required key is checked before the factory is
//! called, so a misconfiguration never reaches the network.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::{
    application::ports::{ConnectionFactory, DatabaseHandle},
    domain::{
        ConfigTree, ConfigValue, ConnectionError, ConnectionSettings, ConnectionSpec, Credentials,
        DsnSource, SessionOptions,
    },
    error::WirebaseResult,
};

pub const DSN_KEY: &str = "db.dsn";
pub const OPTIONS_KEY: &str = "db.options";

/// Stateless resolver; all methods are associated functions.
pub struct ConnectionResolver;

impl ConnectionResolver {
    /// Decide where the DSN comes from.
    ///
    /// A truthy `db.dsn` wins outright. Otherwise `db.dbname` and `db.host`
    /// are required, `db.type` defaults to `mysql`, `db.charset` to the empty
    /// string, and `db.port` is only used when present.
    pub fn dsn_source(tree: &ConfigTree) -> Result<DsnSource, ConnectionError> {
        if let Ok(value) = tree.get(DSN_KEY) {
            if value.is_truthy() {
                let dsn = value
                    .to_scalar_string()
                    .ok_or_else(|| ConnectionError::InvalidValue {
                        key: DSN_KEY.into(),
                        reason: format!("must be a string, found a {}", value.type_name()),
                    })?;
                return Ok(DsnSource::Explicit(dsn));
            }
        }

        let mut spec = ConnectionSpec::new(required(tree, "db.dbname")?, required(tree, "db.host")?);
        if tree.has("db.type") {
            spec = spec.with_driver(required(tree, "db.type")?);
        }
        spec = spec.with_charset(if tree.has("db.charset") {
            required(tree, "db.charset")?
        } else {
            String::new()
        });
        if tree.has("db.port") {
            spec = spec.with_port(required(tree, "db.port")?);
        }

        Ok(DsnSource::Assembled(spec))
    }

    /// The DSN string alone.
    pub fn resolve_dsn(tree: &ConfigTree) -> Result<String, ConnectionError> {
        Self::dsn_source(tree).map(|source| source.dsn())
    }

    /// DSN, credentials and session options.
    #[instrument(skip_all)]
    pub fn resolve(tree: &ConfigTree) -> Result<ConnectionSettings, ConnectionError> {
        let source = Self::dsn_source(tree)?;
        let credentials = Credentials::new(
            required(tree, "db.username")?,
            required(tree, "db.password")?,
        );
        let options = session_options(tree)?;

        debug!(
            explicit = matches!(source, DsnSource::Explicit(_)),
            username = %credentials.username,
            options = options.len(),
            "Connection settings resolved"
        );

        Ok(ConnectionSettings {
            dsn: source.dsn(),
            credentials,
            options,
        })
    }

    /// Resolve, then ask `factory` for a new handle.
    ///
    /// Each call builds a fresh handle; the bootstrap context is responsible
    /// for calling this once and keeping the result.
    #[instrument(skip_all)]
    pub fn connect(
        tree: &ConfigTree,
        factory: &dyn ConnectionFactory,
    ) -> WirebaseResult<Arc<dyn DatabaseHandle>> {
        let settings = Self::resolve(tree)?;
        let handle = factory.connect(&settings)?;
        info!(handle = %handle.id(), "Database handle constructed");
        Ok(handle)
    }
}

fn required(tree: &ConfigTree, key: &str) -> Result<String, ConnectionError> {
    let value = tree.get(key).map_err(|_| ConnectionError::MissingKey {
        key: key.to_owned(),
    })?;
    value
        .to_scalar_string()
        .ok_or_else(|| ConnectionError::InvalidValue {
            key: key.to_owned(),
            reason: format!("must be a scalar, found a {}", value.type_name()),
        })
}

/// `db.options` replaces the defaults wholesale when present.
fn session_options(tree: &ConfigTree) -> Result<SessionOptions, ConnectionError> {
    match tree.get(OPTIONS_KEY) {
        Err(_) => Ok(SessionOptions::default()),
        Ok(ConfigValue::Table(table)) => Ok(SessionOptions::new(table.clone())),
        Ok(other) => Err(ConnectionError::InvalidValue {
            key: OPTIONS_KEY.into(),
            reason: format!("must be a table, found a {}", other.type_name()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockConnectionFactory;
    use crate::error::WirebaseError;
    use uuid::Uuid;

    #[derive(Debug)]
    struct FakeHandle {
        id: Uuid,
        dsn: String,
        options: SessionOptions,
    }

    impl DatabaseHandle for FakeHandle {
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

    fn base() -> ConfigTree {
        ConfigTree::new()
            .with("db.dbname", "foo")
            .with("db.host", "bar")
            .with("db.type", "pgsql")
            .with("db.username", "app")
            .with("db.password", "secret")
    }

    #[test]
    fn assembles_without_port_or_charset() {
        assert_eq!(
            ConnectionResolver::resolve_dsn(&base()).unwrap(),
            "pgsql:dbname=foo;host=bar;charset="
        );
    }

    #[test]
    fn port_appended_last() {
        let tree = base().with("db.port", 5432);
        assert_eq!(
            ConnectionResolver::resolve_dsn(&tree).unwrap(),
            "pgsql:dbname=foo;host=bar;charset=;port=5432"
        );
    }

    #[test]
    fn driver_defaults_to_mysql() {
        let tree = ConfigTree::new()
            .with("db.dbname", "site")
            .with("db.host", "localhost")
            .with("db.charset", "utf8");
        assert_eq!(
            ConnectionResolver::resolve_dsn(&tree).unwrap(),
            "mysql:dbname=site;host=localhost;charset=utf8"
        );
    }

    #[test]
    fn explicit_dsn_wins_over_everything() {
        let tree = base()
            .with("db.port", 5432)
            .with("db.charset", "latin1")
            .with("db.dsn", "sqlite:/var/lib/app.db");
        assert_eq!(
            ConnectionResolver::resolve_dsn(&tree).unwrap(),
            "sqlite:/var/lib/app.db"
        );
    }

    #[test]
    fn explicit_dsn_skips_discrete_requirements() {
        let tree = ConfigTree::new().with("db.dsn", "sqlite::memory:");
        assert_eq!(
            ConnectionResolver::resolve_dsn(&tree).unwrap(),
            "sqlite::memory:"
        );
    }

    #[test]
    fn falsy_dsn_falls_back_to_assembly() {
        for falsy in [ConfigValue::Bool(false), ConfigValue::from("")] {
            let tree = base().with("db.dsn", falsy);
            assert_eq!(
                ConnectionResolver::resolve_dsn(&tree).unwrap(),
                "pgsql:dbname=foo;host=bar;charset="
            );
        }
    }

    #[test]
    fn missing_host_is_reported_by_key() {
        let tree = ConfigTree::new().with("db.dbname", "foo");
        assert_eq!(
            ConnectionResolver::resolve_dsn(&tree),
            Err(ConnectionError::MissingKey {
                key: "db.host".into()
            })
        );
    }

    #[test]
    fn credentials_required_even_with_explicit_dsn() {
        let tree = ConfigTree::new()
            .with("db.dsn", "sqlite::memory:")
            .with("db.username", "app");
        assert_eq!(
            ConnectionResolver::resolve(&tree),
            Err(ConnectionError::MissingKey {
                key: "db.password".into()
            })
        );
    }

    #[test]
    fn session_options_default_and_override() {
        let settings = ConnectionResolver::resolve(&base()).unwrap();
        assert_eq!(settings.options, SessionOptions::default());

        let tree = base().with("db.options.1002", "SET NAMES 'latin1'");
        let settings = ConnectionResolver::resolve(&tree).unwrap();
        assert_eq!(settings.options.len(), 1);

        let bad = base().with("db.options", "nope");
        assert!(matches!(
            ConnectionResolver::resolve(&bad),
            Err(ConnectionError::InvalidValue { .. })
        ));
    }

    #[test]
    fn missing_username_never_reaches_factory() {
        let mut factory = MockConnectionFactory::new();
        factory.expect_connect().never();

        let tree = ConfigTree::new()
            .with("db.dbname", "foo")
            .with("db.host", "bar")
            .with("db.password", "secret");

        let err = ConnectionResolver::connect(&tree, &factory).unwrap_err();
        assert!(matches!(
            err,
            WirebaseError::Connection(ConnectionError::MissingKey { ref key }) if key == "db.username"
        ));
    }

    #[test]
    fn connect_passes_resolved_settings() {
        let mut factory = MockConnectionFactory::new();
        factory
            .expect_connect()
            .withf(|s| s.dsn == "pgsql:dbname=foo;host=bar;charset=" && s.credentials.username == "app")
            .times(1)
            .returning(|s| {
                let handle: Arc<dyn DatabaseHandle> = Arc::new(FakeHandle {
                    id: Uuid::new_v4(),
                    dsn: s.dsn.clone(),
                    options: s.options.clone(),
                });
                Ok(handle)
            });

        let handle = ConnectionResolver::connect(&base(), &factory).unwrap();
        assert_eq!(handle.dsn(), "pgsql:dbname=foo;host=bar;charset=");
    }
}
