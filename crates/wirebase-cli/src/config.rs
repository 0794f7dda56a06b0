//! Process bootstrap.
//!
//! [`Bootstrap`] fixes the base path and environment from the CLI flags,
//! lists the configuration layers, and composes them into a [`BootContext`]
//! that every command reads from.
//!
//! # Layer order (later wins)
//!
//! 1. Built-in defaults
//! 2. `config/common.toml` (required)
//! 3. `config/{environment}.toml` (optional)
//! 4. `config/fragments/**/*.toml` (package fragments, sorted)
//! 5. `config/local.toml` (optional, machine-local)
//! 6. `app.basePath` / `app.mode` injected from the flags
//!
//! The context owns the tree, the middleware chain and the database handle.
//! The handle is built on first use and reused after that.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use tracing::{debug, info, instrument};

use wirebase_adapters::{
    DeferredConnectionFactory, FragmentDirSource, InstalledFacilities, StaticSource,
    TomlFileSource,
};
use wirebase_core::{
    application::{
        ConfigComposer, ConnectionResolver, HttpClientSettings, MiddlewareComposer,
        TemplateSettings,
        ports::{ConfigSource, ConnectionFactory, DatabaseHandle},
    },
    domain::{ConfigTree, Environment, MiddlewareChain, MiddlewareFragment},
};

use crate::cli::GlobalArgs;
use crate::error::{CliResult, IntoCli};

pub const BASE_PATH_KEY: &str = "app.basePath";
pub const MODE_KEY: &str = "app.mode";

#[derive(Debug, Clone)]
pub struct Bootstrap {
    base_path: PathBuf,
    environment: Environment,
}

impl Bootstrap {
    pub fn new(base_path: impl Into<PathBuf>, environment: Environment) -> Self {
        Self {
            base_path: base_path.into(),
            environment,
        }
    }

    /// `--base` (default: current directory) and `--env` / `APP_ENV`.
    pub fn from_args(args: &GlobalArgs) -> CliResult<Self> {
        let base_path = match &args.base {
            Some(base) => base.clone(),
            None => std::env::current_dir()
                .with_cli_context(|| "cannot determine the current directory")?,
        };
        Ok(Self::new(base_path, args.environment()))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn config_dir(&self) -> PathBuf {
        self.base_path.join("config")
    }

    /// Every layer, in merge order.
    pub fn sources(&self) -> Vec<Box<dyn ConfigSource>> {
        let dir = self.config_dir();
        let injected = ConfigTree::new()
            .with(BASE_PATH_KEY, self.base_path.display().to_string())
            .with(MODE_KEY, self.environment.as_str());

        vec![
            Box::new(StaticSource::defaults()),
            Box::new(TomlFileSource::required(dir.join("common.toml"))),
            Box::new(TomlFileSource::optional(
                dir.join(format!("{}.toml", self.environment)),
            )),
            Box::new(FragmentDirSource::new(dir.join("fragments"))),
            Box::new(TomlFileSource::optional(dir.join("local.toml"))),
            Box::new(StaticSource::new("bootstrap", injected)),
        ]
    }

    /// Compose the configuration. Fails on the first bad layer.
    #[instrument(skip_all, fields(environment = %self.environment))]
    pub fn load(self) -> CliResult<BootContext> {
        let sources = self.sources();
        let tree = ConfigComposer::new().compose(&sources)?;
        let source_names = sources.iter().map(|s| s.name().to_owned()).collect();

        info!(base = %self.base_path.display(), "Configuration loaded");
        Ok(BootContext {
            base_path: self.base_path,
            environment: self.environment,
            tree,
            source_names,
            factory: Box::new(DeferredConnectionFactory::new()),
            connection: OnceLock::new(),
            middleware: OnceLock::new(),
        })
    }
}

/// Everything a command needs, built once per process.
pub struct BootContext {
    base_path: PathBuf,
    environment: Environment,
    tree: ConfigTree,
    source_names: Vec<String>,
    factory: Box<dyn ConnectionFactory>,
    connection: OnceLock<Arc<dyn DatabaseHandle>>,
    middleware: OnceLock<MiddlewareChain>,
}

impl BootContext {
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn config(&self) -> &ConfigTree {
        &self.tree
    }

    pub fn source_names(&self) -> &[String] {
        &self.source_names
    }

    /// The database handle, built on first access.
    pub fn connection(&self) -> CliResult<Arc<dyn DatabaseHandle>> {
        if let Some(handle) = self.connection.get() {
            return Ok(Arc::clone(handle));
        }
        let handle = ConnectionResolver::connect(&self.tree, self.factory.as_ref())?;
        Ok(Arc::clone(self.connection.get_or_init(|| handle)))
    }

    /// Built-in web middleware, then whatever the config declares.
    pub fn middleware(&self) -> CliResult<&MiddlewareChain> {
        if let Some(chain) = self.middleware.get() {
            return Ok(chain);
        }

        let facilities = InstalledFacilities::from_config(&self.tree)?;
        debug!(
            facilities = ?facilities.iter().collect::<Vec<_>>(),
            "Facilities available"
        );
        let declared = MiddlewareFragment::from_config(&self.tree)?;
        let composer = MiddlewareComposer::new(Box::new(facilities));
        let chain = composer.compose([&MiddlewareFragment::web_defaults(), &declared]);

        Ok(self.middleware.get_or_init(|| chain))
    }

    pub fn templates(&self) -> CliResult<TemplateSettings> {
        Ok(TemplateSettings::resolve(&self.tree, &self.base_path)?)
    }

    pub fn http_client(&self) -> CliResult<HttpClientSettings> {
        Ok(HttpClientSettings::from_config(&self.tree)?)
    }
}
