//! In-memory configuration layer.

use wirebase_core::{
    application::ports::ConfigSource,
    domain::{ConfigTree, ConfigValue},
    error::WirebaseResult,
};

/// A fixed tree. Used for the built-in defaults, values injected by the
/// bootstrap, and tests.
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    tree: ConfigTree,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, tree: ConfigTree) -> Self {
        Self {
            name: name.into(),
            tree,
        }
    }

    /// Values every application starts from; any file may override them.
    pub fn defaults() -> Self {
        let tree = ConfigTree::new()
            .with("queue.host", "127.0.0.1")
            .with("db.charset", "utf8")
            .with("db.type", "mysql")
            .with("db.dbname", "site")
            .with("db.dsn", false)
            .with("http-client.allow_redirects", true)
            .with("http-client.timeout", 5)
            .with("http-client.connect_timeout", 2)
            .with("template_paths", Vec::<ConfigValue>::new());
        Self::new("defaults", tree)
    }

    pub fn tree(&self) -> &ConfigTree {
        &self.tree
    }
}

impl ConfigSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> WirebaseResult<ConfigTree> {
        Ok(self.tree.clone())
    }
}
