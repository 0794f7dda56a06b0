//! Config Composer - merges layered sources into one [`ConfigTree`].
//!
//! Sources are applied left to right: each one is merged onto the result of
//! the previous ones (see `crate::domain::config` for the merge policy).
//! The composer runs once per process; the tree it returns is never mutated.

use tracing::{debug, info, instrument};

use crate::{
    application::ports::ConfigSource,
    domain::ConfigTree,
    error::WirebaseResult,
};

/// Builds the process configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigComposer;

impl ConfigComposer {
    pub fn new() -> Self {
        Self
    }

    /// Load every source and merge them in order.
    ///
    /// The first source that fails to load aborts the composition.
    #[instrument(skip_all, fields(sources = sources.len()))]
    pub fn compose(&self, sources: &[Box<dyn ConfigSource>]) -> WirebaseResult<ConfigTree> {
        let mut tree = ConfigTree::new();
        for source in sources {
            let layer = source.load()?;
            debug!(
                source = source.name(),
                keys = layer.leaves().len(),
                "Configuration layer loaded"
            );
            tree = tree.merge(layer);
        }
        info!(keys = tree.leaves().len(), "Configuration composed");
        Ok(tree)
    }

    /// Merge already-loaded trees in order.
    pub fn compose_trees(&self, trees: impl IntoIterator<Item = ConfigTree>) -> ConfigTree {
        trees
            .into_iter()
            .fold(ConfigTree::new(), |acc, layer| acc.merge(layer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationError;
    use crate::domain::ConfigValue;
    use crate::error::WirebaseError;

    struct Fixed(&'static str, ConfigTree);

    impl ConfigSource for Fixed {
        fn name(&self) -> &str {
            self.0
        }
        fn load(&self) -> WirebaseResult<ConfigTree> {
            Ok(self.1.clone())
        }
    }

    struct Broken;

    impl ConfigSource for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn load(&self) -> WirebaseResult<ConfigTree> {
            Err(ApplicationError::SourceInvalid {
                source_name: "broken".into(),
                reason: "unexpected token".into(),
            }
            .into())
        }
    }

    fn common() -> ConfigTree {
        ConfigTree::new()
            .with("db.charset", "utf8")
            .with("db.type", "mysql")
            .with("db.dbname", "site")
            .with("db.dsn", false)
            .with("template_paths", vec![ConfigValue::from("/vendor/core")])
    }

    #[test]
    fn later_sources_override_earlier() {
        let production = ConfigTree::new()
            .with("db.dbname", "site_prod")
            .with("template_paths", vec![ConfigValue::from("/vendor/auth")]);

        let sources: Vec<Box<dyn ConfigSource>> = vec![
            Box::new(Fixed("common", common())),
            Box::new(Fixed("production", production)),
        ];
        let tree = ConfigComposer::new().compose(&sources).unwrap();

        assert_eq!(tree.get_str("db.dbname").unwrap(), "site_prod");
        assert_eq!(tree.get_str("db.charset").unwrap(), "utf8");
        assert_eq!(tree.get_list("template_paths").unwrap().len(), 2);
    }

    #[test]
    fn no_sources_gives_empty_tree() {
        let tree = ConfigComposer::new().compose(&[]).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn failing_source_aborts() {
        let sources: Vec<Box<dyn ConfigSource>> =
            vec![Box::new(Fixed("common", common())), Box::new(Broken)];
        let err = ConfigComposer::new().compose(&sources).unwrap_err();
        assert!(matches!(
            err,
            WirebaseError::Application(ApplicationError::SourceInvalid { .. })
        ));
    }

    #[test]
    fn compose_trees_matches_compose() {
        let overlay = ConfigTree::new().with("db.host", "db1");
        let sources: Vec<Box<dyn ConfigSource>> = vec![
            Box::new(Fixed("common", common())),
            Box::new(Fixed("overlay", overlay.clone())),
        ];
        let composer = ConfigComposer::new();
        assert_eq!(
            composer.compose(&sources).unwrap(),
            composer.compose_trees([common(), overlay])
        );
    }
}
