//! Derived settings read out of the composed tree.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::domain::{ConfigError, ConfigTree, ConfigValue};

pub const TEMPLATE_PATHS_KEY: &str = "template_paths";
pub const ASSET_PATH_KEY: &str = "asset_path";

/// Where the renderer looks for templates and public assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateSettings {
    /// Package paths in merge order, then `{base}/templates`.
    pub template_paths: Vec<PathBuf>,
    pub asset_path: PathBuf,
}

impl TemplateSettings {
    pub fn resolve(tree: &ConfigTree, base_path: &Path) -> Result<Self, ConfigError> {
        let mut template_paths = if tree.has(TEMPLATE_PATHS_KEY) {
            tree.get_list(TEMPLATE_PATHS_KEY)?
                .iter()
                .map(|entry| path_entry(TEMPLATE_PATHS_KEY, entry))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            Vec::new()
        };
        template_paths.push(base_path.join("templates"));

        let asset_path = if tree.has(ASSET_PATH_KEY) {
            PathBuf::from(tree.get_str(ASSET_PATH_KEY)?)
        } else {
            base_path.join("public").join("assets")
        };

        Ok(Self {
            template_paths,
            asset_path,
        })
    }
}

fn path_entry(key: &str, entry: &ConfigValue) -> Result<PathBuf, ConfigError> {
    entry
        .as_str()
        .map(PathBuf::from)
        .ok_or_else(|| ConfigError::TypeMismatch {
            key: key.to_owned(),
            expected: "list of strings",
            found: entry.type_name(),
        })
}

/// Outbound HTTP client options. Passed through to the client as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpClientSettings {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub allow_redirects: bool,
}

impl Default for HttpClientSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            allow_redirects: true,
        }
    }
}

impl HttpClientSettings {
    /// Read `http-client.*`, falling back to the defaults per key.
    pub fn from_config(tree: &ConfigTree) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            timeout: seconds(tree, "http-client.timeout")?.unwrap_or(defaults.timeout),
            connect_timeout: seconds(tree, "http-client.connect_timeout")?
                .unwrap_or(defaults.connect_timeout),
            allow_redirects: if tree.has("http-client.allow_redirects") {
                tree.get_bool("http-client.allow_redirects")?
            } else {
                defaults.allow_redirects
            },
        })
    }
}

fn seconds(tree: &ConfigTree, key: &str) -> Result<Option<Duration>, ConfigError> {
    if !tree.has(key) {
        return Ok(None);
    }
    match tree.get(key)? {
        ConfigValue::Integer(n) if *n >= 0 => Ok(Some(Duration::from_secs(*n as u64))),
        ConfigValue::Float(f) if *f >= 0.0 && f.is_finite() => Ok(Some(Duration::from_secs_f64(*f))),
        other => Err(ConfigError::TypeMismatch {
            key: key.to_owned(),
            expected: "non-negative number of seconds",
            found: other.type_name(),
        }),
    }
}
