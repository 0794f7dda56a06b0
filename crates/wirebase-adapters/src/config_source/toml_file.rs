//! Single TOML document source.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use wirebase_core::{
    application::{ApplicationError, ports::ConfigSource},
    domain::ConfigTree,
    error::WirebaseResult,
};

use super::{map_io_error, parse_document};

/// One TOML file. A missing required file is an error; a missing optional
/// file is an empty layer.
#[derive(Debug, Clone)]
pub struct TomlFileSource {
    name: String,
    path: PathBuf,
    required: bool,
}

impl TomlFileSource {
    pub fn required(path: impl Into<PathBuf>) -> Self {
        Self::new(path.into(), true)
    }

    pub fn optional(path: impl Into<PathBuf>) -> Self {
        Self::new(path.into(), false)
    }

    fn new(path: PathBuf, required: bool) -> Self {
        Self {
            name: path.display().to_string(),
            path,
            required,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

impl ConfigSource for TomlFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> WirebaseResult<ConfigTree> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => parse_document(&self.name, &raw),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if self.required {
                    return Err(ApplicationError::SourceMissing {
                        source_name: self.name.clone(),
                        path: self.path.clone(),
                    }
                    .into());
                }
                debug!(path = %self.path.display(), "Optional config file absent");
                Ok(ConfigTree::new())
            }
            Err(e) => Err(map_io_error(&self.path, e, "read config file")),
        }
    }
}
