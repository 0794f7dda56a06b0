//! Configuration source adapters.
//!
//! | Adapter             | Layer                                  |
//! |---------------------|----------------------------------------|
//! | `StaticSource`      | built-in defaults, injected values     |
//! | `TomlFileSource`    | `config/common.toml`, `config/{env}.toml`, `config/local.toml` |
//! | `FragmentDirSource` | `config/fragments/**/*.toml`           |

mod fragment_dir;
mod static_source;
mod toml_file;

pub use fragment_dir::FragmentDirSource;
pub use static_source::StaticSource;
pub use toml_file::TomlFileSource;

use std::io;
use std::path::Path;

use wirebase_core::{
    application::ApplicationError,
    domain::{ConfigTree, Table},
    error::{WirebaseError, WirebaseResult},
};

/// Parse one TOML document into a tree, expanding quoted dotted keys.
pub(crate) fn parse_document(source_name: &str, raw: &str) -> WirebaseResult<ConfigTree> {
    let table: Table = toml::from_str(raw).map_err(|e| ApplicationError::SourceInvalid {
        source_name: source_name.to_owned(),
        reason: e.to_string(),
    })?;
    Ok(ConfigTree::from_table(table))
}

pub(crate) fn map_io_error(path: &Path, e: io::Error, operation: &str) -> WirebaseError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}
