//! Directory of TOML fragments contributed by packages.
//!
//! ```text
//! config/fragments/
//! ├── 10-core.toml      ← template_paths = ["vendor/core/templates"]
//! ├── auth/
//! │   └── templates.toml
//! └── README.md         ← ignored
//! ```
//!
//! Every `*.toml` file below the root is one layer. Layers merge in sorted
//! path order, so list values (`template_paths`, middleware declarations)
//! concatenate in a stable order across runs.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};
use walkdir::WalkDir;

use wirebase_core::{
    application::ports::ConfigSource, domain::ConfigTree, error::WirebaseResult,
};

use super::{map_io_error, parse_document};

#[derive(Debug, Clone)]
pub struct FragmentDirSource {
    name: String,
    root: PathBuf,
}

impl FragmentDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            name: format!("{}/**/*.toml", root.display()),
            root,
        }
    }

    /// Fragment files in merge order. An absent root has none.
    pub fn fragments(&self) -> WirebaseResult<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&self.root).to_path_buf();
                map_io_error(&path, e.into(), "walk fragment directory")
            })?;
            if entry.file_type().is_file() && is_toml(entry.path()) {
                paths.push(entry.into_path());
            }
        }
        paths.sort();
        Ok(paths)
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}

impl ConfigSource for FragmentDirSource {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip_all, fields(root = %self.root.display()))]
    fn load(&self) -> WirebaseResult<ConfigTree> {
        let mut tree = ConfigTree::new();
        for path in self.fragments()? {
            let raw = fs::read_to_string(&path)
                .map_err(|e| map_io_error(&path, e, "read fragment"))?;
            let layer = parse_document(&path.display().to_string(), &raw)?;
            debug!(fragment = %path.display(), "Fragment merged");
            tree = tree.merge(layer);
        }
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn absent_directory_is_empty_layer() {
        let dir = TempDir::new().unwrap();
        let source = FragmentDirSource::new(dir.path().join("fragments"));
        assert!(source.load().unwrap().is_empty());
    }

    #[test]
    fn lists_concatenate_in_path_order() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "20-auth/templates.toml", "template_paths = [\"vendor/auth\"]\n");
        write(dir.path(), "10-core.toml", "template_paths = [\"vendor/core\"]\n");
        write(dir.path(), "README.md", "not config");

        let source = FragmentDirSource::new(dir.path());
        assert_eq!(source.fragments().unwrap().len(), 2);

        let tree = source.load().unwrap();
        let paths: Vec<&str> = tree
            .get_list("template_paths")
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(paths, ["vendor/core", "vendor/auth"]);
    }

    #[test]
    fn later_fragment_overrides_scalar() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.toml", "[queue]\nhost = \"10.0.0.1\"\n");
        write(dir.path(), "b.toml", "[queue]\nhost = \"10.0.0.2\"\n");

        let tree = FragmentDirSource::new(dir.path()).load().unwrap();
        assert_eq!(tree.get_str("queue.host").unwrap(), "10.0.0.2");
    }

    #[test]
    fn invalid_fragment_aborts() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "broken.toml", "x = ");
        assert!(FragmentDirSource::new(dir.path()).load().is_err());
    }
}
