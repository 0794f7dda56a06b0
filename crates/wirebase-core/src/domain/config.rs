//! Configuration values and the merged configuration tree.
//!
//! A [`ConfigTree`] is a nested mapping addressed by dotted keys
//! (`db.dbname`). Sources may spell a leaf either as a nested table or as a
//! single dotted key; both land on the same path once the tree is built.
//!
//! # Merge policy
//!
//! | base    | override | result                         |
//! |---------|----------|--------------------------------|
//! | table   | table    | children merged recursively    |
//! | list    | list     | base entries, then override's  |
//! | *any*   | *any*    | override wins                  |

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

/// A nested table of configuration values.
pub type Table = BTreeMap<String, ConfigValue>;

/// One configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<ConfigValue>),
    Table(Table),
}

impl ConfigValue {
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Table(_) => "table",
        }
    }

    /// `false`, zero, the empty string and empty collections are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Integer(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::String(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
            Self::Table(table) => !table.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }

    /// Render a scalar the way it appears inside a connection string.
    ///
    /// Lists and tables have no scalar form.
    pub fn to_scalar_string(&self) -> Option<String> {
        match self {
            Self::Bool(b) => Some(b.to_string()),
            Self::Integer(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::String(s) => Some(s.clone()),
            Self::List(_) | Self::Table(_) => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Table(table) => {
                f.write_str("{")?;
                for (i, (k, v)) in table.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k} = {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for ConfigValue {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for ConfigValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(items: Vec<ConfigValue>) -> Self {
        Self::List(items)
    }
}

impl From<Table> for ConfigValue {
    fn from(table: Table) -> Self {
        Self::Table(table)
    }
}

/// Merge `overlay` onto `base` following the module-level policy.
pub fn merge(base: ConfigValue, overlay: ConfigValue) -> ConfigValue {
    match (base, overlay) {
        (ConfigValue::Table(mut base), ConfigValue::Table(overlay)) => {
            merge_tables(&mut base, overlay);
            ConfigValue::Table(base)
        }
        (ConfigValue::List(mut base), ConfigValue::List(overlay)) => {
            base.extend(overlay);
            ConfigValue::List(base)
        }
        (_, overlay) => overlay,
    }
}

fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        let merged = match base.remove(&key) {
            Some(existing) => merge(existing, value),
            None => value,
        };
        base.insert(key, merged);
    }
}

/// Turn `{"db.host": x}` into `{"db": {"host": x}}`, recursively.
fn expand_dotted(table: Table) -> Table {
    let mut out = Table::new();
    for (key, value) in table {
        let value = match value {
            ConfigValue::Table(inner) => ConfigValue::Table(expand_dotted(inner)),
            other => other,
        };

        let mut segments: Vec<&str> = key.split('.').collect();
        let leaf = segments.pop().unwrap_or_default().to_owned();
        let nested = segments
            .into_iter()
            .rev()
            .fold(Table::from([(leaf, value)]), |acc, segment| {
                Table::from([(segment.to_owned(), ConfigValue::Table(acc))])
            });
        merge_tables(&mut out, nested);
    }
    out
}

/// The merged, read-only configuration of one process.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigTree {
    root: Table,
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a raw table, expanding dotted keys.
    pub fn from_table(table: Table) -> Self {
        Self {
            root: expand_dotted(table),
        }
    }

    /// Set `key` (dotted) to `value`, merging with whatever is already there.
    ///
    /// Used while assembling sources; the finished tree is never mutated.
    pub fn with(mut self, key: &str, value: impl Into<ConfigValue>) -> Self {
        let single = expand_dotted(Table::from([(key.to_owned(), value.into())]));
        merge_tables(&mut self.root, single);
        self
    }

    /// Merge `overlay` onto this tree and return the result.
    pub fn merge(mut self, overlay: ConfigTree) -> Self {
        merge_tables(&mut self.root, overlay.root);
        self
    }

    /// Look up a dotted key.
    pub fn get(&self, key: &str) -> Result<&ConfigValue, ConfigError> {
        if key.is_empty() || key.split('.').any(str::is_empty) {
            return Err(ConfigError::InvalidKey { key: key.to_owned() });
        }

        let mut segments = key.split('.');
        let first = segments.next().unwrap_or_default();
        let mut current = self.root.get(first);
        for segment in segments {
            current = current
                .and_then(ConfigValue::as_table)
                .and_then(|t| t.get(segment));
        }
        current.ok_or_else(|| ConfigError::KeyMissing { key: key.to_owned() })
    }

    /// Whether `key` exists. Never fails.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_ok()
    }

    pub fn get_str(&self, key: &str) -> Result<&str, ConfigError> {
        let value = self.get(key)?;
        value.as_str().ok_or_else(|| ConfigError::TypeMismatch {
            key: key.to_owned(),
            expected: "string",
            found: value.type_name(),
        })
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        let value = self.get(key)?;
        value.as_bool().ok_or_else(|| ConfigError::TypeMismatch {
            key: key.to_owned(),
            expected: "bool",
            found: value.type_name(),
        })
    }

    pub fn get_integer(&self, key: &str) -> Result<i64, ConfigError> {
        let value = self.get(key)?;
        value.as_integer().ok_or_else(|| ConfigError::TypeMismatch {
            key: key.to_owned(),
            expected: "integer",
            found: value.type_name(),
        })
    }

    pub fn get_list(&self, key: &str) -> Result<&[ConfigValue], ConfigError> {
        let value = self.get(key)?;
        value.as_list().ok_or_else(|| ConfigError::TypeMismatch {
            key: key.to_owned(),
            expected: "list",
            found: value.type_name(),
        })
    }

    /// Any scalar rendered as text (`5432` → `"5432"`).
    pub fn get_scalar(&self, key: &str) -> Result<String, ConfigError> {
        let value = self.get(key)?;
        value
            .to_scalar_string()
            .ok_or_else(|| ConfigError::TypeMismatch {
                key: key.to_owned(),
                expected: "scalar",
                found: value.type_name(),
            })
    }

    /// Every leaf as `(dotted.key, value)`, in key order.
    pub fn leaves(&self) -> Vec<(String, &ConfigValue)> {
        fn walk<'a>(prefix: &str, table: &'a Table, out: &mut Vec<(String, &'a ConfigValue)>) {
            for (key, value) in table {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                match value {
                    ConfigValue::Table(inner) if !inner.is_empty() => walk(&path, inner, out),
                    other => out.push((path, other)),
                }
            }
        }

        let mut out = Vec::new();
        walk("", &self.root, &mut out);
        out
    }

    pub fn as_table(&self) -> &Table {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

impl From<Table> for ConfigTree {
    fn from(table: Table) -> Self {
        Self::from_table(table)
    }
}
