//! Runtime environment selected by `APP_ENV`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The environment a process runs in.
///
/// Unknown names are kept verbatim so per-environment config files like
/// `config/qa.toml` still resolve.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Environment {
    #[default]
    Development,
    Testing,
    Staging,
    Production,
    Custom(String),
}

impl Environment {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Staging => "staging",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// The production sentinel check.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.to_ascii_lowercase().as_str() {
            "" | "dev" | "development" => Self::Development,
            "test" | "testing" => Self::Testing,
            "stage" | "staging" => Self::Staging,
            "prod" | "production" => Self::Production,
            _ => Self::Custom(trimmed.to_owned()),
        })
    }
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(env) => env,
            Err(never) => match never {},
        }
    }
}

impl From<Environment> for String {
    fn from(env: Environment) -> Self {
        env.as_str().to_owned()
    }
}
