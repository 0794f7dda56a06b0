//! Runtime facility check.

use std::collections::BTreeSet;

use wirebase_core::{
    application::ports::FacilityCheck,
    domain::{ConfigError, ConfigTree, FacilityUnavailable},
};

pub const FACILITIES_KEY: &str = "app.facilities";

/// The error page renderer, only compiled into debug builds.
pub const ERROR_DISPLAY: &str = "error-display";

/// Names of the optional facilities present in this process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledFacilities {
    names: BTreeSet<String>,
}

impl InstalledFacilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// What this build provides on its own.
    pub fn for_build() -> Self {
        let mut facilities = Self::new();
        if cfg!(debug_assertions) {
            facilities = facilities.with(ERROR_DISPLAY);
        }
        facilities
    }

    /// [`InstalledFacilities::for_build`] plus the names listed under
    /// `app.facilities`.
    pub fn from_config(tree: &ConfigTree) -> Result<Self, ConfigError> {
        let mut facilities = Self::for_build();
        if tree.has(FACILITIES_KEY) {
            for entry in tree.get_list(FACILITIES_KEY)? {
                let name = entry.as_str().ok_or_else(|| ConfigError::TypeMismatch {
                    key: FACILITIES_KEY.into(),
                    expected: "list of strings",
                    found: entry.type_name(),
                })?;
                facilities = facilities.with(name);
            }
        }
        Ok(facilities)
    }

    pub fn with(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl FacilityCheck for InstalledFacilities {
    fn require(&self, middleware: &str, facility: &str) -> Result<(), FacilityUnavailable> {
        if self.contains(facility) {
            Ok(())
        } else {
            Err(FacilityUnavailable {
                middleware: middleware.to_owned(),
                facility: facility.to_owned(),
            })
        }
    }
}
