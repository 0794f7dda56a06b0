//! Middleware ordering.
//!
//! A [`MiddlewareChain`] is an execution *plan*: it knows nothing about HTTP,
//! only which named steps run before routing and which run after a route has
//! been matched. The external dispatcher consumes
//! [`MiddlewareChain::execution_plan`].
//!
//! # Ordering rules
//!
//! - Pre-router entries run in registration order.
//! - Post-router entries run by ascending priority; equal priorities keep
//!   their registration order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::config::{ConfigTree, ConfigValue};
use crate::domain::error::{ConfigError, MiddlewareError};

/// Config key holding pre-router declarations.
pub const PRE_ROUTER_KEY: &str = "middlewares.pre_router";
/// Config key holding post-router declarations.
pub const POST_ROUTER_KEY: &str = "middlewares.post_router";

/// Symbolic name of a middleware, resolved by the external container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MiddlewareId(String);

impl MiddlewareId {
    pub fn new(id: impl Into<String>) -> Result<Self, MiddlewareError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(MiddlewareError::EmptyIdentifier);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MiddlewareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    PreRouter,
    PostRouter,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreRouter => f.pad("pre-router"),
            Self::PostRouter => f.pad("post-router"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PostRouterEntry {
    id: MiddlewareId,
    priority: i32,
}

/// The ordered middleware plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MiddlewareChain {
    pre_router: Vec<MiddlewareId>,
    // Registration order; sorted on read.
    post_router: Vec<PostRouterEntry>,
}

/// One line of the execution plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub phase: Phase,
    pub id: MiddlewareId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pre_router(&mut self, id: MiddlewareId) {
        self.pre_router.push(id);
    }

    pub fn add_post_router(&mut self, id: MiddlewareId, priority: i32) {
        self.post_router.push(PostRouterEntry { id, priority });
    }

    pub fn pre_router(&self) -> &[MiddlewareId] {
        &self.pre_router
    }

    /// Post-router entries in execution order.
    pub fn post_router(&self) -> Vec<(&MiddlewareId, i32)> {
        let mut entries: Vec<_> = self
            .post_router
            .iter()
            .map(|e| (&e.id, e.priority))
            .collect();
        // stable: ties stay in registration order
        entries.sort_by_key(|(_, priority)| *priority);
        entries
    }

    pub fn execution_plan(&self) -> Vec<PlanEntry> {
        let pre = self.pre_router.iter().map(|id| PlanEntry {
            phase: Phase::PreRouter,
            id: id.clone(),
            priority: None,
        });
        let post = self.post_router().into_iter().map(|(id, priority)| PlanEntry {
            phase: Phase::PostRouter,
            id: id.clone(),
            priority: Some(priority),
        });
        pre.chain(post).collect()
    }

    pub fn len(&self) -> usize {
        self.pre_router.len() + self.post_router.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Where a registration goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    PreRouter,
    PostRouter { priority: i32 },
}

/// A single entry of a [`MiddlewareFragment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub id: MiddlewareId,
    pub placement: Placement,
    /// Facility that must be available at runtime, if any.
    pub requires: Option<String>,
}

/// An ordered batch of registrations contributed by one config fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MiddlewareFragment {
    registrations: Vec<Registration>,
}

impl MiddlewareFragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// The wiring every web app gets: an error page helper in environments
    /// that ship one, client IP detection, authentication, and the
    /// auth-aware router after dispatch.
    pub fn web_defaults() -> Self {
        Self::new()
            .builtin("error-display", Placement::PreRouter, Some("error-display"))
            .builtin("client-ip", Placement::PreRouter, None)
            .builtin("auth", Placement::PreRouter, None)
            .builtin("auth-aware-router", Placement::PostRouter { priority: 2001 }, None)
    }

    /// Append one registration. Fails on an empty identifier.
    pub fn register(
        mut self,
        id: &str,
        placement: Placement,
        requires: Option<&str>,
    ) -> Result<Self, MiddlewareError> {
        self.registrations.push(Registration {
            id: MiddlewareId::new(id)?,
            placement,
            requires: requires.map(str::to_owned),
        });
        Ok(self)
    }

    pub fn pre_router(self, id: &str) -> Result<Self, MiddlewareError> {
        self.register(id, Placement::PreRouter, None)
    }

    pub fn post_router(self, id: &str, priority: i32) -> Result<Self, MiddlewareError> {
        self.register(id, Placement::PostRouter { priority }, None)
    }

    // Built-in identifiers are non-empty literals.
    fn builtin(mut self, id: &'static str, placement: Placement, requires: Option<&str>) -> Self {
        self.registrations.push(Registration {
            id: MiddlewareId(id.to_owned()),
            placement,
            requires: requires.map(str::to_owned),
        });
        self
    }

    /// Concatenate `other` after this fragment's registrations.
    pub fn then(mut self, other: MiddlewareFragment) -> Self {
        self.registrations.extend(other.registrations);
        self
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Read declarations from `middlewares.pre_router` / `middlewares.post_router`.
    ///
    /// ```toml
    /// [middlewares]
    /// pre_router = ["client-ip", { name = "profiler", requires = "profiler" }]
    /// post_router = [{ name = "audit", priority = 10 }]
    /// ```
    ///
    /// Both keys are optional; absent keys contribute nothing.
    pub fn from_config(tree: &ConfigTree) -> Result<Self, MiddlewareError> {
        let mut fragment = Self::new();

        for (i, item) in declarations(tree, PRE_ROUTER_KEY)?.iter().enumerate() {
            let at = format!("{PRE_ROUTER_KEY}[{i}]");
            fragment
                .registrations
                .push(parse_declaration(&at, item, false)?);
        }
        for (i, item) in declarations(tree, POST_ROUTER_KEY)?.iter().enumerate() {
            let at = format!("{POST_ROUTER_KEY}[{i}]");
            fragment
                .registrations
                .push(parse_declaration(&at, item, true)?);
        }

        Ok(fragment)
    }
}

fn declarations<'t>(tree: &'t ConfigTree, key: &str) -> Result<&'t [ConfigValue], MiddlewareError> {
    if !tree.has(key) {
        return Ok(&[]);
    }
    tree.get_list(key).map_err(|e| match e {
        ConfigError::TypeMismatch { found, .. } => MiddlewareError::InvalidDeclaration {
            key: key.to_owned(),
            reason: format!("expected a list, found a {found}"),
        },
        other => MiddlewareError::InvalidDeclaration {
            key: key.to_owned(),
            reason: other.to_string(),
        },
    })
}

fn parse_declaration(
    at: &str,
    item: &ConfigValue,
    post_router: bool,
) -> Result<Registration, MiddlewareError> {
    let invalid = |reason: &str| MiddlewareError::InvalidDeclaration {
        key: at.to_owned(),
        reason: reason.to_owned(),
    };

    let (name, priority, requires) = match item {
        ConfigValue::String(name) => (name.as_str(), None, None),
        ConfigValue::Table(table) => {
            let name = table
                .get("name")
                .and_then(ConfigValue::as_str)
                .ok_or_else(|| invalid("missing string field 'name'"))?;
            let priority = match table.get("priority") {
                Some(value) => {
                    let raw = value
                        .as_integer()
                        .ok_or_else(|| invalid("'priority' must be an integer"))?;
                    Some(i32::try_from(raw).map_err(|_| invalid("'priority' is out of range"))?)
                }
                None => None,
            };
            let requires = match table.get("requires") {
                Some(value) => Some(
                    value
                        .as_str()
                        .ok_or_else(|| invalid("'requires' must be a string"))?
                        .to_owned(),
                ),
                None => None,
            };
            (name, priority, requires)
        }
        other => {
            return Err(invalid(&format!(
                "expected a name or a table, found a {}",
                other.type_name()
            )));
        }
    };

    let placement = match (post_router, priority) {
        (false, None) => Placement::PreRouter,
        (false, Some(_)) => return Err(invalid("pre-router middleware has no priority")),
        (true, Some(priority)) => Placement::PostRouter { priority },
        (true, None) => return Err(invalid("post-router middleware needs a 'priority'")),
    };

    Ok(Registration {
        id: MiddlewareId::new(name)?,
        placement,
        requires,
    })
}
