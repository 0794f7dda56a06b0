//! Deployment plan: a finite sequence of named steps plus one compensating
//! step that runs when any of them fails.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::domain::error::DeployError;

/// A named deploy step. Execution is delegated to a
/// [`crate::application::ports::StepRunner`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DeployStep(String);

impl DeployStep {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeployStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Steps of [`DeployPlan::standard`], in execution order.
pub const STANDARD_STEPS: [&str; 16] = [
    "info",
    "prepare",
    "lock",
    "release",
    "update_code",
    "check_config",
    "shared",
    "config",
    "writable",
    "vendors",
    "di_optimize",
    "clear_paths",
    "symlink",
    "unlock",
    "cleanup",
    "success",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeployPlan {
    steps: Vec<DeployStep>,
    compensation: Option<DeployStep>,
    armed_by: Option<DeployStep>,
    on_success: Vec<DeployStep>,
}

impl DeployPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Release-based deploy with lock/unlock and a completion notification.
    pub fn standard() -> Self {
        STANDARD_STEPS
            .iter()
            .fold(Self::new(), |plan, name| plan.step(*name))
            .compensate_with("unlock")
            .armed_by("lock")
            .on_success("notify")
    }

    pub fn step(mut self, name: impl Into<String>) -> Self {
        self.steps.push(DeployStep::new(name));
        self
    }

    /// The action that runs after any failed step.
    pub fn compensate_with(mut self, name: impl Into<String>) -> Self {
        self.compensation = Some(DeployStep::new(name));
        self
    }

    /// Only compensate once `name` has completed. Earlier failures leave
    /// nothing to undo.
    pub fn armed_by(mut self, name: impl Into<String>) -> Self {
        self.armed_by = Some(DeployStep::new(name));
        self
    }

    /// A hook that runs once every step has succeeded.
    pub fn on_success(mut self, name: impl Into<String>) -> Self {
        self.on_success.push(DeployStep::new(name));
        self
    }

    pub fn steps(&self) -> &[DeployStep] {
        &self.steps
    }

    pub fn compensation(&self) -> Option<&DeployStep> {
        self.compensation.as_ref()
    }

    pub fn success_hooks(&self) -> &[DeployStep] {
        &self.on_success
    }

    /// Whether a failure after `completed` should run the compensation.
    pub fn compensation_armed(&self, completed: &[DeployStep]) -> bool {
        self.armed_by
            .as_ref()
            .is_none_or(|guard| completed.contains(guard))
    }

    /// A plan needs at least one step and no step may appear twice.
    pub fn validate(&self) -> Result<(), DeployError> {
        if self.steps.is_empty() {
            return Err(DeployError::InvalidPlan("the plan has no steps".into()));
        }
        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.name()) {
                return Err(DeployError::InvalidPlan(format!(
                    "step '{step}' appears more than once"
                )));
            }
        }
        if let Some(guard) = self.armed_by.as_ref().filter(|g| !self.steps.contains(*g)) {
            return Err(DeployError::InvalidPlan(format!(
                "compensation is armed by '{guard}', which is not a step"
            )));
        }
        Ok(())
    }
}
