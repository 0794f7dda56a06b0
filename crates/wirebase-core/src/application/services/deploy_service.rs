//! Deploy Service - runs a [`DeployPlan`] as a minimal saga.
//!
//! 1. Steps run in order; the first failure stops the sequence.
//! 2. After a failure the plan's compensating step runs (releasing the
//!    deploy lock), provided the step that arms it already completed. If the
//!    compensation fails too, both errors are surfaced.
//! 3. After full success the success hooks run. A failing hook is logged
//!    and recorded but does not fail a deploy that already went live.

use tracing::{error, info, instrument, warn};

use crate::{
    application::ports::StepRunner,
    domain::{DeployError, DeployPlan, DeployStep},
    error::WirebaseResult,
};

/// Outcome of a successful deploy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployReport {
    pub completed: Vec<DeployStep>,
    pub hooks_run: Vec<DeployStep>,
    pub hook_failures: Vec<(DeployStep, String)>,
}

pub struct DeployService {
    runner: Box<dyn StepRunner>,
}

impl DeployService {
    pub fn new(runner: Box<dyn StepRunner>) -> Self {
        Self { runner }
    }

    pub fn run(&self, plan: &DeployPlan) -> WirebaseResult<DeployReport> {
        self.run_with(plan, |_| {})
    }

    /// Like [`DeployService::run`], calling `on_step` before each step starts.
    #[instrument(skip_all, fields(steps = plan.steps().len()))]
    pub fn run_with(
        &self,
        plan: &DeployPlan,
        mut on_step: impl FnMut(&DeployStep),
    ) -> WirebaseResult<DeployReport> {
        plan.validate()?;

        let mut report = DeployReport::default();
        for step in plan.steps() {
            on_step(step);
            info!(step = %step, "Running deploy step");

            if let Err(cause) = self.runner.run(step) {
                let reason = cause.to_string();
                error!(step = %step, %reason, "Deploy step failed");
                if !plan.compensation_armed(&report.completed) {
                    return Err(DeployError::StepFailed {
                        step: step.to_string(),
                        reason,
                        compensated: false,
                    }
                    .into());
                }
                return Err(self.compensate(plan, &mut on_step, step, reason).into());
            }
            report.completed.push(step.clone());
        }

        for hook in plan.success_hooks() {
            on_step(hook);
            match self.runner.run(hook) {
                Ok(()) => report.hooks_run.push(hook.clone()),
                Err(e) => {
                    warn!(hook = %hook, error = %e, "Success hook failed");
                    report.hook_failures.push((hook.clone(), e.to_string()));
                }
            }
        }

        info!(completed = report.completed.len(), "Deploy finished");
        Ok(report)
    }

    fn compensate(
        &self,
        plan: &DeployPlan,
        on_step: &mut impl FnMut(&DeployStep),
        failed: &DeployStep,
        reason: String,
    ) -> DeployError {
        let Some(compensation) = plan.compensation() else {
            return DeployError::StepFailed {
                step: failed.to_string(),
                reason,
                compensated: false,
            };
        };

        on_step(compensation);
        warn!(compensation = %compensation, "Running compensating step");
        match self.runner.run(compensation) {
            Ok(()) => DeployError::StepFailed {
                step: failed.to_string(),
                reason,
                compensated: true,
            },
            Err(e) => {
                error!(compensation = %compensation, error = %e, "Compensating step failed");
                DeployError::CompensationFailed {
                    step: failed.to_string(),
                    reason,
                    compensation: compensation.to_string(),
                    compensation_reason: e.to_string(),
                }
            }
        }
    }
}
