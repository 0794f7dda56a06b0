//! Scripted step runner for tests and dry runs.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::debug;

use wirebase_core::{
    application::{ApplicationError, ports::StepRunner},
    domain::DeployStep,
    error::{WirebaseError, WirebaseResult},
};

/// Records every step it is asked to run and fails the ones it was told to.
///
/// Clones share the same call log.
#[derive(Debug, Clone, Default)]
pub struct RecordingStepRunner {
    failing: HashSet<String>,
    calls: Arc<Mutex<Vec<DeployStep>>>,
}

impl RecordingStepRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, step: impl Into<String>) -> Self {
        self.failing.insert(step.into());
        self
    }

    /// Steps run so far, in order.
    pub fn calls(&self) -> Vec<DeployStep> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl StepRunner for RecordingStepRunner {
    fn run(&self, step: &DeployStep) -> WirebaseResult<()> {
        self.calls
            .lock()
            .map_err(|_| WirebaseError::Internal {
                message: "step log lock poisoned".into(),
            })?
            .push(step.clone());
        debug!(step = %step, "Step recorded");

        if self.failing.contains(step.name()) {
            return Err(ApplicationError::StepExecution {
                step: step.to_string(),
                reason: "scripted failure".into(),
            }
            .into());
        }
        Ok(())
    }
}
