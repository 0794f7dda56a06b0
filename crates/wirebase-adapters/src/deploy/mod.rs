//! Deploy step runners.

mod recording;
mod shell;

pub use recording::RecordingStepRunner;
pub use shell::{DEPLOY_PATH_KEY, RELEASE_PATH_KEY, ShellStepRunner, TASKS_KEY};
