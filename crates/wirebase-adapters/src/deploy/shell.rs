//! Shell-backed step runner.
//!
//! Each step name maps to a command under `deploy.tasks`:
//!
//! ```toml
//! [deploy]
//! path = "/var/www/site"
//!
//! [deploy.tasks]
//! lock = "mkdir {{deploy_path}}/.dep/lock"
//! vendors = "cd {{release_path}} && composer install --no-dev"
//! unlock = "rmdir {{deploy_path}}/.dep/lock"
//! ```
//!
//! Commands run through `sh -c`. A step with no command is skipped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, instrument};

use wirebase_core::{
    application::{ApplicationError, ports::StepRunner},
    domain::{ConfigError, ConfigTree, ConfigValue, DeployStep},
    error::WirebaseResult,
};

pub const TASKS_KEY: &str = "deploy.tasks";
pub const DEPLOY_PATH_KEY: &str = "deploy.path";
pub const RELEASE_PATH_KEY: &str = "deploy.release_path";

#[derive(Debug, Clone)]
pub struct ShellStepRunner {
    commands: BTreeMap<String, String>,
    deploy_path: PathBuf,
    release_path: PathBuf,
}

impl ShellStepRunner {
    pub fn new(deploy_path: impl Into<PathBuf>) -> Self {
        let deploy_path = deploy_path.into();
        Self {
            release_path: deploy_path.join("release"),
            deploy_path,
            commands: BTreeMap::new(),
        }
    }

    /// Read `deploy.*`. `deploy.path` defaults to `base_path`, and
    /// `deploy.release_path` to `{deploy_path}/release`.
    pub fn from_config(tree: &ConfigTree, base_path: &Path) -> Result<Self, ConfigError> {
        let deploy_path = if tree.has(DEPLOY_PATH_KEY) {
            PathBuf::from(tree.get_str(DEPLOY_PATH_KEY)?)
        } else {
            base_path.to_path_buf()
        };
        let mut runner = Self::new(deploy_path);
        if tree.has(RELEASE_PATH_KEY) {
            runner.release_path = PathBuf::from(tree.get_str(RELEASE_PATH_KEY)?);
        }

        if tree.has(TASKS_KEY) {
            let tasks = tree.get(TASKS_KEY)?;
            let ConfigValue::Table(tasks) = tasks else {
                return Err(ConfigError::TypeMismatch {
                    key: TASKS_KEY.into(),
                    expected: "table",
                    found: tasks.type_name(),
                });
            };
            for step in tasks.keys() {
                let key = format!("{TASKS_KEY}.{step}");
                runner.commands.insert(step.clone(), tree.get_str(&key)?.to_owned());
            }
        }

        Ok(runner)
    }

    pub fn with_command(mut self, step: impl Into<String>, command: impl Into<String>) -> Self {
        self.commands.insert(step.into(), command.into());
        self
    }

    pub fn deploy_path(&self) -> &Path {
        &self.deploy_path
    }

    pub fn release_path(&self) -> &Path {
        &self.release_path
    }

    /// The command `step` would run, placeholders expanded.
    pub fn command_for(&self, step: &DeployStep) -> Option<String> {
        self.commands.get(step.name()).map(|template| {
            template
                .replace("{{release_path}}", &self.release_path.display().to_string())
                .replace("{{deploy_path}}", &self.deploy_path.display().to_string())
        })
    }
}

impl StepRunner for ShellStepRunner {
    #[instrument(skip_all, fields(step = %step))]
    fn run(&self, step: &DeployStep) -> WirebaseResult<()> {
        let Some(command) = self.command_for(step) else {
            info!("No command configured, step skipped");
            return Ok(());
        };

        debug!(%command, "Spawning step command");
        let output = Command::new("sh")
            .arg("-c")
            .arg(&command)
            .env("DEPLOY_PATH", &self.deploy_path)
            .env("RELEASE_PATH", &self.release_path)
            .output()
            .map_err(|e| ApplicationError::StepExecution {
                step: step.to_string(),
                reason: format!("could not spawn shell: {e}"),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            debug!(stdout = %stdout.trim(), "Step output");
        }

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ApplicationError::StepExecution {
                step: step.to_string(),
                reason: format!("{}: {}", output.status, stderr.trim()),
            }
            .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn placeholders_expand() {
        let runner = ShellStepRunner::new("/var/www/site")
            .with_command("vendors", "cd {{release_path}} && composer install")
            .with_command("lock", "touch {{deploy_path}}/.lock");

        assert_eq!(
            runner.command_for(&DeployStep::new("vendors")).unwrap(),
            "cd /var/www/site/release && composer install"
        );
        assert_eq!(
            runner.command_for(&DeployStep::new("lock")).unwrap(),
            "touch /var/www/site/.lock"
        );
        assert!(runner.command_for(&DeployStep::new("info")).is_none());
    }

    #[test]
    fn reads_tasks_from_config() {
        let tree = ConfigTree::new()
            .with("deploy.path", "/srv/site")
            .with("deploy.tasks.lock", "true")
            .with("deploy.tasks.unlock", "true");
        let runner = ShellStepRunner::from_config(&tree, Path::new("/ignored")).unwrap();

        assert_eq!(runner.deploy_path(), Path::new("/srv/site"));
        assert_eq!(runner.release_path(), Path::new("/srv/site/release"));
        assert!(runner.command_for(&DeployStep::new("unlock")).is_some());
    }

    #[test]
    fn non_table_tasks_rejected() {
        let tree = ConfigTree::new().with("deploy.tasks", "lock");
        assert!(ShellStepRunner::from_config(&tree, Path::new("/srv")).is_err());
    }

    #[test]
    fn step_without_command_is_skipped() {
        let runner = ShellStepRunner::new("/nonexistent");
        assert!(runner.run(&DeployStep::new("info")).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn runs_command_in_shell() {
        let dir = TempDir::new().unwrap();
        let runner = ShellStepRunner::new(dir.path())
            .with_command("prepare", "mkdir -p {{deploy_path}}/shared && touch \"$RELEASE_PATH.marker\"");

        runner.run(&DeployStep::new("prepare")).unwrap();
        assert!(dir.path().join("shared").is_dir());
        assert!(dir.path().join("release.marker").exists());
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_step_failure() {
        let runner = ShellStepRunner::new("/tmp").with_command("check_config", "echo broken >&2; exit 3");
        let err = runner.run(&DeployStep::new("check_config")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("check_config"));
        assert!(message.contains("broken"));
    }
}
