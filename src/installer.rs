//! Installer module
//!
//! Runs the three install steps in order: system packages, compatibility
//! symlink, Python requirements. Each step is one blocking process. What
//! happens after a failing step is decided by the configured `ErrorPolicy`;
//! the tools' own output is the only error message a user sees for a step.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use strum::{Display, IntoEnumIterator};

use crate::config_file::InstallerConfig;
use crate::error::Result;
use crate::invocation::Invocation;
use crate::package_list::PackageList;
use crate::runner::Executor;
use crate::step_traits::StepArgs;
use crate::steps::{CompatLinkArgs, PythonRequirementsArgs, SystemPackagesArgs};
use crate::types::{ErrorPolicy, StepKind};

/// Resolve the invocation for one step.
///
/// Only the system package step can fail here, when its package list cannot
/// be read.
pub fn resolve_step(config: &InstallerConfig, step: StepKind) -> Result<Invocation> {
    let elevation = config.elevation();
    let invocation = match step {
        StepKind::SystemPackages => SystemPackagesArgs {
            package_manager: config.package_manager.clone(),
            install_args: config.package_manager_args.clone(),
            packages: PackageList::load(&config.package_list)?,
        }
        .to_invocation(elevation),
        StepKind::CompatLink => CompatLinkArgs {
            target: config.compat_link.target.clone(),
            link: config.compat_link.link.clone(),
        }
        .to_invocation(elevation),
        StepKind::PythonRequirements => PythonRequirementsArgs {
            installer: config.python_installer.clone(),
            install_args: config.python_installer_args.clone(),
            requirements: config.requirements.clone(),
        }
        .to_invocation(elevation),
    };
    Ok(invocation)
}

/// A step together with the command it would run
#[derive(Debug)]
pub struct PlannedStep {
    pub step: StepKind,
    pub invocation: Result<Invocation>,
}

/// Resolve every step without running anything
pub fn plan(config: &InstallerConfig) -> Vec<PlannedStep> {
    StepKind::iter()
        .map(|step| PlannedStep {
            step,
            invocation: resolve_step(config, step),
        })
        .collect()
}

/// Human-readable plan, one numbered line per step
pub fn plan_text(planned: &[PlannedStep]) -> String {
    let mut out = String::new();
    for (index, p) in planned.iter().enumerate() {
        let line = match &p.invocation {
            Ok(inv) => format!("{}. {}: {}\n", index + 1, p.step, inv),
            Err(e) => format!("{}. {}: cannot resolve ({})\n", index + 1, p.step, e),
        };
        out.push_str(&line);
    }
    out
}

/// Plan as a pretty JSON array of `{step, command}` or `{step, error}`
pub fn plan_json(planned: &[PlannedStep]) -> anyhow::Result<String> {
    let steps: Vec<serde_json::Value> = planned
        .iter()
        .map(|p| match &p.invocation {
            Ok(inv) => serde_json::json!({ "step": p.step, "command": inv }),
            Err(e) => serde_json::json!({ "step": p.step, "error": e.to_string() }),
        })
        .collect();
    serde_json::to_string_pretty(&steps).context("Failed to serialize plan")
}

/// Final state of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StepStatus {
    Succeeded,
    Failed,
    /// Not attempted because an earlier step failed under `ErrorPolicy::Abort`
    Skipped,
}

/// What happened to one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step: StepKind,
    /// Command that ran, if one could be resolved
    pub command: Option<Invocation>,
    pub status: StepStatus,
    /// Shell-style exit status; `None` for skipped steps
    pub exit_code: Option<i32>,
    /// Why the step could not run at all, if that is why it failed
    pub error: Option<String>,
}

impl StepOutcome {
    fn skipped(step: StepKind) -> Self {
        Self {
            step,
            command: None,
            status: StepStatus::Skipped,
            exit_code: None,
            error: None,
        }
    }
}

/// Outcome of a whole run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub error_policy: ErrorPolicy,
    pub elevated: bool,
    pub steps: Vec<StepOutcome>,
}

impl RunReport {
    /// Exit status of the last step that was attempted, 0 if none were.
    ///
    /// Under `Continue` this is the Python step's status, as with a script
    /// whose last statement decides its exit code. Under `Abort` it is the
    /// failing step's status.
    pub fn exit_code(&self) -> i32 {
        self.steps
            .iter()
            .rev()
            .find(|outcome| outcome.status != StepStatus::Skipped)
            .and_then(|outcome| outcome.exit_code)
            .unwrap_or(0)
    }

    /// True when every step succeeded
    pub fn success(&self) -> bool {
        self.steps
            .iter()
            .all(|outcome| outcome.status == StepStatus::Succeeded)
    }

    /// Whether `step` was run (successfully or not)
    pub fn attempted(&self, step: StepKind) -> bool {
        self.outcome(step)
            .is_some_and(|outcome| outcome.status != StepStatus::Skipped)
    }

    pub fn outcome(&self, step: StepKind) -> Option<&StepOutcome> {
        self.steps.iter().find(|outcome| outcome.step == step)
    }

    /// Steps that failed, in order
    pub fn failed_steps(&self) -> Vec<StepKind> {
        self.steps
            .iter()
            .filter(|outcome| outcome.status == StepStatus::Failed)
            .map(|outcome| outcome.step)
            .collect()
    }

    /// Write the report as pretty JSON
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize run report")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write run report to {:?}", path.as_ref()))?;
        Ok(())
    }
}

/// Sequential installer
pub struct Installer<E: Executor> {
    config: InstallerConfig,
    executor: E,
}

impl<E: Executor> Installer<E> {
    /// Create a new installer instance
    pub fn new(config: InstallerConfig, executor: E) -> Self {
        Self { config, executor }
    }

    /// Give back the executor, e.g. to inspect what a dry run recorded
    pub fn into_executor(self) -> E {
        self.executor
    }

    /// Run all steps in order and report what happened
    pub fn run(&mut self) -> RunReport {
        let total = StepKind::iter().count();
        let mut steps = Vec::with_capacity(total);
        let mut aborted = false;

        tracing::info!(
            "Starting install (elevated={}, on failure: {})",
            self.config.elevate,
            self.config.error_policy
        );

        for (index, step) in StepKind::iter().enumerate() {
            if aborted {
                tracing::info!("Skipping step {}/{}: {}", index + 1, total, step.description());
                steps.push(StepOutcome::skipped(step));
                continue;
            }

            tracing::info!("Step {}/{}: {}", index + 1, total, step.description());
            let outcome = self.run_step(step);

            if outcome.status == StepStatus::Failed {
                let code = outcome.exit_code.unwrap_or(1);
                match self.config.error_policy {
                    ErrorPolicy::Continue => {
                        tracing::warn!("Step {} failed with status {}, continuing", step, code);
                    }
                    ErrorPolicy::Abort => {
                        tracing::error!("Step {} failed with status {}, aborting", step, code);
                        aborted = true;
                    }
                }
            }
            steps.push(outcome);
        }

        let report = RunReport {
            error_policy: self.config.error_policy,
            elevated: self.config.elevate,
            steps,
        };

        if report.success() {
            tracing::info!("All {} steps completed successfully", total);
        } else {
            tracing::info!(
                "Finished with failed step(s) {:?}, exit status {}",
                report.failed_steps(),
                report.exit_code()
            );
        }

        report
    }

    fn run_step(&mut self, step: StepKind) -> StepOutcome {
        let invocation = match resolve_step(&self.config, step) {
            Ok(invocation) => invocation,
            Err(e) => {
                tracing::error!("{}", e);
                return StepOutcome {
                    step,
                    command: None,
                    status: StepStatus::Failed,
                    exit_code: Some(e.exit_code()),
                    error: Some(e.to_string()),
                };
            }
        };

        match self.executor.execute(&invocation) {
            Ok(output) => StepOutcome {
                step,
                command: Some(invocation),
                status: if output.success {
                    StepStatus::Succeeded
                } else {
                    StepStatus::Failed
                },
                exit_code: Some(output.shell_status()),
                error: None,
            },
            Err(e) => {
                tracing::error!("{}", e);
                StepOutcome {
                    step,
                    command: Some(invocation),
                    status: StepStatus::Failed,
                    exit_code: Some(e.exit_code()),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::StepOutput;

    /// Executor that fails any program named in `failing`
    struct ScriptedExecutor {
        failing: Vec<&'static str>,
        ran: Vec<Invocation>,
    }

    impl Executor for ScriptedExecutor {
        fn execute(&mut self, invocation: &Invocation) -> Result<StepOutput> {
            self.ran.push(invocation.clone());
            let code = if self.failing.contains(&invocation.program.as_str()) {
                1
            } else {
                0
            };
            Ok(StepOutput::from_code(code))
        }
    }

    fn config_with_list(dir: &tempfile::TempDir, content: &str) -> InstallerConfig {
        let list = dir.path().join("packages.txt");
        fs::write(&list, content).unwrap();
        InstallerConfig {
            package_list: list,
            ..InstallerConfig::default()
        }
    }

    #[test]
    fn test_plan_resolves_all_steps_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_list(&dir, "git");
        let planned = plan(&config);
        let kinds: Vec<StepKind> = planned.iter().map(|p| p.step).collect();
        assert_eq!(kinds, StepKind::iter().collect::<Vec<_>>());
        assert!(planned.iter().all(|p| p.invocation.is_ok()));
    }

    #[test]
    fn test_plan_reports_unreadable_list() {
        let dir = tempfile::tempdir().unwrap();
        let config = InstallerConfig {
            package_list: dir.path().join("missing.txt"),
            ..InstallerConfig::default()
        };
        let planned = plan(&config);
        assert!(planned[0].invocation.is_err());
        assert!(planned[1].invocation.is_ok());
        assert!(planned[2].invocation.is_ok());
    }

    #[test]
    fn test_plan_text_lists_numbered_commands() {
        let dir = tempfile::tempdir().unwrap();
        let config = InstallerConfig {
            elevate: true,
            requirements: "requirements.txt".into(),
            ..config_with_list(&dir, "git curl")
        };
        let text = plan_text(&plan(&config));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "1. system-packages: sudo apt-get -y install git curl",
                "2. compat-link: sudo ln -s /usr/bin/fdfind /usr/local/bin/fd",
                "3. python-requirements: pip3 install -r requirements.txt",
            ]
        );
    }

    #[test]
    fn test_plan_json_carries_commands_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        let config = InstallerConfig {
            package_list: dir.path().join("missing.txt"),
            ..InstallerConfig::default()
        };
        let json = plan_json(&plan(&config)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let steps = value.as_array().unwrap();

        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0]["step"], "system-packages");
        assert!(steps[0]["error"].as_str().unwrap().contains("missing.txt"));
        assert_eq!(steps[1]["command"]["program"], "ln");
        assert_eq!(
            steps[2]["command"]["args"],
            serde_json::json!(["install", "-r", "requirements.txt"])
        );
    }

    #[test]
    fn test_continue_runs_every_step() {
        let dir = tempfile::tempdir().unwrap();
        let exec = ScriptedExecutor {
            failing: vec!["ln"],
            ran: vec![],
        };
        let mut installer = Installer::new(config_with_list(&dir, "git"), exec);
        let report = installer.run();

        assert_eq!(report.failed_steps(), vec![StepKind::CompatLink]);
        assert!(report.attempted(StepKind::PythonRequirements));
        assert_eq!(report.exit_code(), 0);
        assert_eq!(installer.into_executor().ran.len(), 3);
    }

    #[test]
    fn test_abort_stops_at_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = InstallerConfig {
            error_policy: ErrorPolicy::Abort,
            ..config_with_list(&dir, "git")
        };
        let exec = ScriptedExecutor {
            failing: vec!["ln"],
            ran: vec![],
        };
        let mut installer = Installer::new(config, exec);
        let report = installer.run();

        assert!(!report.attempted(StepKind::PythonRequirements));
        assert_eq!(
            report.outcome(StepKind::PythonRequirements).unwrap().status,
            StepStatus::Skipped
        );
        assert_eq!(report.exit_code(), 1);
        assert_eq!(installer.into_executor().ran.len(), 2);
    }

    #[test]
    fn test_unreadable_list_fails_step_without_running_package_manager() {
        let dir = tempfile::tempdir().unwrap();
        let config = InstallerConfig {
            package_list: dir.path().join("missing.txt"),
            ..InstallerConfig::default()
        };
        let exec = ScriptedExecutor {
            failing: vec![],
            ran: vec![],
        };
        let mut installer = Installer::new(config, exec);
        let report = installer.run();

        let first = report.outcome(StepKind::SystemPackages).unwrap();
        assert_eq!(first.status, StepStatus::Failed);
        assert_eq!(first.exit_code, Some(1));
        assert!(first.command.is_none());
        assert!(first.error.as_deref().unwrap().contains("missing.txt"));

        let ran = installer.into_executor().ran;
        assert_eq!(ran.len(), 2);
        assert!(ran.iter().all(|inv| inv.program != "apt-get"));
    }

    #[test]
    fn test_exit_code_is_last_attempted_step() {
        let dir = tempfile::tempdir().unwrap();
        let exec = ScriptedExecutor {
            failing: vec!["pip3"],
            ran: vec![],
        };
        let report = Installer::new(config_with_list(&dir, "git"), exec).run();
        assert_eq!(report.exit_code(), 1);
        assert!(!report.success());
    }

    #[test]
    fn test_report_json_roundtrip_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let exec = ScriptedExecutor {
            failing: vec![],
            ran: vec![],
        };
        let report = Installer::new(config_with_list(&dir, "git vim"), exec).run();
        let path = dir.path().join("report.json");
        report.write_to_file(&path).unwrap();

        let loaded: RunReport =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, report);
        assert!(loaded.success());
    }
}
