//! Step execution.
//!
//! The installer hands every resolved `Invocation` to an `Executor`. The
//! production executor spawns a real child process; the dry-run executor only
//! logs. Tests plug in their own executors to observe the exact argv.
//!
//! # Process rules
//!
//! - stdin, stdout and stderr are inherited: the tools print and prompt
//!   themselves, nothing is captured or rewritten
//! - the child is bound to the parent and registered in `ChildRegistry`
//!   while it runs
//! - calls block until the child exits

use std::os::unix::process::ExitStatusExt;
use std::process::{Command, ExitStatus};

use crate::error::{PkgstrapError, Result};
use crate::invocation::Invocation;
use crate::process_guard::{ChildRegistry, CommandLifecycle};

/// Runs one invocation to completion
pub trait Executor {
    /// Execute `invocation` and report how it exited.
    ///
    /// `Err` means the program could not be started at all; a program that
    /// ran and failed is `Ok` with `success == false`.
    fn execute(&mut self, invocation: &Invocation) -> Result<StepOutput>;
}

impl<E: Executor + ?Sized> Executor for &mut E {
    fn execute(&mut self, invocation: &Invocation) -> Result<StepOutput> {
        (**self).execute(invocation)
    }
}

/// How a step's process finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutput {
    /// Exit code (None if terminated by signal).
    pub exit_code: Option<i32>,
    /// Signal that terminated the process, if any.
    pub signal: Option<i32>,
    /// Whether the process exited successfully (exit code 0).
    pub success: bool,
    /// Whether execution was skipped because of dry-run mode.
    pub dry_run: bool,
}

impl StepOutput {
    /// Output of a process that exited with `code`
    pub fn from_code(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            signal: None,
            success: code == 0,
            dry_run: false,
        }
    }

    fn from_status(status: ExitStatus) -> Self {
        Self {
            exit_code: status.code(),
            signal: status.signal(),
            success: status.success(),
            dry_run: false,
        }
    }

    /// Exit status as a shell would report it: the exit code, or 128+N when
    /// killed by signal N.
    pub fn shell_status(&self) -> i32 {
        match (self.exit_code, self.signal) {
            (Some(code), _) => code,
            (None, Some(sig)) => 128 + sig,
            (None, None) => 1,
        }
    }
}

/// Executor that spawns real child processes
#[derive(Debug, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Executor for ProcessExecutor {
    fn execute(&mut self, invocation: &Invocation) -> Result<StepOutput> {
        tracing::info!("Running: {}", invocation);

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .bind_to_parent()
            .spawn()
            .map_err(|source| PkgstrapError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;
        let pid = child.id();

        if let Ok(mut registry) = ChildRegistry::global().lock() {
            registry.register(pid);
        }

        let waited = child.wait();

        if let Ok(mut registry) = ChildRegistry::global().lock() {
            registry.unregister(pid);
        }

        let status = waited?;
        let output = StepOutput::from_status(status);
        if output.success {
            tracing::debug!("{} exited successfully", invocation.program);
        } else {
            tracing::debug!("{} exited with {:?}", invocation.program, status);
        }
        Ok(output)
    }
}

/// Executor that logs invocations instead of running them
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    /// Everything that would have run, in order
    pub skipped: Vec<Invocation>,
}

impl DryRunExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Executor for DryRunExecutor {
    fn execute(&mut self, invocation: &Invocation) -> Result<StepOutput> {
        tracing::info!("[DRY RUN] Would run: {}", invocation);
        self.skipped.push(invocation.clone());
        Ok(StepOutput {
            exit_code: Some(0),
            signal: None,
            success: true,
            dry_run: true,
        })
    }
}
