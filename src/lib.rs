//! pkgstrap library
//!
//! Installs OS packages from a package list, creates a compatibility symlink
//! for a renamed binary and installs Python requirements, strictly in that
//! order.

pub mod cli;
pub mod config_file;
pub mod error;
pub mod installer;
pub mod invocation;
pub mod package_list;
pub mod process_guard;
pub mod runner;
pub mod sanity;
pub mod step_traits;
pub mod steps;
pub mod types;

// Re-export main types for convenience
pub use config_file::{CompatLink, ConfigOverrides, InstallerConfig};
pub use error::PkgstrapError;
pub use installer::{Installer, PlannedStep, RunReport, StepOutcome, StepStatus, plan};
pub use invocation::Invocation;
pub use package_list::PackageList;
pub use process_guard::{ChildRegistry, CommandLifecycle, ProcessGuard};
pub use runner::{DryRunExecutor, Executor, ProcessExecutor, StepOutput};
pub use step_traits::StepArgs;
pub use steps::{CompatLinkArgs, PythonRequirementsArgs, SystemPackagesArgs};
pub use types::{ErrorPolicy, StepKind};
