//! Step 1: install OS packages through the system package manager.

use std::ffi::OsString;

use crate::package_list::PackageList;
use crate::step_traits::StepArgs;
use crate::types::StepKind;

/// Arguments for the system package manager.
///
/// With the default configuration this is `apt-get -y install <names...>`.
#[derive(Debug, Clone)]
pub struct SystemPackagesArgs {
    /// Package manager binary (e.g. `apt-get`).
    pub package_manager: String,
    /// Non-interactive install operation, placed before the package names.
    pub install_args: Vec<String>,
    /// Package names, exactly as read from the package list file.
    pub packages: PackageList,
}

impl StepArgs for SystemPackagesArgs {
    fn step_kind(&self) -> StepKind {
        StepKind::SystemPackages
    }

    fn program(&self) -> &str {
        &self.package_manager
    }

    fn to_cli_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.install_args.iter().map(OsString::from).collect();
        args.extend(self.packages.names().iter().cloned());
        args
    }
}
