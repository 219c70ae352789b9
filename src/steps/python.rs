//! Step 3: install Python dependencies from a requirements file.

use std::ffi::OsString;
use std::path::PathBuf;

use crate::step_traits::StepArgs;
use crate::types::StepKind;

/// Arguments for the Python package manager.
///
/// With the default configuration this is `pip3 install -r requirements.txt`.
/// The requirements file is passed by path and never read here.
#[derive(Debug, Clone)]
pub struct PythonRequirementsArgs {
    /// Python package manager binary (e.g. `pip3`).
    pub installer: String,
    /// Arguments placed before the requirements path.
    pub install_args: Vec<String>,
    /// Requirements file path, passed through unchanged.
    pub requirements: PathBuf,
}

impl StepArgs for PythonRequirementsArgs {
    fn step_kind(&self) -> StepKind {
        StepKind::PythonRequirements
    }

    fn program(&self) -> &str {
        &self.installer
    }

    fn to_cli_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.install_args.iter().map(OsString::from).collect();
        args.push(self.requirements.clone().into_os_string());
        args
    }
}
