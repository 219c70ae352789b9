//! Configuration file handling for pkgstrap.
//!
//! Every value the install steps use lives in `InstallerConfig`. The defaults
//! reproduce the plain install script; a JSON file can override any subset of
//! fields, and command-line flags override the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PkgstrapError;
use crate::types::ErrorPolicy;

/// Location of the compatibility symlink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatLink {
    /// Binary the link points at
    pub target: PathBuf,
    /// Link to create
    pub link: PathBuf,
}

impl Default for CompatLink {
    fn default() -> Self {
        // Debian ships fd as fdfind
        Self {
            target: PathBuf::from("/usr/bin/fdfind"),
            link: PathBuf::from("/usr/local/bin/fd"),
        }
    }
}

/// Installer configuration that can be saved/loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    // Inputs
    pub package_list: PathBuf,
    pub requirements: PathBuf,

    // Privilege elevation for the system package and symlink steps
    pub elevate: bool,
    pub elevation_program: String,

    // Step 1
    pub package_manager: String,
    pub package_manager_args: Vec<String>,

    // Step 2
    pub compat_link: CompatLink,

    // Step 3
    pub python_installer: String,
    pub python_installer_args: Vec<String>,

    pub error_policy: ErrorPolicy,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            package_list: PathBuf::from("packages.txt"),
            requirements: PathBuf::from("requirements.txt"),
            elevate: false,
            elevation_program: "sudo".to_string(),
            package_manager: "apt-get".to_string(),
            package_manager_args: vec!["-y".to_string(), "install".to_string()],
            compat_link: CompatLink::default(),
            python_installer: "pip3".to_string(),
            python_installer_args: vec!["install".to_string(), "-r".to_string()],
            error_policy: ErrorPolicy::Continue,
        }
    }
}

/// Values given on the command line; `None` leaves the config untouched
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub package_list: Option<PathBuf>,
    pub requirements: Option<PathBuf>,
    pub elevate: bool,
    pub errexit: bool,
}

impl InstallerConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse configuration JSON")?;

        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize configuration to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Defaults, or the file at `path` when one is given
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line overrides on top of this configuration.
    ///
    /// Flags can only switch elevation and errexit on, mirroring the two
    /// script variants and `set -e`.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(path) = &overrides.package_list {
            self.package_list = path.clone();
        }
        if let Some(path) = &overrides.requirements {
            self.requirements = path.clone();
        }
        if overrides.elevate {
            self.elevate = true;
        }
        if overrides.errexit {
            self.error_policy = ErrorPolicy::Abort;
        }
    }

    /// Elevation prefix to apply, if elevation is on
    pub fn elevation(&self) -> Option<&str> {
        self.elevate.then_some(self.elevation_program.as_str())
    }

    /// Validate the configuration.
    ///
    /// Only checks that the commands are well formed. Whether input files
    /// exist or programs are installed is left to the tools at run time.
    pub fn validate(&self) -> std::result::Result<(), PkgstrapError> {
        if self.package_list.as_os_str().is_empty() {
            return Err(PkgstrapError::validation("package_list must be specified"));
        }
        if self.requirements.as_os_str().is_empty() {
            return Err(PkgstrapError::validation("requirements must be specified"));
        }
        if self.package_manager.trim().is_empty() {
            return Err(PkgstrapError::validation("package_manager must be specified"));
        }
        if self.python_installer.trim().is_empty() {
            return Err(PkgstrapError::validation("python_installer must be specified"));
        }
        if self.elevate && self.elevation_program.trim().is_empty() {
            return Err(PkgstrapError::validation(
                "elevation_program must be specified when elevate is set",
            ));
        }
        if self.compat_link.target.as_os_str().is_empty() {
            return Err(PkgstrapError::validation("compat_link.target must be specified"));
        }
        if self.compat_link.link.as_os_str().is_empty() {
            return Err(PkgstrapError::validation("compat_link.link must be specified"));
        }
        Ok(())
    }
}
