//! Pre-flight environment report for `pkgstrap check`
//!
//! Looks at what the install steps are going to need:
//! - the package list and requirements files are readable
//! - every program the steps invoke is on PATH
//! - whether we are root, and whether elevation is configured
//! - the compatibility link target exists and the link path is free
//!
//! This is informational. `pkgstrap install` never runs it; failures during
//! an install are reported by the tools themselves.

use std::fs;
use std::path::Path;
use std::process::Command;

use crate::config_file::InstallerConfig;

/// Result of environment verification
#[derive(Debug, Default)]
pub struct SanityCheckResult {
    pub missing_binaries: Vec<String>,
    pub unreadable_files: Vec<String>,
    pub is_root: bool,
    pub elevate: bool,
    pub link_target_exists: bool,
    pub link_exists: bool,
}

impl SanityCheckResult {
    /// True if nothing a step needs is missing.
    ///
    /// An existing link only makes the symlink step fail, and a missing link
    /// target is normally installed by the system package step, so neither
    /// is counted.
    pub fn is_ok(&self) -> bool {
        self.missing_binaries.is_empty() && self.unreadable_files.is_empty()
    }

    /// Human-readable warnings, one per problem
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for binary in &self.missing_binaries {
            warnings.push(format!("program not found on PATH: {}", binary));
        }
        for file in &self.unreadable_files {
            warnings.push(format!("cannot read file: {}", file));
        }
        if self.link_exists {
            warnings.push("compatibility link already exists; the symlink step will fail".to_string());
        }
        if !self.is_root && !self.elevate {
            warnings.push(
                "not running as root and elevation is off; package installation may be refused"
                    .to_string(),
            );
        }
        warnings
    }

    /// Things worth knowing that do not make the check fail
    pub fn notes(&self) -> Vec<String> {
        let mut notes = Vec::new();
        if !self.link_target_exists {
            notes.push(
                "compatibility link target does not exist yet; the system package step should install it"
                    .to_string(),
            );
        }
        notes
    }
}

/// Check if a binary is available in PATH
fn binary_exists(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Check if running as root (EUID 0)
fn is_running_as_root() -> bool {
    nix::unistd::geteuid().is_root()
}

fn is_readable(path: &Path) -> bool {
    fs::File::open(path).is_ok()
}

/// Programs the configured steps invoke, without duplicates
fn required_binaries(config: &InstallerConfig) -> Vec<String> {
    let elevation = config.elevation().map(str::to_string);
    let candidates = elevation.into_iter().chain([
        config.package_manager.clone(),
        "ln".to_string(),
        config.python_installer.clone(),
    ]);

    let mut binaries: Vec<String> = Vec::new();
    for binary in candidates {
        if !binaries.contains(&binary) {
            binaries.push(binary);
        }
    }
    binaries
}

/// Inspect the environment for `config`
pub fn verify_environment(config: &InstallerConfig) -> SanityCheckResult {
    let missing_binaries = required_binaries(config)
        .into_iter()
        .filter(|binary| !binary_exists(binary))
        .collect();

    let unreadable_files = [&config.package_list, &config.requirements]
        .into_iter()
        .filter(|path| !is_readable(path))
        .map(|path| path.display().to_string())
        .collect();

    SanityCheckResult {
        missing_binaries,
        unreadable_files,
        is_root: is_running_as_root(),
        elevate: config.elevate,
        link_target_exists: config.compat_link.target.exists(),
        // symlink_metadata also sees dangling links
        link_exists: fs::symlink_metadata(&config.compat_link.link).is_ok(),
    }
}

/// Print the report to stdout and return it
pub fn run_preflight_checks(config: &InstallerConfig) -> SanityCheckResult {
    tracing::debug!("Running pre-flight checks...");
    let result = verify_environment(config);

    println!("pkgstrap pre-flight check");
    println!("  package list:      {}", config.package_list.display());
    println!("  requirements:      {}", config.requirements.display());
    println!(
        "  compat link:       {} -> {}",
        config.compat_link.link.display(),
        config.compat_link.target.display()
    );
    println!("  running as root:   {}", result.is_root);
    println!("  elevation:         {}", config.elevation().unwrap_or("off"));

    for note in result.notes() {
        println!("• {}", note);
    }

    let warnings = result.warnings();
    if warnings.is_empty() {
        println!("✓ No problems found");
    } else {
        for warning in &warnings {
            println!("✗ {}", warning);
        }
    }

    tracing::info!("Pre-flight check finished: ok={}", result.is_ok());
    result
}
