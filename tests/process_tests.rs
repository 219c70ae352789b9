//! End-to-end tests with real child processes
//!
//! Stand-in tools (`sh` scripts, `true`, the real `ln`) replace apt-get and
//! pip so the whole pipeline runs without touching the host.

use std::ffi::OsStr;
use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use pkgstrap::config_file::{CompatLink, InstallerConfig};
use pkgstrap::installer::{Installer, StepStatus};
use pkgstrap::runner::ProcessExecutor;
use pkgstrap::types::{ErrorPolicy, StepKind};

/// `sh -c` script that writes each of its arguments on its own line to `out`
fn argv_recorder(out: &Path) -> Vec<String> {
    vec![
        "-c".to_string(),
        format!("printf '%s\\n' \"$@\" > '{}'", out.display()),
        "recorder".to_string(),
    ]
}

fn sandbox_config(dir: &Path, list: &str) -> InstallerConfig {
    let package_list = dir.join("packages.txt");
    let requirements = dir.join("requirements.txt");
    let target = dir.join("fdfind");
    fs::write(&package_list, list).unwrap();
    fs::write(&requirements, "requests==2.31.0\n").unwrap();
    fs::write(&target, "#!/bin/sh\n").unwrap();

    InstallerConfig {
        package_list,
        requirements,
        package_manager: "sh".into(),
        package_manager_args: argv_recorder(&dir.join("packages.out")),
        compat_link: CompatLink {
            target,
            link: dir.join("fd"),
        },
        python_installer: "sh".into(),
        python_installer_args: argv_recorder(&dir.join("requirements.out")),
        ..InstallerConfig::default()
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_full_run_with_real_processes() {
    let dir = tempfile::tempdir().unwrap();
    let config = sandbox_config(dir.path(), "git curl vim");

    let report = Installer::new(config, ProcessExecutor::new()).run();

    assert!(report.success(), "report: {:?}", report);
    assert_eq!(report.exit_code(), 0);
    assert_eq!(read_lines(&dir.path().join("packages.out")), ["git", "curl", "vim"]);
    assert_eq!(
        read_lines(&dir.path().join("requirements.out")),
        [dir.path().join("requirements.txt").display().to_string()]
    );

    let link = dir.path().join("fd");
    assert_eq!(fs::read_link(&link).unwrap(), dir.path().join("fdfind"));
}

#[test]
fn test_empty_list_reaches_tool_with_no_names() {
    let dir = tempfile::tempdir().unwrap();
    let config = sandbox_config(dir.path(), "\n");

    let report = Installer::new(config, ProcessExecutor::new()).run();

    assert!(report.success());
    // printf with no arguments still prints one empty line
    assert_eq!(read_lines(&dir.path().join("packages.out")), [""]);
}

#[test]
fn test_second_run_fails_link_but_installs_requirements() {
    let dir = tempfile::tempdir().unwrap();
    let config = sandbox_config(dir.path(), "git");

    let first = Installer::new(config.clone(), ProcessExecutor::new()).run();
    assert!(first.success());
    fs::remove_file(dir.path().join("requirements.out")).unwrap();

    let second = Installer::new(config, ProcessExecutor::new()).run();

    let link = second.outcome(StepKind::CompatLink).unwrap();
    assert_eq!(link.status, StepStatus::Failed);
    assert_ne!(link.exit_code, Some(0));
    assert!(second.attempted(StepKind::PythonRequirements));
    assert!(dir.path().join("requirements.out").exists());
    assert_eq!(second.exit_code(), 0);
}

#[test]
fn test_second_run_under_abort_skips_requirements() {
    let dir = tempfile::tempdir().unwrap();
    let config = InstallerConfig {
        error_policy: ErrorPolicy::Abort,
        ..sandbox_config(dir.path(), "git")
    };

    assert!(Installer::new(config.clone(), ProcessExecutor::new()).run().success());
    fs::remove_file(dir.path().join("requirements.out")).unwrap();

    let second = Installer::new(config, ProcessExecutor::new()).run();

    assert!(!second.attempted(StepKind::PythonRequirements));
    assert!(!dir.path().join("requirements.out").exists());
    assert_ne!(second.exit_code(), 0);
}

#[test]
fn test_missing_program_reports_127_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let config = InstallerConfig {
        package_manager: "pkgstrap-missing-package-manager".into(),
        package_manager_args: vec![],
        ..sandbox_config(dir.path(), "git")
    };

    let report = Installer::new(config, ProcessExecutor::new()).run();

    let first = report.outcome(StepKind::SystemPackages).unwrap();
    assert_eq!(first.status, StepStatus::Failed);
    assert_eq!(first.exit_code, Some(127));
    assert!(report.attempted(StepKind::CompatLink));
    assert!(report.attempted(StepKind::PythonRequirements));
}

#[test]
fn test_non_utf8_requirements_path_reaches_real_process() {
    let dir = tempfile::tempdir().unwrap();
    let requirements = dir.path().join(OsStr::from_bytes(b"req\xff.txt"));
    fs::write(&requirements, "requests==2.31.0\n").unwrap();
    let config = InstallerConfig {
        requirements,
        python_installer: "sh".into(),
        python_installer_args: vec!["-c".into(), "test -e \"$1\"".into(), "pip".into()],
        ..sandbox_config(dir.path(), "git")
    };

    let report = Installer::new(config, ProcessExecutor::new()).run();

    let pip = report.outcome(StepKind::PythonRequirements).unwrap();
    assert_eq!(pip.status, StepStatus::Succeeded, "report: {:?}", report);
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn test_exit_code_comes_from_last_step() {
    let dir = tempfile::tempdir().unwrap();
    let config = InstallerConfig {
        python_installer: "sh".into(),
        python_installer_args: vec!["-c".into(), "exit 7".into(), "pip".into()],
        ..sandbox_config(dir.path(), "git")
    };

    let report = Installer::new(config, ProcessExecutor::new()).run();
    assert_eq!(report.exit_code(), 7);
}
