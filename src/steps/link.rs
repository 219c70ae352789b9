//! Step 2: compatibility symlink for a binary installed under a renamed alias.
//!
//! Runs `ln -s TARGET LINK`. This is deliberately not idempotent: when LINK
//! already exists `ln` fails with "File exists" and the step reports failure.

use std::ffi::OsString;
use std::path::PathBuf;

use crate::step_traits::StepArgs;
use crate::types::StepKind;

/// Arguments for `ln -s`.
#[derive(Debug, Clone)]
pub struct CompatLinkArgs {
    /// Existing binary the link points at (e.g. `/usr/bin/fdfind`).
    pub target: PathBuf,
    /// Path of the link to create (e.g. `/usr/local/bin/fd`).
    pub link: PathBuf,
}

impl StepArgs for CompatLinkArgs {
    fn step_kind(&self) -> StepKind {
        StepKind::CompatLink
    }

    fn program(&self) -> &str {
        "ln"
    }

    fn to_cli_args(&self) -> Vec<OsString> {
        vec![
            OsString::from("-s"),
            self.target.clone().into_os_string(),
            self.link.clone().into_os_string(),
        ]
    }
}
