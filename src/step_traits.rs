//! Type-safe step argument contracts.
//!
//! Each install step is a Rust struct that knows which program it runs and
//! the exact argument vector that program expects. The installer never
//! assembles argv by hand.
//!
//! # Invariants
//!
//! - `to_cli_args()` returns arguments exactly as the tool expects them; paths
//!   and data read from input files are appended verbatim, byte for byte.
//! - Elevation is applied here and only to steps where
//!   `StepKind::elevatable()` holds.

use std::ffi::OsString;

use crate::invocation::Invocation;
use crate::types::StepKind;

/// Trait for typed step arguments.
///
/// # Example
///
/// ```
/// use pkgstrap::step_traits::StepArgs;
/// use pkgstrap::steps::CompatLinkArgs;
///
/// let args = CompatLinkArgs {
///     target: "/usr/bin/fdfind".into(),
///     link: "/usr/local/bin/fd".into(),
/// };
///
/// let inv = args.to_invocation(Some("sudo"));
/// assert_eq!(inv.to_string(), "sudo ln -s /usr/bin/fdfind /usr/local/bin/fd");
/// ```
pub trait StepArgs {
    /// Which of the install steps this is
    fn step_kind(&self) -> StepKind;

    /// Program to execute, before any elevation prefix
    fn program(&self) -> &str;

    /// Arguments for `program()`, in order
    fn to_cli_args(&self) -> Vec<OsString>;

    /// Resolve to an invocation, prefixed with `elevation` when this step
    /// is one that runs elevated.
    fn to_invocation(&self, elevation: Option<&str>) -> Invocation {
        let invocation = Invocation::new(self.program(), self.to_cli_args());
        match elevation {
            Some(prefix) if self.step_kind().elevatable() => invocation.elevated(prefix),
            _ => invocation,
        }
    }
}
