//! Type-safe run types for pkgstrap
//!
//! Step identities and the error policy are proper Rust enums so the
//! installer can match on them exhaustively and config files reject typos.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// One of the three install steps, in execution order.
///
/// `EnumIter` yields the variants in declaration order, which is the order
/// the installer runs them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum StepKind {
    /// Install OS packages from the package list file
    SystemPackages,
    /// Create the compatibility symlink for the renamed binary
    CompatLink,
    /// Install Python dependencies from the requirements file
    PythonRequirements,
}

impl StepKind {
    /// Whether this step gets the elevation prefix when elevation is on.
    ///
    /// The Python step runs unprivileged in both modes.
    pub fn elevatable(&self) -> bool {
        matches!(self, Self::SystemPackages | Self::CompatLink)
    }

    /// Short human description used in log lines
    pub fn description(&self) -> &'static str {
        match self {
            Self::SystemPackages => "install system packages",
            Self::CompatLink => "create compatibility symlink",
            Self::PythonRequirements => "install Python requirements",
        }
    }
}

/// What happens after a step fails.
///
/// `Continue` is how a plain `sh` script behaves; `Abort` is `set -e`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ErrorPolicy {
    #[default]
    Continue,
    Abort,
}
