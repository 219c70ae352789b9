//! Error handling module for pkgstrap
//!
//! Provides centralized error handling with proper error types using thiserror.
//! A failing install step is not an error here: it is an outcome recorded in the
//! run report. These types cover what goes wrong around the steps.

use thiserror::Error;

/// Main error type for pkgstrap
#[derive(Error, Debug)]
pub enum PkgstrapError {
    /// IO errors (file operations, report writing, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The package list file could not be read
    #[error("Cannot read package list {path}: {source}")]
    PackageList {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A step's program could not be started at all
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Validation errors (config values)
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for pkgstrap operations
pub type Result<T> = std::result::Result<T, PkgstrapError>;

impl PkgstrapError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Exit status a POSIX shell would report for the same failure.
    ///
    /// 127 for a program that is not on PATH, 126 for any other spawn
    /// failure, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound => 127,
            Self::Spawn { .. } => 126,
            _ => 1,
        }
    }
}
