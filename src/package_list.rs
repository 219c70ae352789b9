//! Package list file handling.
//!
//! The list is plain text with package names separated by ASCII whitespace.
//! The file is read as bytes: tokens are passed on exactly as written, with
//! the same order and duplicates kept. Nothing is decoded or normalized.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use crate::error::{PkgstrapError, Result};

/// Ordered package names read from a package list file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageList {
    names: Vec<OsString>,
}

impl PackageList {
    /// Split `content` on ASCII whitespace into package names.
    ///
    /// Non-ASCII bytes, including Unicode spaces such as U+00A0, stay inside
    /// their token.
    pub fn parse(content: impl AsRef<[u8]>) -> Self {
        let names = content
            .as_ref()
            .split(u8::is_ascii_whitespace)
            .filter(|token| !token.is_empty())
            .map(|token| OsStr::from_bytes(token).to_os_string())
            .collect();
        Self { names }
    }

    /// Read and split the package list file at `path`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read(path).map_err(|source| PkgstrapError::PackageList {
            path: path.display().to_string(),
            source,
        })?;

        let list = Self::parse(&content);
        tracing::debug!("Read {} package name(s) from {}", list.len(), path.display());
        Ok(list)
    }

    pub fn names(&self) -> &[OsString] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn into_names(self) -> Vec<OsString> {
        self.names
    }
}
