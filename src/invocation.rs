//! A fully resolved command line: program plus argument vector.
//!
//! Invocations are built by the step argument types and handed to an
//! `Executor`. Arguments are kept as `OsString` so paths and package names
//! reach the tool byte for byte, and they are never joined into a shell
//! string for execution. `Display` quoting and the JSON form exist only for
//! logs, `pkgstrap plan` and run reports, and show non-UTF-8 bytes lossily.

use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub program: String,
    #[serde(with = "lossy_args")]
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, args: Vec<OsString>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Prefix this invocation with a privilege-elevation program.
    ///
    /// `apt-get -y install git` becomes `sudo apt-get -y install git`.
    pub fn elevated(self, elevation_program: &str) -> Self {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(OsString::from(self.program));
        args.extend(self.args);
        Self {
            program: elevation_program.to_string(),
            args,
        }
    }

    /// Program followed by its arguments
    pub fn argv(&self) -> Vec<&OsStr> {
        std::iter::once(OsStr::new(&self.program))
            .chain(self.args.iter().map(OsString::as_os_str))
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words: Vec<String> = self.argv().into_iter().map(quote).collect();
        write!(f, "{}", words.join(" "))
    }
}

/// Single-quote a word for display if a shell would split or expand it
fn quote(word: &OsStr) -> String {
    let word = word.to_string_lossy();
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:+,@%".contains(c));
    if plain {
        word.into_owned()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Arguments as JSON strings, for plans and reports
mod lossy_args {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::ffi::OsString;

    pub fn serialize<S: Serializer>(args: &[OsString], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(args.iter().map(|arg| arg.to_string_lossy()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<OsString>, D::Error> {
        let args = Vec::<String>::deserialize(deserializer)?;
        Ok(args.into_iter().map(OsString::from).collect())
    }
}
