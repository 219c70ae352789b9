use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config_file::ConfigOverrides;

/// pkgstrap - install system packages, a compatibility symlink and Python requirements
#[derive(Parser)]
#[command(name = "pkgstrap")]
#[command(about = "Install OS packages, a compatibility symlink and Python requirements, in order")]
#[command(version)]
pub struct Cli {
    /// JSON configuration file overriding the built-in defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Run the system package and symlink steps through the elevation program (sudo)
    #[arg(short, long, global = true)]
    pub elevate: bool,

    /// Stop at the first failing step instead of continuing (like `set -e`)
    #[arg(long, global = true)]
    pub errexit: bool,

    /// Package list file (whitespace-separated package names)
    #[arg(long, global = true, value_name = "FILE")]
    pub packages: Option<PathBuf>,

    /// Python requirements file, passed to the Python package manager
    #[arg(long, global = true, value_name = "FILE")]
    pub requirements: Option<PathBuf>,

    /// Dry-run mode: log each command instead of running it
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Write a JSON report of the run to this file
    #[arg(long, global = true, value_name = "FILE")]
    pub report: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the install steps (default when no command is given)
    Install,
    /// Show the commands `install` would run, without running them
    Plan {
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Report on files, programs and privileges the steps need
    Check,
    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(value_name = "CONFIG")]
        file: PathBuf,
    },
    /// Print shell completions to stdout
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// The command-line values that override the configuration
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            package_list: self.packages.clone(),
            requirements: self.requirements.clone(),
            elevate: self.elevate,
            errexit: self.errexit,
        }
    }
}
