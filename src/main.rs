//! pkgstrap - main entry point

use clap::CommandFactory;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use pkgstrap::cli::{Cli, Commands};
use pkgstrap::config_file::InstallerConfig;
use pkgstrap::installer::{self, Installer};
use pkgstrap::process_guard::{self, ProcessGuard};
use pkgstrap::runner::{DryRunExecutor, ProcessExecutor};
use pkgstrap::sanity;

/// Initialize logging on stderr; RUST_LOG overrides the default `info` level
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();

    // Children must not outlive us on Ctrl-C or SIGTERM
    if let Err(e) = process_guard::init_signal_handlers() {
        warn!("Failed to initialize signal handlers: {}", e);
    }

    let cli = Cli::parse_args();
    debug!("CLI arguments parsed");

    let code = run(cli)?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Dispatch a command and return the process exit code
fn run(cli: Cli) -> anyhow::Result<i32> {
    if let Some(Commands::Completions { shell }) = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "pkgstrap", &mut std::io::stdout());
        return Ok(0);
    }

    if let Some(Commands::Validate { file }) = &cli.command {
        info!("Validating configuration file: {:?}", file);
        let loaded = InstallerConfig::load_from_file(file)?;
        return match loaded.validate() {
            Ok(()) => {
                println!("✓ Configuration file is valid: {}", file.display());
                Ok(0)
            }
            Err(e) => {
                error!("Configuration validation failed: {}", e);
                eprintln!("✗ Configuration validation failed: {}", e);
                Ok(1)
            }
        };
    }

    let mut config = InstallerConfig::load_or_default(cli.config.as_deref())?;
    config.apply_overrides(&cli.overrides());
    config.validate()?;

    match &cli.command {
        None | Some(Commands::Install) => run_install(config, &cli),
        Some(Commands::Plan { json }) => print_plan(&config, *json),
        Some(Commands::Check) => {
            let result = sanity::run_preflight_checks(&config);
            Ok(if result.is_ok() { 0 } else { 1 })
        }
        Some(Commands::Validate { .. }) | Some(Commands::Completions { .. }) => Ok(0),
    }
}

fn run_install(config: InstallerConfig, cli: &Cli) -> anyhow::Result<i32> {
    let report = if cli.dry_run {
        Installer::new(config, DryRunExecutor::new()).run()
    } else {
        let _guard = ProcessGuard::new();
        Installer::new(config, ProcessExecutor::new()).run()
    };

    if let Some(path) = &cli.report {
        report.write_to_file(path)?;
        info!("Run report written to {}", path.display());
    }

    Ok(report.exit_code())
}

fn print_plan(config: &InstallerConfig, json: bool) -> anyhow::Result<i32> {
    let planned = installer::plan(config);
    if json {
        println!("{}", installer::plan_json(&planned)?);
    } else {
        print!("{}", installer::plan_text(&planned));
    }
    Ok(0)
}
