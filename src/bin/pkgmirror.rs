//! pkgmirror CLI binary
//!
//! Command-line entry point for incremental local-package mirroring.

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pkgmirror::config::SyncConfig;
use pkgmirror::logging::{init_logging, LoggingConfig};
use pkgmirror::sync::SyncRunner;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "pkgmirror",
    version,
    about = "Incrementally mirror local path-referenced packages"
)]
struct Cli {
    /// Manifest listing the dependencies to scan
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Mirror directory packages are synchronized into
    #[arg(long)]
    mirror: Option<PathBuf>,

    /// Configuration file (defaults to pkgmirror.toml in the working directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Recursion depth budget for the tree differ
    #[arg(long)]
    max_depth: Option<usize>,

    /// Suppress the spinner and summary output
    #[arg(short, long)]
    silent: bool,

    /// Enable logging (off by default)
    #[arg(short, long)]
    verbose: bool,

    /// Log level: trace, debug, info, warn, error
    #[arg(long)]
    log_level: Option<String>,

    /// Log format: text, json
    #[arg(long)]
    log_format: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let config = match build_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(&build_logging_config(&cli, &config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("pkgmirror starting");

    let spinner = if cli.silent {
        None
    } else {
        Some(create_spinner("Syncing local packages..."))
    };

    let result = SyncRunner::new(config).run();

    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }

    match result {
        Ok(report) => {
            if !cli.silent {
                println!("{} package(s) updated", report.changed_count());
                for (name, err) in report.failures() {
                    eprintln!("{}: {}", name, err);
                }
            }
            if report.is_clean() {
                info!("Sync completed successfully");
            } else {
                error!(failed = report.failures().len(), "Sync completed with failures");
                process::exit(1);
            }
        }
        Err(e) => {
            error!("Sync failed: {}", e);
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Merge the configuration file with CLI overrides.
fn build_config(cli: &Cli) -> Result<SyncConfig, pkgmirror::SyncError> {
    let mut config = if let Some(ref path) = cli.config {
        SyncConfig::load_from_file(path)?
    } else {
        SyncConfig::load(std::path::Path::new("."))?
    };

    if let Some(ref manifest) = cli.manifest {
        config.manifest = manifest.clone();
    }
    if let Some(ref mirror) = cli.mirror {
        config.mirror_root = mirror.clone();
    }
    if let Some(max_depth) = cli.max_depth {
        config.max_depth = max_depth;
    }

    Ok(config)
}

/// Build logging configuration from CLI args and the config file.
fn build_logging_config(cli: &Cli, config: &SyncConfig) -> LoggingConfig {
    // Without --verbose the CLI stays quiet apart from the summary
    if !cli.verbose {
        let mut logging = LoggingConfig::default();
        logging.level = "off".to_string();
        return logging;
    }

    let mut logging = config.logging.clone();
    if let Some(ref level) = cli.log_level {
        logging.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        logging.format = format.clone();
    }
    logging
}
