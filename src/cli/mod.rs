//! Command-line interface implementation
//!
//! Parses arguments, installs the log subscriber and dispatches to the
//! unpack command.

mod unpack;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// plextract - Unpack sprite-sheet plist manifests into individual images
#[derive(Parser, Debug)]
#[command(name = "plextract")]
#[command(about = "Unpack sprite-sheet plist manifests (formats 0-3) into individual sprite images")]
#[command(version)]
pub struct Cli {
    /// A .plist manifest, or a directory whose .plist files are unpacked (not recursive)
    pub input: PathBuf,

    /// Write each manifest's sprites to OUTPUT/<manifest name>/ instead of beside the manifest
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of manifests/frames processed in parallel (default: available cores)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Write a JSON report of all results and diagnostics to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Install the global `tracing` subscriber.
fn init_logging(verbose: bool, no_color: bool) {
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_ansi(!no_color)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    // a subscriber may already be installed when embedded in another program
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Run the CLI and return the process exit code
pub fn run() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_INVALID_ARGS)
            } else {
                ExitCode::from(EXIT_SUCCESS)
            };
        }
    };

    init_logging(cli.verbose, cli.no_color);
    unpack::run_unpack(&cli)
}
