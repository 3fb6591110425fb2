//! Unpack command implementation

use std::path::Path;
use std::process::ExitCode;

use super::{Cli, EXIT_ERROR, EXIT_SUCCESS};
use crate::batch::{self, BatchReport, Options};
use crate::diagnostics::{CollectingSink, Tee, TracingSink};

/// Execute the unpack command
pub fn run_unpack(cli: &Cli) -> ExitCode {
    let mut options = Options::default();
    if let Some(output) = &cli.output {
        options = options.with_output_root(output);
    }
    if let Some(jobs) = cli.jobs {
        options = options.with_jobs(jobs);
    }

    let collected = CollectingSink::new();
    let sink = Tee::new(&TracingSink, &collected);

    let mut report = match batch::run(&cli.input, &options, &sink) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    // the report keeps every diagnostic, frame-level ones included
    report.diagnostics = collected.take();

    tracing::info!(
        "Done: {} manifest(s) unpacked, {} skipped, {} sprite(s) written, {} frame(s) failed",
        report.manifests.len(),
        report.skipped,
        report.sprites_written(),
        report.frames_failed()
    );

    if let Some(path) = &cli.report {
        if let Err(e) = write_report(&report, path) {
            tracing::error!("Cannot write report {}: {}", path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}

/// Write the batch report as pretty-printed JSON.
pub(crate) fn write_report(report: &BatchReport, path: &Path) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
}
