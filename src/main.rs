//! plextract - Command-line tool for unpacking sprite-sheet plist manifests

use std::process::ExitCode;

use plextract::cli;

fn main() -> ExitCode {
    cli::run()
}
