//! Batch unpacking of manifest files
//!
//! Accepts a manifest file or a directory of manifests. Every manifest is
//! handled independently: a manifest that cannot be unpacked is reported to
//! the [`DiagnosticSink`] and the batch moves on to the next one.
//!
//! # Example
//!
//! ```ignore
//! use plextract::batch::{run, Options};
//! use plextract::diagnostics::TracingSink;
//!
//! let report = run(Path::new("assets/"), &Options::default().with_jobs(4), &TracingSink);
//! println!("{} sprites written", report.sprites_written());
//! ```

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::error::{FrameError, UnpackError};
use crate::extract::extract_cancellable;
use crate::manifest::Manifest;
use crate::output::{output_dir_for, resolve_texture, save_image, sprite_output_path};
use glob::glob;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Manifest file extension
pub const MANIFEST_EXTENSION: &str = "plist";

/// Default number of parallel jobs (uses available parallelism).
fn default_jobs() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Settings for a batch run.
#[derive(Debug, Clone)]
pub struct Options {
    /// Write `<stem>/` directories here instead of beside each manifest
    pub output_root: Option<PathBuf>,
    /// Number of worker threads
    pub jobs: usize,
    /// Checked between manifests and between frames
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for Options {
    fn default() -> Self {
        Self { output_root: None, jobs: default_jobs(), cancel: None }
    }
}

impl Options {
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = Some(root.into());
        self
    }

    /// Set the number of parallel jobs.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|c| c.load(Ordering::Relaxed))
    }
}

/// Outcome of one successfully unpacked manifest.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ManifestSummary {
    pub manifest: PathBuf,
    pub texture: PathBuf,
    pub output_dir: PathBuf,
    /// Sprites written to disk
    pub written: usize,
    /// Frames that failed to render or save
    pub failed: usize,
}

/// Outcome of a whole batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub manifests: Vec<ManifestSummary>,
    /// Manifests that were skipped entirely
    pub skipped: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl BatchReport {
    pub fn sprites_written(&self) -> usize {
        self.manifests.iter().map(|m| m.written).sum()
    }

    pub fn frames_failed(&self) -> usize {
        self.manifests.iter().map(|m| m.failed).sum()
    }
}

/// Check if a path has the manifest extension.
pub fn is_manifest_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(MANIFEST_EXTENSION)
}

/// Find manifests directly inside `dir` (not in subdirectories), sorted.
pub fn find_manifests(dir: &Path) -> Vec<PathBuf> {
    let pattern = format!(
        "{}/*.{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        MANIFEST_EXTENSION
    );

    let mut files: Vec<PathBuf> = match glob(&pattern) {
        Ok(paths) => paths.filter_map(Result::ok).filter(|p| p.is_file()).collect(),
        Err(_) => Vec::new(),
    };
    files.sort();
    files
}

/// Unpack one manifest file.
///
/// Manifest-level problems are returned. Markup warnings and frames that fail
/// to render or save are reported to `sink` and do not stop the other frames.
pub fn unpack_manifest(
    path: &Path,
    options: &Options,
    sink: &dyn DiagnosticSink,
) -> Result<ManifestSummary, UnpackError> {
    if options.is_cancelled() {
        return Err(UnpackError::Cancelled);
    }
    tracing::info!("Extracting plist file: {} ...", path.display());

    let text = std::fs::read_to_string(path)
        .map_err(|source| UnpackError::Io { path: path.to_path_buf(), source })?;
    let load = Manifest::parse(&text)?;
    for warning in &load.warnings {
        sink.report(Diagnostic::from_warning(path, warning));
    }
    let manifest = load.manifest;

    let texture = resolve_texture(path, manifest.texture_file_name.as_deref())?;
    let atlas = image::open(&texture)
        .map_err(|source| UnpackError::Image { path: texture.clone(), source })?
        .to_rgba8();
    tracing::debug!(
        texture = %texture.display(),
        frames = manifest.len(),
        format = manifest.format.as_i64(),
        "atlas loaded"
    );

    let output_dir = output_dir_for(path, options.output_root.as_deref());
    std::fs::create_dir_all(&output_dir)
        .map_err(|source| UnpackError::Io { path: output_dir.clone(), source })?;

    let never = AtomicBool::new(false);
    let cancel = options.cancel.as_deref().unwrap_or(&never);
    let extraction = extract_cancellable(&manifest, &atlas, cancel);

    let mut failed = extraction.failures.len();
    for failure in &extraction.failures {
        sink.report(
            Diagnostic::new(path, DiagnosticKind::FrameFailed, failure.error.to_string())
                .with_frame(&failure.name),
        );
    }

    let saves: Vec<(String, Result<PathBuf, FrameError>)> = extraction
        .sprites
        .par_iter()
        .map(|sprite| {
            let result = sprite_output_path(&output_dir, &sprite.name).and_then(|target| {
                save_image(&sprite.image, &target)?;
                Ok(target)
            });
            (sprite.name.clone(), result)
        })
        .collect();

    let mut written = 0;
    for (name, result) in saves {
        match result {
            Ok(target) => {
                written += 1;
                tracing::debug!("Save at {}", target.display());
            }
            Err(error) => {
                failed += 1;
                sink.report(
                    Diagnostic::new(path, DiagnosticKind::FrameFailed, error.to_string()).with_frame(name),
                );
            }
        }
    }

    if extraction.cancelled {
        sink.report(Diagnostic::new(path, DiagnosticKind::Skipped, "cancelled; remaining frames skipped"));
    }

    Ok(ManifestSummary { manifest: path.to_path_buf(), texture, output_dir, written, failed })
}

/// Unpack a manifest file or every manifest in a directory.
///
/// Returns `Err` only when `input` itself cannot be read. Everything else is
/// reported to `sink` and collected into the returned report.
pub fn run(input: &Path, options: &Options, sink: &dyn DiagnosticSink) -> Result<BatchReport, UnpackError> {
    let metadata = std::fs::metadata(input)
        .map_err(|source| UnpackError::Io { path: input.to_path_buf(), source })?;

    let manifests = if metadata.is_dir() {
        tracing::info!("Extract at {}", input.display());
        find_manifests(input)
    } else if is_manifest_file(input) {
        vec![input.to_path_buf()]
    } else {
        let diagnostic = Diagnostic::new(input, DiagnosticKind::Skipped, "not a .plist manifest");
        sink.report(diagnostic.clone());
        return Ok(BatchReport { manifests: Vec::new(), skipped: 1, diagnostics: vec![diagnostic] });
    };

    let pool = rayon::ThreadPoolBuilder::new().num_threads(options.jobs.max(1)).build();
    let unpack_all = || -> Vec<(PathBuf, Result<ManifestSummary, UnpackError>)> {
        manifests.par_iter().map(|path| (path.clone(), unpack_manifest(path, options, sink))).collect()
    };
    let results = match pool {
        Ok(pool) => pool.install(unpack_all),
        // fall back to the global pool
        Err(_) => unpack_all(),
    };

    let mut report = BatchReport::default();
    for (path, result) in results {
        match result {
            Ok(summary) => {
                tracing::info!(
                    "{}: {} sprites written to {}",
                    path.display(),
                    summary.written,
                    summary.output_dir.display()
                );
                report.manifests.push(summary);
            }
            Err(error) => {
                report.skipped += 1;
                let diagnostic = Diagnostic::new(&path, error.kind(), error.to_string());
                report.diagnostics.push(diagnostic.clone());
                sink.report(diagnostic);
            }
        }
    }

    Ok(report)
}
