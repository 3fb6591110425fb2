//! Diagnostics reporting
//!
//! The decoding and extraction code never prints. Recoverable problems are
//! returned as [`Warning`]s, and the batch driver turns warnings and skipped
//! files into [`Diagnostic`] records delivered to a [`DiagnosticSink`].

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A recoverable problem found while reading a manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub message: String,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Category of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Markup is not well-formed
    Structural,
    /// Document has no `metadata` section
    NotASpriteSheet,
    /// `metadata.format` outside 0..=3
    UnsupportedFormat,
    /// Neither the declared nor the fallback atlas exists
    MissingTexture,
    /// A geometry string could not be decoded
    GeometryDecode,
    /// A lenient read substituted a default
    Warning,
    /// A single frame could not be rendered or saved
    FrameFailed,
    /// Filesystem or image decoding failure
    Io,
    /// Input is not a manifest file
    Skipped,
}

impl DiagnosticKind {
    pub fn is_error(self) -> bool {
        !matches!(self, DiagnosticKind::Warning | DiagnosticKind::Skipped)
    }
}

/// One reported problem, tied to a file and optionally a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<String>,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(file: impl Into<PathBuf>, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self { file: file.into(), frame: None, kind, message: message.into() }
    }

    /// Attach the frame name the diagnostic refers to
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.frame = Some(frame.into());
        self
    }

    pub fn from_warning(file: &Path, warning: &Warning) -> Self {
        Self::new(file, DiagnosticKind::Warning, warning.message.clone())
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.frame {
            Some(frame) => write!(f, "{} [{}]: {}", self.file.display(), frame, self.message),
            None => write!(f, "{}: {}", self.file.display(), self.message),
        }
    }
}

/// Receiver for diagnostics. Shared across worker threads.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Stores every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all diagnostics reported so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        match self.diagnostics.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        match self.diagnostics.lock() {
            Ok(guard) => guard.iter().filter(|d| d.kind == kind).count(),
            Err(poisoned) => poisoned.into_inner().iter().filter(|d| d.kind == kind).count(),
        }
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match self.diagnostics.lock() {
            Ok(mut guard) => guard.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }
}

/// Emits diagnostics as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, d: Diagnostic) {
        let file = d.file.display().to_string();
        let frame = d.frame.as_deref().unwrap_or("");
        if d.kind.is_error() {
            tracing::error!(file = %file, frame, kind = ?d.kind, "{}", d.message);
        } else {
            tracing::warn!(file = %file, frame, kind = ?d.kind, "{}", d.message);
        }
    }
}

/// Forwards to two sinks.
pub struct Tee<'a> {
    first: &'a dyn DiagnosticSink,
    second: &'a dyn DiagnosticSink,
}

impl<'a> Tee<'a> {
    pub fn new(first: &'a dyn DiagnosticSink, second: &'a dyn DiagnosticSink) -> Self {
        Self { first, second }
    }
}

impl DiagnosticSink for Tee<'_> {
    fn report(&self, diagnostic: Diagnostic) {
        self.first.report(diagnostic.clone());
        self.second.report(diagnostic);
    }
}
