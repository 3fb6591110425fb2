//! Error types for unpacking manifests

use crate::diagnostics::DiagnosticKind;
use crate::frame::FrameDecodeError;
use crate::geometry::Rect;
use crate::output::OutputError;
use crate::plist::ParseError;
use std::path::PathBuf;
use thiserror::Error;

/// A failure that abandons a whole manifest.
#[derive(Debug, Error)]
pub enum UnpackError {
    /// Markup could not be parsed
    #[error(transparent)]
    Structural(#[from] ParseError),
    /// Document has no `metadata` section
    #[error("not a recognized sprite-sheet manifest (no metadata)")]
    NotASpriteSheet,
    /// `metadata.format` outside the known versions
    #[error("format = {0} is not supported")]
    UnsupportedFormat(i64),
    /// Neither the declared nor the fallback atlas file exists
    #[error("texture file ({}) not found", .0.display())]
    MissingTexture(PathBuf),
    /// A geometry field of some frame is malformed
    #[error("frame '{frame}': {source}")]
    Geometry {
        frame: String,
        #[source]
        source: FrameDecodeError,
    },
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot decode atlas {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// Work was cancelled before this manifest started
    #[error("cancelled")]
    Cancelled,
}

impl UnpackError {
    /// Diagnostic category for this error.
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            UnpackError::Structural(_) => DiagnosticKind::Structural,
            UnpackError::NotASpriteSheet => DiagnosticKind::NotASpriteSheet,
            UnpackError::UnsupportedFormat(_) => DiagnosticKind::UnsupportedFormat,
            UnpackError::MissingTexture(_) => DiagnosticKind::MissingTexture,
            UnpackError::Geometry { .. } => DiagnosticKind::GeometryDecode,
            UnpackError::Io { .. } | UnpackError::Image { .. } => DiagnosticKind::Io,
            UnpackError::Cancelled => DiagnosticKind::Skipped,
        }
    }
}

/// A failure confined to a single output frame.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("source rect {rect} lies outside the {atlas_width}x{atlas_height} atlas")]
    OutOfBounds { rect: Rect, atlas_width: u32, atlas_height: u32 },
    #[error("negative size in frame geometry ({width}x{height})")]
    NegativeSize { width: i32, height: i32 },
    #[error("frame size {width}x{height} exceeds the canvas limit")]
    CanvasTooLarge { width: i32, height: i32 },
    #[error("output name '{0}' would escape the output directory")]
    UnsafeName(String),
    #[error("cannot save: {0}")]
    Save(#[from] OutputError),
}
