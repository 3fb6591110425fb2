//! Sprite extraction - cuts frames out of an atlas and restores their
//! untrimmed size and orientation
//!
//! Each frame is copied pixel-for-pixel onto a transparent canvas of its
//! original size, positioned by its trim offset, and rotated back if it was
//! packed rotated. Frames are independent and are rendered in parallel.

use crate::error::FrameError;
use crate::frame::SpriteFrame;
use crate::geometry::Rect;
use crate::manifest::Manifest;
use image::{imageops, RgbaImage};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

/// Largest RGBA buffer a single frame may allocate (1 GiB)
pub const MAX_CANVAS_BYTES: u64 = 1 << 30;

/// One rendered output image
#[derive(Debug, Clone)]
pub struct ExtractedSprite {
    pub name: String,
    pub image: RgbaImage,
}

/// A frame that could not be rendered
#[derive(Debug)]
pub struct FrameFailure {
    pub name: String,
    pub error: FrameError,
}

/// Result of extracting every frame of a manifest
#[derive(Debug, Default)]
pub struct Extraction {
    /// Rendered sprites, sorted by name
    pub sprites: Vec<ExtractedSprite>,
    /// Frames that failed, sorted by name
    pub failures: Vec<FrameFailure>,
    /// Set when a cancellation request stopped extraction early
    pub cancelled: bool,
}

/// Where the trimmed pixels land on the untrimmed canvas.
///
/// ```text
/// x = (original.width  - source.width)  / 2 + offset.x
/// y = (original.height - source.height) / 2 + (rotated ? offset.y : -offset.y)
/// ```
///
/// Division truncates toward zero.
pub fn placement(frame: &SpriteFrame) -> Rect {
    let source = frame.source_rect;
    let original = frame.original_size;
    let offset = frame.trim_offset;

    let y_offset = if frame.rotated { offset.y } else { offset.y.saturating_neg() };
    Rect::new(
        (original.width.saturating_sub(source.width) / 2).saturating_add(offset.x),
        (original.height.saturating_sub(source.height) / 2).saturating_add(y_offset),
        source.width,
        source.height,
    )
}

/// Render one frame from the atlas.
pub fn render_frame(frame: &SpriteFrame, atlas: &RgbaImage) -> Result<RgbaImage, FrameError> {
    let source = frame.source_rect;
    let original = frame.original_size;

    for (width, height) in [(source.width, source.height), (original.width, original.height)] {
        if width < 0 || height < 0 {
            return Err(FrameError::NegativeSize { width, height });
        }
        let bytes = (width as u64).checked_mul(height as u64).and_then(|pixels| pixels.checked_mul(4));
        if !matches!(bytes, Some(bytes) if bytes <= MAX_CANVAS_BYTES) {
            return Err(FrameError::CanvasTooLarge { width, height });
        }
    }

    let inside = source.x >= 0
        && source.y >= 0
        && i64::from(source.x) + i64::from(source.width) <= i64::from(atlas.width())
        && i64::from(source.y) + i64::from(source.height) <= i64::from(atlas.height());
    if !inside {
        return Err(FrameError::OutOfBounds {
            rect: source,
            atlas_width: atlas.width(),
            atlas_height: atlas.height(),
        });
    }

    let sprite = imageops::crop_imm(
        atlas,
        source.x as u32,
        source.y as u32,
        source.width as u32,
        source.height as u32,
    )
    .to_image();

    let mut canvas = RgbaImage::new(original.width as u32, original.height as u32);
    let dest = placement(frame);
    // plain copy, clipped to the canvas
    imageops::replace(&mut canvas, &sprite, i64::from(dest.x), i64::from(dest.y));

    if frame.rotated {
        canvas = imageops::rotate270(&canvas);
    }
    Ok(canvas)
}

/// Render every frame of a manifest.
pub fn extract(manifest: &Manifest, atlas: &RgbaImage) -> Extraction {
    extract_cancellable(manifest, atlas, &AtomicBool::new(false))
}

/// Render every frame of a manifest, skipping the remaining frames once
/// `cancel` is set. A frame that has started is always finished.
pub fn extract_cancellable(manifest: &Manifest, atlas: &RgbaImage, cancel: &AtomicBool) -> Extraction {
    let rendered: Vec<Option<(String, Result<RgbaImage, FrameError>)>> = manifest
        .frames
        .par_iter()
        .map(|(name, frame)| {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            Some((name.clone(), render_frame(frame, atlas)))
        })
        .collect();

    let mut extraction = Extraction::default();
    for entry in rendered {
        match entry {
            Some((name, Ok(image))) => extraction.sprites.push(ExtractedSprite { name, image }),
            Some((name, Err(error))) => extraction.failures.push(FrameFailure { name, error }),
            None => extraction.cancelled = true,
        }
    }

    extraction.sprites.sort_by(|a, b| a.name.cmp(&b.name));
    extraction.failures.sort_by(|a, b| a.name.cmp(&b.name));
    extraction
}
