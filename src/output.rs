//! Image output and file path generation

use crate::error::{FrameError, UnpackError};
use image::RgbaImage;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Failure writing one sprite to disk
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("cannot write file: {0}")]
    Io(#[from] io::Error),
    #[error("cannot encode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Save an RGBA image, choosing the encoding from the path's extension.
///
/// Missing parent directories are created. Creating a directory that already
/// exists is not an error, so several workers may share an output tree.
pub fn save_image(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    image.save(path)?;
    Ok(())
}

/// Directory that receives the sprites of a manifest.
///
/// | Manifest | Output root | Directory |
/// |----------|-------------|-----------|
/// | `art/ui.plist` | none | `art/ui` |
/// | `art/ui.plist` | `out` | `out/ui` |
pub fn output_dir_for(manifest: &Path, output_root: Option<&Path>) -> PathBuf {
    let stem = manifest.file_stem().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("output"));
    match output_root {
        Some(root) => root.join(stem),
        None => manifest.parent().unwrap_or(Path::new("")).join(stem),
    }
}

/// Path of one sprite inside `dir`.
///
/// Frame names may contain subdirectories (`buttons/ok.png`) but must stay
/// relative and must not climb out of `dir`.
pub fn sprite_output_path(dir: &Path, name: &str) -> Result<PathBuf, FrameError> {
    let relative = Path::new(name);
    let escapes = name.is_empty()
        || relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(FrameError::UnsafeName(name.to_string()));
    }
    Ok(dir.join(relative))
}

/// Locate the atlas image of a manifest.
///
/// Uses `metadata.textureFileName` relative to the manifest's directory when
/// it names an existing file, and `<manifest stem>.png` beside the manifest
/// otherwise.
pub fn resolve_texture(manifest: &Path, texture_file_name: Option<&str>) -> Result<PathBuf, UnpackError> {
    let dir = manifest.parent().unwrap_or(Path::new(""));

    if let Some(name) = texture_file_name.filter(|n| !n.is_empty()) {
        let declared = dir.join(name);
        if declared.is_file() {
            return Ok(declared);
        }
    }

    let stem = manifest.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let fallback = dir.join(format!("{}.png", stem));
    if fallback.is_file() {
        Ok(fallback)
    } else {
        Err(UnpackError::MissingTexture(fallback))
    }
}
