//! plextract - Library for unpacking sprite-sheet atlases
//!
//! This library provides functionality to:
//! - Read property-list (plist) sprite-sheet manifests in formats 0 to 3
//! - Decode each frame's packed geometry, undoing rotation and trimming
//! - Cut the frames out of the atlas image as standalone sprites
//!
//! # Example
//!
//! ```no_run
//! use plextract::extract::extract;
//! use plextract::manifest::Manifest;
//!
//! let text = std::fs::read_to_string("ui.plist").unwrap();
//! let load = Manifest::parse(&text).unwrap();
//! let atlas = image::open("ui.png").unwrap().to_rgba8();
//! for sprite in extract(&load.manifest, &atlas).sprites {
//!     sprite.image.save(format!("out/{}", sprite.name)).unwrap();
//! }
//! ```

pub mod batch;
pub mod cli;
pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod frame;
pub mod geometry;
pub mod manifest;
pub mod output;
pub mod plist;
