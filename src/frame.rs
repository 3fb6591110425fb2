//! Sprite frame decoding
//!
//! A manifest frame entry is laid out differently in each of the four
//! manifest format versions. [`decode_frame`] reads an entry in any of them
//! and produces a [`SpriteFrame`] in sprite-local orientation.
//!
//! Decoding happens in two steps. The entry is first read into a
//! [`PackedFrame`], which describes the frame as it sits in the atlas. A
//! packed frame becomes a [`SpriteFrame`] only through
//! [`PackedFrame::normalize`], which consumes it, so the 90° un-rotation of a
//! rotated frame can happen exactly once.

use crate::geometry::{GeometryError, Point, Rect, Size};
use crate::plist::Value;
use thiserror::Error;

/// Manifest schema version, from `metadata.format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormatVersion {
    /// Plain numeric fields, never rotated
    V0,
    /// Brace-encoded `frame`/`offset`/`sourceSize`, never rotated
    V1,
    /// Format 1 plus a `rotated` flag
    V2,
    /// `textureRect`/`spriteSize`/... with `textureRotated` and `aliases`
    V3,
}

impl FormatVersion {
    pub fn as_i64(self) -> i64 {
        match self {
            FormatVersion::V0 => 0,
            FormatVersion::V1 => 1,
            FormatVersion::V2 => 2,
            FormatVersion::V3 => 3,
        }
    }
}

impl TryFrom<i64> for FormatVersion {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FormatVersion::V0),
            1 => Ok(FormatVersion::V1),
            2 => Ok(FormatVersion::V2),
            3 => Ok(FormatVersion::V3),
            other => Err(other),
        }
    }
}

/// A geometry field of a frame entry failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field '{field}': {source}")]
pub struct FrameDecodeError {
    pub field: &'static str,
    #[source]
    pub source: GeometryError,
}

/// One packed sprite, in sprite-local orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpriteFrame {
    /// Region to copy out of the atlas
    pub source_rect: Rect,
    /// Whether the sprite was packed rotated by 90°
    pub rotated: bool,
    /// Displacement of the trimmed region from the untrimmed centre
    pub trim_offset: Point,
    /// Size of the sprite before trimming
    pub original_size: Size,
}

/// A frame entry as laid out in the atlas, before rotation is undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedFrame {
    pub rect: Rect,
    pub rotated: bool,
    pub offset: Point,
    pub source_size: Size,
}

impl PackedFrame {
    /// Convert to sprite-local orientation.
    ///
    /// A rotated frame has the width and height of its rect, the axes of its
    /// offset and the width and height of its source size exchanged.
    pub fn normalize(self) -> SpriteFrame {
        if self.rotated {
            SpriteFrame {
                source_rect: self.rect.with_swapped_size(),
                rotated: true,
                trim_offset: self.offset.swapped(),
                original_size: self.source_size.swapped(),
            }
        } else {
            SpriteFrame {
                source_rect: self.rect,
                rotated: false,
                trim_offset: self.offset,
                original_size: self.source_size,
            }
        }
    }
}

/// Decode one entry of the `frames` dict.
pub fn decode_frame(node: &Value, format: FormatVersion) -> Result<SpriteFrame, FrameDecodeError> {
    let packed = match format {
        FormatVersion::V0 => decode_v0(node),
        FormatVersion::V1 => decode_v1(node, false)?,
        FormatVersion::V2 => decode_v1(node, node["rotated"].as_bool())?,
        FormatVersion::V3 => decode_v3(node)?,
    };
    Ok(packed.normalize())
}

/// Alternate names listed under `aliases`. Only format 3 has them.
pub fn frame_aliases(node: &Value, format: FormatVersion) -> Vec<&str> {
    if format != FormatVersion::V3 {
        return Vec::new();
    }
    node["aliases"].items().map(Value::as_str).collect()
}

/// Saturating truncation toward zero, as a plain cast does.
fn truncate(value: f64) -> i32 {
    value as i32
}

fn clamp_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

fn decode_v0(node: &Value) -> PackedFrame {
    // some exporters write negative original sizes
    let original_width = clamp_i32(node["originalWidth"].as_int().saturating_abs());
    let original_height = clamp_i32(node["originalHeight"].as_int().saturating_abs());

    PackedFrame {
        rect: Rect::new(
            truncate(node["x"].as_real()),
            truncate(node["y"].as_real()),
            truncate(node["width"].as_real()),
            truncate(node["height"].as_real()),
        ),
        rotated: false,
        offset: Point::new(truncate(node["offsetX"].as_real()), truncate(node["offsetY"].as_real())),
        source_size: Size::new(original_width, original_height),
    }
}

fn decode_v1(node: &Value, rotated: bool) -> Result<PackedFrame, FrameDecodeError> {
    Ok(PackedFrame {
        rect: field(node, "frame")?,
        rotated,
        offset: field(node, "offset")?,
        source_size: field(node, "sourceSize")?,
    })
}

fn decode_v3(node: &Value) -> Result<PackedFrame, FrameDecodeError> {
    let sprite_size: Size = field(node, "spriteSize")?;
    let texture_rect: Rect = field(node, "textureRect")?;

    Ok(PackedFrame {
        rect: Rect::from_parts(texture_rect.origin(), sprite_size),
        rotated: node["textureRotated"].as_bool(),
        offset: field(node, "spriteOffset")?,
        source_size: field(node, "spriteSourceSize")?,
    })
}

fn field<T>(node: &Value, name: &'static str) -> Result<T, FrameDecodeError>
where
    T: std::str::FromStr<Err = GeometryError>,
{
    node[name].as_str().parse().map_err(|source| FrameDecodeError { field: name, source })
}
