//! Sprite-sheet manifest model
//!
//! A manifest is a property list of the shape
//!
//! ```text
//! { metadata: { format: 0..=3, textureFileName?: string },
//!   frames:   { <name>: <frame entry>, ... } }
//! ```
//!
//! Format 3 entries may list `aliases`; each alias is registered under its own
//! name and shares the primary entry's [`SpriteFrame`].

use crate::diagnostics::Warning;
use crate::error::UnpackError;
use crate::frame::{decode_frame, frame_aliases, FormatVersion, SpriteFrame};
use crate::plist::{self, Value};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Decoded view of a manifest document.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    pub format: FormatVersion,
    pub texture_file_name: Option<String>,
    /// Output name to frame. Aliases point at the same allocation as their primary.
    pub frames: BTreeMap<String, Arc<SpriteFrame>>,
}

/// A manifest together with the problems skipped while reading it.
#[derive(Debug, Clone)]
pub struct ManifestLoad {
    pub manifest: Manifest,
    pub warnings: Vec<Warning>,
}

impl Manifest {
    /// Parse markup and decode the manifest it describes.
    pub fn parse(text: &str) -> Result<ManifestLoad, UnpackError> {
        let document = plist::parse(text)?;
        let mut load = Self::from_value(&document.root)?;
        let mut warnings = document.warnings;
        warnings.append(&mut load.warnings);
        load.warnings = warnings;
        Ok(load)
    }

    /// Decode a manifest from an already parsed property list.
    ///
    /// The document is rejected before any frame is decoded when it has no
    /// `metadata` or declares an unknown format. A malformed geometry field in
    /// any frame rejects the whole manifest.
    pub fn from_value(root: &Value) -> Result<ManifestLoad, UnpackError> {
        let metadata = &root["metadata"];
        if metadata.is_null() {
            return Err(UnpackError::NotASpriteSheet);
        }

        let format = FormatVersion::try_from(metadata["format"].as_int())
            .map_err(UnpackError::UnsupportedFormat)?;

        let texture_file_name =
            Some(metadata["textureFileName"].as_str()).filter(|s| !s.is_empty()).map(str::to_string);

        let mut frames = BTreeMap::new();
        let mut warnings = Vec::new();

        // explicit frame entries are registered before any alias
        let mut aliased = Vec::new();
        for (name, entry) in root["frames"].entries() {
            let frame = decode_frame(entry, format)
                .map_err(|source| UnpackError::Geometry { frame: name.to_string(), source })?;
            let frame = Arc::new(frame);

            register(&mut frames, &mut warnings, name, &frame);
            aliased.push((name, entry, frame));
        }

        for (name, entry, frame) in aliased {
            for alias in frame_aliases(entry, format) {
                if alias.is_empty() {
                    warnings.push(Warning::new(format!("frame '{}' has an empty or non-string alias", name)));
                    continue;
                }
                register(&mut frames, &mut warnings, alias, &frame);
            }
        }

        Ok(ManifestLoad { manifest: Manifest { format, texture_file_name, frames }, warnings })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Names that share `name`'s frame, `name` included.
    pub fn names_sharing(&self, name: &str) -> Vec<&str> {
        match self.frames.get(name) {
            Some(frame) => self
                .frames
                .iter()
                .filter(|(_, other)| Arc::ptr_eq(frame, other))
                .map(|(n, _)| n.as_str())
                .collect(),
            None => Vec::new(),
        }
    }
}

/// First registration of a name wins.
fn register(
    frames: &mut BTreeMap<String, Arc<SpriteFrame>>,
    warnings: &mut Vec<Warning>,
    name: &str,
    frame: &Arc<SpriteFrame>,
) {
    match frames.entry(name.to_string()) {
        Entry::Vacant(slot) => {
            slot.insert(Arc::clone(frame));
        }
        Entry::Occupied(_) => {
            warnings.push(Warning::new(format!("duplicate frame name '{}' ignored", name)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Rect, Size};

    fn plist(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple Computer//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">{}</plist>"#,
            body
        )
    }

    #[test]
    fn test_missing_metadata() {
        let text = plist("<dict><key>frames</key><dict/></dict>");
        assert!(matches!(Manifest::parse(&text), Err(UnpackError::NotASpriteSheet)));
    }

    #[test]
    fn test_unsupported_format() {
        let text = plist(
            "<dict><key>metadata</key><dict><key>format</key><integer>4</integer></dict></dict>",
        );
        assert!(matches!(Manifest::parse(&text), Err(UnpackError::UnsupportedFormat(4))));

        let text = plist(
            "<dict><key>metadata</key><dict><key>format</key><integer>-1</integer></dict></dict>",
        );
        assert!(matches!(Manifest::parse(&text), Err(UnpackError::UnsupportedFormat(-1))));
    }

    #[test]
    fn test_unsupported_format_checked_before_frames() {
        // the malformed frame is never looked at
        let text = plist(
            r#"<dict>
                <key>frames</key><dict><key>a.png</key><dict><key>frame</key><string>bad</string></dict></dict>
                <key>metadata</key><dict><key>format</key><integer>7</integer></dict>
            </dict>"#,
        );
        assert!(matches!(Manifest::parse(&text), Err(UnpackError::UnsupportedFormat(7))));
    }

    #[test]
    fn test_missing_format_defaults_to_zero() {
        let text = plist("<dict><key>metadata</key><dict/></dict>");
        let load = Manifest::parse(&text).unwrap();
        assert_eq!(load.manifest.format, FormatVersion::V0);
        assert!(load.manifest.is_empty());
        assert_eq!(load.manifest.texture_file_name, None);
    }

    #[test]
    fn test_format2_manifest() {
        let text = plist(
            r#"<dict>
                <key>frames</key>
                <dict>
                    <key>hero.png</key>
                    <dict>
                        <key>frame</key><string>{{0,0},{20,10}}</string>
                        <key>offset</key><string>{1,2}</string>
                        <key>rotated</key><true/>
                        <key>sourceSize</key><string>{30,40}</string>
                    </dict>
                </dict>
                <key>metadata</key>
                <dict>
                    <key>format</key><integer>2</integer>
                    <key>textureFileName</key><string>heroes.png</string>
                </dict>
            </dict>"#,
        );

        let load = Manifest::parse(&text).unwrap();
        let manifest = load.manifest;
        assert_eq!(manifest.format, FormatVersion::V2);
        assert_eq!(manifest.texture_file_name.as_deref(), Some("heroes.png"));
        assert_eq!(manifest.len(), 1);

        let frame = &manifest.frames["hero.png"];
        assert!(frame.rotated);
        assert_eq!(frame.source_rect, Rect::new(0, 0, 10, 20));
        assert_eq!(frame.trim_offset, Point::new(2, 1));
        assert_eq!(frame.original_size, Size::new(40, 30));
    }

    fn format3_with_aliases(aliases: &str) -> String {
        plist(&format!(
            r#"<dict>
                <key>frames</key>
                <dict>
                    <key>a.png</key>
                    <dict>
                        <key>aliases</key><array>{}</array>
                        <key>spriteOffset</key><string>{{0,0}}</string>
                        <key>spriteSize</key><string>{{4,4}}</string>
                        <key>spriteSourceSize</key><string>{{4,4}}</string>
                        <key>textureRect</key><string>{{{{0,0}},{{4,4}}}}</string>
                        <key>textureRotated</key><false/>
                    </dict>
                </dict>
                <key>metadata</key><dict><key>format</key><integer>3</integer></dict>
            </dict>"#,
            aliases
        ))
    }

    #[test]
    fn test_aliases_share_one_frame() {
        let text = format3_with_aliases("<string>b.png</string><string>c.png</string>");
        let load = Manifest::parse(&text).unwrap();
        let frames = &load.manifest.frames;

        assert_eq!(frames.len(), 3);
        assert!(Arc::ptr_eq(&frames["a.png"], &frames["b.png"]));
        assert!(Arc::ptr_eq(&frames["a.png"], &frames["c.png"]));
        assert_eq!(Arc::strong_count(&frames["a.png"]), 3);
        assert_eq!(load.manifest.names_sharing("b.png"), vec!["a.png", "b.png", "c.png"]);
        assert!(load.warnings.is_empty());
    }

    #[test]
    fn test_alias_colliding_with_primary_is_ignored() {
        let text = format3_with_aliases("<string>a.png</string><integer>3</integer>");
        let load = Manifest::parse(&text).unwrap();

        assert_eq!(load.manifest.len(), 1);
        assert_eq!(load.warnings.len(), 2);
    }

    #[test]
    fn test_alias_never_displaces_frame_entry() {
        // a.png sorts first, so its alias would claim z.png if aliases were
        // registered alongside their frames
        let text = plist(
            r#"<dict>
                <key>frames</key>
                <dict>
                    <key>a.png</key>
                    <dict>
                        <key>aliases</key><array><string>z.png</string></array>
                        <key>spriteOffset</key><string>{0,0}</string>
                        <key>spriteSize</key><string>{4,4}</string>
                        <key>spriteSourceSize</key><string>{4,4}</string>
                        <key>textureRect</key><string>{{0,0},{4,4}}</string>
                        <key>textureRotated</key><false/>
                    </dict>
                    <key>z.png</key>
                    <dict>
                        <key>aliases</key><array/>
                        <key>spriteOffset</key><string>{0,0}</string>
                        <key>spriteSize</key><string>{2,2}</string>
                        <key>spriteSourceSize</key><string>{2,2}</string>
                        <key>textureRect</key><string>{{4,0},{2,2}}</string>
                        <key>textureRotated</key><false/>
                    </dict>
                </dict>
                <key>metadata</key><dict><key>format</key><integer>3</integer></dict>
            </dict>"#,
        );
        let load = Manifest::parse(&text).unwrap();
        let frames = &load.manifest.frames;

        assert_eq!(frames.len(), 2);
        assert!(!Arc::ptr_eq(&frames["a.png"], &frames["z.png"]));
        assert_eq!(frames["z.png"].source_rect, Rect::new(4, 0, 2, 2));
        assert_eq!(load.warnings.len(), 1);
        assert!(load.warnings[0].message.contains("z.png"));
    }

    #[test]
    fn test_geometry_error_rejects_manifest() {
        let text = plist(
            r#"<dict>
                <key>frames</key>
                <dict>
                    <key>ok.png</key>
                    <dict>
                        <key>frame</key><string>{{0,0},{1,1}}</string>
                        <key>offset</key><string>{0,0}</string>
                        <key>sourceSize</key><string>{1,1}</string>
                    </dict>
                    <key>broken.png</key>
                    <dict>
                        <key>frame</key><string>{{0,0},{1,x}}</string>
                        <key>offset</key><string>{0,0}</string>
                        <key>sourceSize</key><string>{1,1}</string>
                    </dict>
                </dict>
                <key>metadata</key><dict><key>format</key><integer>1</integer></dict>
            </dict>"#,
        );

        match Manifest::parse(&text) {
            Err(UnpackError::Geometry { frame, source }) => {
                assert_eq!(frame, "broken.png");
                assert_eq!(source.field, "frame");
            }
            other => panic!("expected geometry error, got {:?}", other),
        }
    }

    #[test]
    fn test_markup_warnings_are_carried() {
        let text = plist(
            r#"<dict>
                <key>metadata</key><dict><key>format</key><integer>0</integer><key>when</key><date>x</date></dict>
            </dict>"#,
        );
        let load = Manifest::parse(&text).unwrap();
        assert_eq!(load.warnings.len(), 1);
    }

    #[test]
    fn test_structural_error() {
        assert!(matches!(Manifest::parse("<plist><dict>"), Err(UnpackError::Structural(_))));
    }
}
