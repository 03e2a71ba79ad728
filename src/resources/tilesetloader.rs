//! Tileset definition loading and validation.
//!
//! Reads Tiled tileset documents into a format-neutral
//! [`TilesetDefinition`] and validates it into an immutable
//! [`Tileset`](crate::resources::tileset::Tileset). Two encodings are
//! understood:
//!
//! - Tiled XML (`.tsx`, `.xml`)
//! - Tiled JSON (`.tsj`, `.json`)
//!
//! # XML Format
//!
//! ```xml
//! <tileset name="Overworld" tilewidth="16" tileheight="16" tilecount="1440" columns="40">
//!  <image source="Overworld.png" width="640" height="576"/>
//!  <tile id="16">
//!   <animation>
//!    <frame tileid="16" duration="135"/>
//!    <frame tileid="18" duration="135"/>
//!   </animation>
//!  </tile>
//! </tileset>
//! ```
//!
//! Any violation of the tileset invariants is a [`LoadError`]. The resolver
//! never sees invalid data.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::resources::tileset::{AnimationClip, Frame, Tileset, TilesetImage};

/// Failure to produce a valid [`Tileset`] from a definition document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read tileset {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed tileset XML: {0}")]
    Xml(#[from] quick_xml::DeError),
    #[error("malformed tileset JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot tell the format of tileset {0:?}")]
    UnknownFormat(PathBuf),
    #[error("tileset {0} must be greater than zero")]
    ZeroDimension(&'static str),
    #[error("image width {image_width} != {columns} columns * {tile_width}px")]
    ImageWidthMismatch {
        image_width: u32,
        columns: u32,
        tile_width: u32,
    },
    #[error("image height {image_height} is not a multiple of tile height {tile_height}")]
    ImageHeightMismatch { image_height: u32, tile_height: u32 },
    #[error("tile count {tile_count} != {columns} columns * {rows} rows")]
    TileCountMismatch {
        tile_count: u32,
        columns: u32,
        rows: u32,
    },
    #[error("animation on tile {base} references tile {tile}, outside [0, {tile_count})")]
    TileOutOfRange {
        base: i64,
        tile: i64,
        tile_count: u32,
    },
    #[error("animation on tile {base} has no frames")]
    EmptyClip { base: u32 },
    #[error("frame {frame} of animation on tile {base} has invalid duration {duration}ms")]
    InvalidDuration { base: u32, frame: usize, duration: i64 },
    #[error("tile {base} has more than one animation")]
    DuplicateClip { base: u32 },
}

/// Encoding of a tileset definition document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TilesetFormat {
    Tsx,
    Json,
}

impl TilesetFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "tsx" | "xml" => Some(TilesetFormat::Tsx),
            "tsj" | "json" => Some(TilesetFormat::Json),
            _ => None,
        }
    }

    /// Guess the format from the first non-blank character of the document.
    pub fn sniff(text: &str) -> Option<Self> {
        match text.trim_start_matches('\u{feff}').trim_start().chars().next()? {
            '<' => Some(TilesetFormat::Tsx),
            '{' => Some(TilesetFormat::Json),
            _ => None,
        }
    }
}

/// Format-neutral, not yet validated tileset document.
///
/// Indices and durations are kept signed so that bad values surface as
/// validation errors with context instead of opaque parse failures.
#[derive(Debug, Clone, PartialEq)]
pub struct TilesetDefinition {
    pub name: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub tile_count: u32,
    pub columns: u32,
    pub image: TilesetImage,
    pub clips: Vec<ClipDefinition>,
}

/// Animation entry as written in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipDefinition {
    pub base: i64,
    pub frames: Vec<FrameDefinition>,
}

/// Frame entry as written in the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameDefinition {
    pub tile: i64,
    pub duration: i64,
}

impl TilesetDefinition {
    /// Check every tileset invariant and build the immutable [`Tileset`].
    pub fn validate(self) -> Result<Tileset, LoadError> {
        if self.tile_width == 0 {
            return Err(LoadError::ZeroDimension("tile width"));
        }
        if self.tile_height == 0 {
            return Err(LoadError::ZeroDimension("tile height"));
        }
        if self.columns == 0 {
            return Err(LoadError::ZeroDimension("column count"));
        }
        if u64::from(self.image.width) != u64::from(self.columns) * u64::from(self.tile_width) {
            return Err(LoadError::ImageWidthMismatch {
                image_width: self.image.width,
                columns: self.columns,
                tile_width: self.tile_width,
            });
        }
        if self.image.height % self.tile_height != 0 {
            return Err(LoadError::ImageHeightMismatch {
                image_height: self.image.height,
                tile_height: self.tile_height,
            });
        }
        let rows = self.image.height / self.tile_height;
        if u64::from(self.tile_count) != u64::from(self.columns) * u64::from(rows) {
            return Err(LoadError::TileCountMismatch {
                tile_count: self.tile_count,
                columns: self.columns,
                rows,
            });
        }

        let tile_count = self.tile_count;
        let check_index = |base: i64, tile: i64| -> Result<u32, LoadError> {
            u32::try_from(tile)
                .ok()
                .filter(|t| *t < tile_count)
                .ok_or(LoadError::TileOutOfRange {
                    base,
                    tile,
                    tile_count,
                })
        };

        let mut clips: FxHashMap<u32, AnimationClip> = FxHashMap::default();
        for clip in self.clips {
            let base = check_index(clip.base, clip.base)?;
            if clips.contains_key(&base) {
                return Err(LoadError::DuplicateClip { base });
            }
            if clip.frames.is_empty() {
                return Err(LoadError::EmptyClip { base });
            }
            let mut frames = Vec::with_capacity(clip.frames.len());
            for (i, frame) in clip.frames.iter().enumerate() {
                let tile = check_index(clip.base, frame.tile)?;
                let duration_ms = u32::try_from(frame.duration)
                    .ok()
                    .filter(|d| *d > 0)
                    .ok_or(LoadError::InvalidDuration {
                        base,
                        frame: i,
                        duration: frame.duration,
                    })?;
                frames.push(Frame { tile, duration_ms });
            }
            clips.insert(base, AnimationClip::from_validated(frames));
        }

        Ok(Tileset::from_validated(
            self.name,
            self.tile_width,
            self.tile_height,
            self.columns,
            self.tile_count,
            self.image,
            clips,
        ))
    }
}

// --- Tiled XML ---

#[derive(Debug, Deserialize)]
struct TsxTileset {
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(rename = "@tilewidth")]
    tile_width: u32,
    #[serde(rename = "@tileheight")]
    tile_height: u32,
    #[serde(rename = "@tilecount")]
    tile_count: u32,
    #[serde(rename = "@columns")]
    columns: u32,
    image: TsxImage,
    #[serde(rename = "tile", default)]
    tiles: Vec<TsxTile>,
}

#[derive(Debug, Deserialize)]
struct TsxImage {
    #[serde(rename = "@source")]
    source: String,
    #[serde(rename = "@width")]
    width: u32,
    #[serde(rename = "@height")]
    height: u32,
}

#[derive(Debug, Deserialize)]
struct TsxTile {
    #[serde(rename = "@id")]
    id: i64,
    animation: Option<TsxAnimation>,
}

#[derive(Debug, Deserialize)]
struct TsxAnimation {
    #[serde(rename = "frame", default)]
    frames: Vec<TsxFrame>,
}

#[derive(Debug, Deserialize)]
struct TsxFrame {
    #[serde(rename = "@tileid")]
    tile_id: i64,
    #[serde(rename = "@duration")]
    duration: i64,
}

impl From<TsxTileset> for TilesetDefinition {
    fn from(doc: TsxTileset) -> Self {
        let clips = doc
            .tiles
            .into_iter()
            .filter_map(|tile| {
                tile.animation.map(|anim| ClipDefinition {
                    base: tile.id,
                    frames: anim
                        .frames
                        .into_iter()
                        .map(|f| FrameDefinition {
                            tile: f.tile_id,
                            duration: f.duration,
                        })
                        .collect(),
                })
            })
            .collect();
        TilesetDefinition {
            name: doc.name,
            tile_width: doc.tile_width,
            tile_height: doc.tile_height,
            tile_count: doc.tile_count,
            columns: doc.columns,
            image: TilesetImage {
                source: doc.image.source,
                width: doc.image.width,
                height: doc.image.height,
            },
            clips,
        }
    }
}

// --- Tiled JSON ---

#[derive(Debug, Deserialize)]
struct JsonTileset {
    #[serde(default)]
    name: String,
    #[serde(rename = "tilewidth")]
    tile_width: u32,
    #[serde(rename = "tileheight")]
    tile_height: u32,
    #[serde(rename = "tilecount")]
    tile_count: u32,
    columns: u32,
    image: String,
    #[serde(rename = "imagewidth")]
    image_width: u32,
    #[serde(rename = "imageheight")]
    image_height: u32,
    #[serde(default)]
    tiles: Vec<JsonTile>,
}

#[derive(Debug, Deserialize)]
struct JsonTile {
    id: i64,
    #[serde(default)]
    animation: Option<Vec<JsonFrame>>,
}

#[derive(Debug, Deserialize)]
struct JsonFrame {
    #[serde(rename = "tileid")]
    tile_id: i64,
    duration: i64,
}

impl From<JsonTileset> for TilesetDefinition {
    fn from(doc: JsonTileset) -> Self {
        let clips = doc
            .tiles
            .into_iter()
            .filter_map(|tile| {
                tile.animation.map(|frames| ClipDefinition {
                    base: tile.id,
                    frames: frames
                        .into_iter()
                        .map(|f| FrameDefinition {
                            tile: f.tile_id,
                            duration: f.duration,
                        })
                        .collect(),
                })
            })
            .collect();
        TilesetDefinition {
            name: doc.name,
            tile_width: doc.tile_width,
            tile_height: doc.tile_height,
            tile_count: doc.tile_count,
            columns: doc.columns,
            image: TilesetImage {
                source: doc.image,
                width: doc.image_width,
                height: doc.image_height,
            },
            clips,
        }
    }
}

/// Parse a document into an unvalidated [`TilesetDefinition`].
pub fn parse_definition(text: &str, format: TilesetFormat) -> Result<TilesetDefinition, LoadError> {
    let definition: TilesetDefinition = match format {
        TilesetFormat::Tsx => quick_xml::de::from_str::<TsxTileset>(text)?.into(),
        TilesetFormat::Json => serde_json::from_str::<JsonTileset>(text)?.into(),
    };
    Ok(definition)
}

/// Parse and validate a document.
pub fn parse_tileset(text: &str, format: TilesetFormat) -> Result<Tileset, LoadError> {
    parse_definition(text, format)?.validate()
}

/// Read, parse, and validate a tileset file.
///
/// The format is taken from the extension, or sniffed from the content when
/// the extension is not recognised.
pub fn load_tileset(path: impl AsRef<Path>) -> Result<Tileset, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let format = TilesetFormat::from_path(path)
        .or_else(|| TilesetFormat::sniff(&text))
        .ok_or_else(|| LoadError::UnknownFormat(path.to_path_buf()))?;
    debug!("Parsing tileset {:?} as {:?}", path, format);

    let tileset = parse_tileset(&text, format)?;
    info!(
        "Loaded tileset '{}' from {:?}: {} tiles ({}x{}), {} animated",
        tileset.name(),
        path,
        tileset.tile_count(),
        tileset.columns(),
        tileset.rows(),
        tileset.clip_count()
    );
    Ok(tileset)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_TSX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tileset version="1.2" tiledversion="1.2.1" name="Small" tilewidth="8" tileheight="8" tilecount="8" columns="4">
 <image source="small.png" width="32" height="16"/>
 <tile id="0">
  <properties>
   <property name="solid" type="bool" value="true"/>
  </properties>
 </tile>
 <tile id="1">
  <animation>
   <frame tileid="1" duration="100"/>
   <frame tileid="5" duration="300"/>
  </animation>
 </tile>
</tileset>
"#;

    fn definition() -> TilesetDefinition {
        TilesetDefinition {
            name: "def".to_string(),
            tile_width: 8,
            tile_height: 8,
            tile_count: 8,
            columns: 4,
            image: TilesetImage {
                source: "def.png".to_string(),
                width: 32,
                height: 16,
            },
            clips: vec![ClipDefinition {
                base: 2,
                frames: vec![
                    FrameDefinition {
                        tile: 2,
                        duration: 50,
                    },
                    FrameDefinition {
                        tile: 3,
                        duration: 50,
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_parse_tsx() {
        let ts = parse_tileset(SMALL_TSX, TilesetFormat::Tsx).unwrap();
        assert_eq!(ts.name(), "Small");
        assert_eq!(ts.tile_count(), 8);
        assert_eq!(ts.rows(), 2);
        assert_eq!(ts.image().source, "small.png");
        assert_eq!(ts.clip_count(), 1);
        assert!(ts.clip(0).is_none());
        let clip = ts.clip(1).unwrap();
        assert_eq!(clip.tile_indices().collect::<Vec<_>>(), vec![1, 5]);
        assert_eq!(clip.cycle_length(), 400);
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "name": "Small", "tilewidth": 8, "tileheight": 8,
            "tilecount": 8, "columns": 4,
            "image": "small.png", "imagewidth": 32, "imageheight": 16,
            "type": "tileset", "version": "1.10",
            "tiles": [
                { "id": 0, "properties": [] },
                { "id": 1, "animation": [
                    { "tileid": 1, "duration": 100 },
                    { "tileid": 5, "duration": 300 }
                ]}
            ]
        }"#;
        let from_json = parse_tileset(json, TilesetFormat::Json).unwrap();
        let from_xml = parse_tileset(SMALL_TSX, TilesetFormat::Tsx).unwrap();
        assert_eq!(from_json, from_xml);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            TilesetFormat::from_path(Path::new("a/Overworld.tsx")),
            Some(TilesetFormat::Tsx)
        );
        assert_eq!(
            TilesetFormat::from_path(Path::new("a.TSJ")),
            Some(TilesetFormat::Json)
        );
        assert_eq!(TilesetFormat::from_path(Path::new("a.txt")), None);
        assert_eq!(TilesetFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_format_sniff() {
        assert_eq!(TilesetFormat::sniff("  \n<?xml"), Some(TilesetFormat::Tsx));
        assert_eq!(TilesetFormat::sniff("\u{feff}{}"), Some(TilesetFormat::Json));
        assert_eq!(TilesetFormat::sniff("name=x"), None);
        assert_eq!(TilesetFormat::sniff(""), None);
    }

    #[test]
    fn test_validate_ok() {
        let ts = definition().validate().unwrap();
        assert_eq!(ts.resolve(2, 50), 3);
    }

    #[test]
    fn test_zero_dimensions() {
        let mut d = definition();
        d.tile_width = 0;
        assert!(matches!(d.validate(), Err(LoadError::ZeroDimension(_))));
        let mut d = definition();
        d.columns = 0;
        assert!(matches!(d.validate(), Err(LoadError::ZeroDimension(_))));
    }

    #[test]
    fn test_geometry_mismatch() {
        let mut d = definition();
        d.image.width = 40;
        assert!(matches!(
            d.validate(),
            Err(LoadError::ImageWidthMismatch { .. })
        ));

        let mut d = definition();
        d.image.height = 20;
        assert!(matches!(
            d.validate(),
            Err(LoadError::ImageHeightMismatch { .. })
        ));

        let mut d = definition();
        d.tile_count = 7;
        assert!(matches!(
            d.validate(),
            Err(LoadError::TileCountMismatch { rows: 2, .. })
        ));
    }

    #[test]
    fn test_base_out_of_range() {
        let mut d = definition();
        d.clips[0].base = 8;
        assert!(matches!(
            d.validate(),
            Err(LoadError::TileOutOfRange { tile: 8, .. })
        ));
        let mut d = definition();
        d.clips[0].base = -1;
        assert!(matches!(
            d.validate(),
            Err(LoadError::TileOutOfRange { tile: -1, .. })
        ));
    }

    #[test]
    fn test_frame_out_of_range() {
        let mut d = definition();
        d.clips[0].frames[1].tile = 99;
        assert!(matches!(
            d.validate(),
            Err(LoadError::TileOutOfRange {
                base: 2,
                tile: 99,
                tile_count: 8
            })
        ));
    }

    #[test]
    fn test_empty_clip() {
        let mut d = definition();
        d.clips[0].frames.clear();
        assert!(matches!(d.validate(), Err(LoadError::EmptyClip { base: 2 })));
    }

    #[test]
    fn test_invalid_durations() {
        for bad in [0, -135, i64::from(u32::MAX) + 1] {
            let mut d = definition();
            d.clips[0].frames[1].duration = bad;
            match d.validate() {
                Err(LoadError::InvalidDuration {
                    base,
                    frame,
                    duration,
                }) => {
                    assert_eq!(base, 2);
                    assert_eq!(frame, 1);
                    assert_eq!(duration, bad);
                }
                other => panic!("expected InvalidDuration, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_duplicate_clip() {
        let mut d = definition();
        let again = d.clips[0].clone();
        d.clips.push(again);
        assert!(matches!(
            d.validate(),
            Err(LoadError::DuplicateClip { base: 2 })
        ));
    }

    #[test]
    fn test_empty_animation_element() {
        let xml = r#"<tileset name="e" tilewidth="8" tileheight="8" tilecount="4" columns="4">
 <image source="e.png" width="32" height="8"/>
 <tile id="1"><animation></animation></tile>
</tileset>"#;
        assert!(matches!(
            parse_tileset(xml, TilesetFormat::Tsx),
            Err(LoadError::EmptyClip { base: 1 })
        ));
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(
            parse_tileset("<tileset name=", TilesetFormat::Tsx),
            Err(LoadError::Xml(_))
        ));
        assert!(matches!(
            parse_tileset("{\"name\": 1", TilesetFormat::Json),
            Err(LoadError::Json(_))
        ));
        // missing required attribute
        let xml = r#"<tileset name="x" tilewidth="8" tilecount="4" columns="4">
 <image source="x.png" width="32" height="8"/>
</tileset>"#;
        assert!(matches!(
            parse_tileset(xml, TilesetFormat::Tsx),
            Err(LoadError::Xml(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_tileset("does/not/exist.tsx").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
