//! Tileset data model and tile animation resolution.
//!
//! A [`Tileset`] maps a sprite sheet into a grid of equally sized tiles,
//! addressed by a zero-based index in row-major order. Some tiles carry an
//! [`AnimationClip`]: an ordered cycle of alternate tile indices, each shown
//! for a fixed number of milliseconds.
//!
//! Values in this module are built once by the
//! [`tilesetloader`](crate::resources::tilesetloader) and never mutated
//! afterwards. Playback state lives with the caller, which passes the elapsed
//! time explicitly, so every lookup is a pure function of its inputs.
//!
//! # Resolution
//!
//! For a clip with frame durations `d[0..n]` the cycle length is `sum(d)`.
//! The elapsed time is reduced with a floored modulo (negative clocks wrap
//! backwards instead of going out of range) and the active frame is the first
//! one whose running duration total exceeds the remainder.
//!
//! ```
//! use tileanim::resources::tilesetloader::parse_tileset;
//! use tileanim::resources::tilesetloader::TilesetFormat;
//!
//! let json = r#"{
//!     "name": "water", "tilewidth": 16, "tileheight": 16,
//!     "tilecount": 4, "columns": 4,
//!     "image": "water.png", "imagewidth": 64, "imageheight": 16,
//!     "tiles": [{ "id": 0, "animation": [
//!         { "tileid": 0, "duration": 100 },
//!         { "tileid": 1, "duration": 100 }
//!     ]}]
//! }"#;
//! let tileset = parse_tileset(json, TilesetFormat::Json).unwrap();
//! assert_eq!(tileset.resolve(0, 150), 1);
//! assert_eq!(tileset.resolve(3, 150), 3);
//! ```

use rustc_hash::FxHashMap;

/// One step of an animation clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Tile shown during this step.
    pub tile: u32,
    /// How long the tile stays on screen, in milliseconds. Always > 0.
    pub duration_ms: u32,
}

/// Ordered, non-empty cycle of frames attached to one base tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationClip {
    frames: Vec<Frame>,
    cycle_length: u64,
}

impl AnimationClip {
    /// Build a clip from frames that already passed load-time validation.
    pub(crate) fn from_validated(frames: Vec<Frame>) -> Self {
        let cycle_length = frames.iter().map(|f| u64::from(f.duration_ms)).sum();
        Self {
            frames,
            cycle_length,
        }
    }

    /// Frames in playback order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Sum of all frame durations in milliseconds.
    pub fn cycle_length(&self) -> u64 {
        self.cycle_length
    }

    /// Tile indices in playback order.
    pub fn tile_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.frames.iter().map(|f| f.tile)
    }

    /// Tile to display `elapsed_ms` milliseconds after the animation epoch.
    pub fn tile_at(&self, elapsed_ms: i64) -> u32 {
        self.frame_at(elapsed_ms).tile
    }

    /// Active frame `elapsed_ms` milliseconds after the animation epoch.
    pub fn frame_at(&self, elapsed_ms: i64) -> &Frame {
        // cycle_length fits in i128 for any frame count; rem_euclid keeps the
        // remainder in [0, cycle_length) for negative clocks.
        let t = i128::from(elapsed_ms).rem_euclid(i128::from(self.cycle_length));
        let mut running = 0i128;
        for frame in &self.frames {
            running += i128::from(frame.duration_ms);
            if running > t {
                return frame;
            }
        }
        // t < cycle_length, so the loop always returns for validated clips.
        &self.frames[self.frames.len() - 1]
    }
}

/// Source image referenced by a tileset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilesetImage {
    /// Path of the sprite sheet, relative to the definition file.
    pub source: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Pixel rectangle of a tile inside the sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Validated, immutable tileset.
///
/// Invariants guaranteed by the loader:
/// - `tile_count == columns * rows`
/// - `image.width == columns * tile_width`
/// - `image.height == rows * tile_height`
/// - every clip is non-empty, has positive durations, and only references
///   indices in `[0, tile_count)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tileset {
    name: String,
    tile_width: u32,
    tile_height: u32,
    columns: u32,
    tile_count: u32,
    image: TilesetImage,
    clips: FxHashMap<u32, AnimationClip>,
}

impl Tileset {
    pub(crate) fn from_validated(
        name: String,
        tile_width: u32,
        tile_height: u32,
        columns: u32,
        tile_count: u32,
        image: TilesetImage,
        clips: FxHashMap<u32, AnimationClip>,
    ) -> Self {
        Self {
            name,
            tile_width,
            tile_height,
            columns,
            tile_count,
            image,
            clips,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.tile_count / self.columns
    }

    pub fn tile_count(&self) -> u32 {
        self.tile_count
    }

    pub fn image(&self) -> &TilesetImage {
        &self.image
    }

    /// Whether `index` addresses a tile of this tileset.
    pub fn contains(&self, index: u32) -> bool {
        index < self.tile_count
    }

    /// Animation clip attached to `base`, if any.
    pub fn clip(&self, base: u32) -> Option<&AnimationClip> {
        self.clips.get(&base)
    }

    /// Number of tiles that carry an animation clip.
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Base indices of animated tiles, ascending.
    pub fn animated_tiles(&self) -> Vec<u32> {
        let mut bases: Vec<u32> = self.clips.keys().copied().collect();
        bases.sort_unstable();
        bases
    }

    /// Tile index to render for `base` at `elapsed_ms` since the animation epoch.
    ///
    /// Tiles without a clip are static and resolve to themselves.
    pub fn resolve(&self, base: u32, elapsed_ms: i64) -> u32 {
        match self.clips.get(&base) {
            Some(clip) => clip.tile_at(elapsed_ms),
            None => base,
        }
    }

    /// Pixel position of the top-left corner of `index` in the sprite sheet.
    pub fn tile_origin(&self, index: u32) -> Option<(u32, u32)> {
        if !self.contains(index) {
            return None;
        }
        let col = index % self.columns;
        let row = index / self.columns;
        Some((col * self.tile_width, row * self.tile_height))
    }

    /// Sprite sheet rectangle of `index`.
    pub fn tile_rect(&self, index: u32) -> Option<TileRect> {
        self.tile_origin(index).map(|(x, y)| TileRect {
            x,
            y,
            w: self.tile_width,
            h: self.tile_height,
        })
    }

    /// Sprite sheet rectangle of the tile shown for `base` at `elapsed_ms`.
    pub fn resolve_rect(&self, base: u32, elapsed_ms: i64) -> Option<TileRect> {
        self.tile_rect(self.resolve(base, elapsed_ms))
    }
}

/// Free-function form of [`Tileset::resolve`].
pub fn resolve(tileset: &Tileset, base: u32, elapsed_ms: i64) -> u32 {
    tileset.resolve(base, elapsed_ms)
}
