//! Animation configuration resource.
//!
//! Settings loaded from an INI configuration file. Provides defaults for a
//! safe startup and methods to load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [tileset]
//! path = assets/tilesets/Overworld.tsx
//! key = overworld
//!
//! [clock]
//! epoch_ms = 0
//! time_scale = 1.0
//!
//! [playback]
//! fps = 60
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

const DEFAULT_TILESET_PATH: &str = "assets/tilesets/Overworld.tsx";
const DEFAULT_TILESET_KEY: &str = "overworld";
const DEFAULT_EPOCH_MS: i64 = 0;
const DEFAULT_TIME_SCALE: f32 = 1.0;
const DEFAULT_FPS: u32 = 60;
const DEFAULT_CONFIG_PATH: &str = "./tileanim.ini";

/// Animation configuration resource.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct AnimConfig {
    /// Tileset definition file.
    pub tileset_path: PathBuf,
    /// Key the tileset is stored under in the
    /// [`TilesetStore`](crate::resources::tilesetstore::TilesetStore).
    pub tileset_key: String,
    /// Clock value treated as time zero for animations.
    pub epoch_ms: i64,
    /// Multiplier applied to frame deltas.
    pub time_scale: f32,
    /// Simulated frames per second.
    pub fps: u32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for AnimConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            tileset_path: PathBuf::from(DEFAULT_TILESET_PATH),
            tileset_key: DEFAULT_TILESET_KEY.to_string(),
            epoch_ms: DEFAULT_EPOCH_MS,
            time_scale: DEFAULT_TIME_SCALE,
            fps: DEFAULT_FPS,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [tileset] section
        if let Some(path) = config.get("tileset", "path") {
            self.tileset_path = PathBuf::from(path);
        }
        if let Some(key) = config.get("tileset", "key") {
            self.tileset_key = key;
        }

        // [clock] section
        if let Some(epoch) = config.getint("clock", "epoch_ms").ok().flatten() {
            self.epoch_ms = epoch;
        }
        if let Some(scale) = config.getfloat("clock", "time_scale").ok().flatten() {
            self.time_scale = scale as f32;
        }

        // [playback] section
        if let Some(fps) = config.getuint("playback", "fps").ok().flatten() {
            self.fps = (fps as u32).max(1);
        }

        info!(
            "Loaded config: tileset={:?} key={}, epoch={}ms, time_scale={}, fps={}",
            self.tileset_path, self.tileset_key, self.epoch_ms, self.time_scale, self.fps
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [tileset] section
        config.set(
            "tileset",
            "path",
            Some(self.tileset_path.display().to_string()),
        );
        config.set("tileset", "key", Some(self.tileset_key.clone()));

        // [clock] section
        config.set("clock", "epoch_ms", Some(self.epoch_ms.to_string()));
        config.set("clock", "time_scale", Some(self.time_scale.to_string()));

        // [playback] section
        config.set("playback", "fps", Some(self.fps.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Frame delta in seconds for the configured fps.
    pub fn frame_delta(&self) -> f32 {
        1.0 / self.fps.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = AnimConfig::new();
        assert_eq!(c.tileset_key, "overworld");
        assert_eq!(c.fps, 60);
        assert_eq!(c.epoch_ms, 0);
    }

    #[test]
    fn test_missing_file_is_error() {
        let mut c = AnimConfig::with_path("definitely/not/here.ini");
        assert!(c.load_from_file().is_err());
        assert_eq!(c.fps, 60);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.ini");
        std::fs::write(&path, "[clock]\nepoch_ms = -250\n").unwrap();
        let mut c = AnimConfig::with_path(&path);
        c.load_from_file().unwrap();
        assert_eq!(c.epoch_ms, -250);
        assert_eq!(c.tileset_key, "overworld");
        assert_eq!(c.fps, 60);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tileanim.ini");
        let mut saved = AnimConfig::with_path(&path);
        saved.tileset_path = PathBuf::from("some/where.tsj");
        saved.tileset_key = "water".to_string();
        saved.epoch_ms = 1234;
        saved.time_scale = 0.5;
        saved.fps = 30;
        saved.save_to_file().unwrap();

        let mut loaded = AnimConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        assert_eq!(loaded, saved);
    }
}
