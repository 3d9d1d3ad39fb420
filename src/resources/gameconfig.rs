//! INI-backed engine settings.
//!
//! [`GameConfig::new`] yields values that run the headless loop without any
//! file on disk. Keys present in the file override them; absent keys keep
//! whatever the struct already held.
//!
//! # Configuration File Format
//!
//! ```ini
//! [loop]
//! target_fps = 60
//! time_scale = 1.0
//! max_frames = 600
//!
//! [physics]
//! gravity_x = 0.0
//! gravity_y = 0.0
//!
//! [render]
//! width = 640
//! height = 360
//! ```

use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::error::{EngineError, EngineResult};
use crate::math::Vector2;

// Fallbacks used when no file is loaded.
const DEFAULT_RENDER_WIDTH: u32 = 640;
const DEFAULT_RENDER_HEIGHT: u32 = 360;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_TIME_SCALE: f64 = 1.0;
const DEFAULT_MAX_FRAMES: u64 = 600;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Logical canvas size in pixels.
    pub render_width: u32,
    pub render_height: u32,
    /// Frames per simulated second; the fixed frame delta is its inverse.
    pub target_fps: u32,
    pub time_scale: f64,
    /// Frames the headless loop runs before unloading.
    pub max_frames: u64,
    pub gravity: Vector2,
    /// Source for `load_from_file` and target for `save_to_file`.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Built-in fallbacks, pointing at `./config.ini`.
    pub fn new() -> Self {
        Self {
            render_width: DEFAULT_RENDER_WIDTH,
            render_height: DEFAULT_RENDER_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
            time_scale: DEFAULT_TIME_SCALE,
            max_frames: DEFAULT_MAX_FRAMES,
            gravity: Vector2::ZERO,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Fallback values, reading and writing `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Seconds per frame at the target rate.
    pub fn frame_delta(&self) -> f64 {
        1.0 / f64::from(self.target_fps.max(1))
    }

    /// Overlay the keys found in [`config_path`](Self::config_path).
    ///
    /// A missing or malformed file is an [`EngineError::Config`] and leaves
    /// `self` untouched.
    pub fn load_from_file(&mut self) -> EngineResult<()> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| EngineError::Config(format!("failed to load config file: {}", e)))?;

        // [loop]
        if let Some(fps) = config.getuint("loop", "target_fps").ok().flatten() {
            self.target_fps = fps as u32;
        }
        if let Some(scale) = config.getfloat("loop", "time_scale").ok().flatten() {
            self.time_scale = scale;
        }
        if let Some(frames) = config.getuint("loop", "max_frames").ok().flatten() {
            self.max_frames = frames;
        }

        // [physics]
        if let Some(x) = config.getfloat("physics", "gravity_x").ok().flatten() {
            self.gravity.x = x;
        }
        if let Some(y) = config.getfloat("physics", "gravity_y").ok().flatten() {
            self.gravity.y = y;
        }

        // [render]
        if let Some(width) = config.getuint("render", "width").ok().flatten() {
            self.render_width = width as u32;
        }
        if let Some(height) = config.getuint("render", "height").ok().flatten() {
            self.render_height = height as u32;
        }

        info!(
            "Loaded config: {}x{} render, fps={}, time_scale={}, max_frames={}, gravity={}",
            self.render_width,
            self.render_height,
            self.target_fps,
            self.time_scale,
            self.max_frames,
            self.gravity
        );

        Ok(())
    }

    /// Write every setting back to [`config_path`](Self::config_path),
    /// overwriting the file.
    pub fn save_to_file(&self) -> EngineResult<()> {
        let mut config = Ini::new();

        // [loop]
        config.set("loop", "target_fps", Some(self.target_fps.to_string()));
        config.set("loop", "time_scale", Some(self.time_scale.to_string()));
        config.set("loop", "max_frames", Some(self.max_frames.to_string()));

        // [physics]
        config.set("physics", "gravity_x", Some(self.gravity.x.to_string()));
        config.set("physics", "gravity_y", Some(self.gravity.y.to_string()));

        // [render]
        config.set("render", "width", Some(self.render_width.to_string()));
        config.set("render", "height", Some(self.render_height.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| EngineError::Config(format!("failed to save config file: {}", e)))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    pub fn set_render_size(&mut self, width: u32, height: u32) {
        self.render_width = width;
        self.render_height = height;
    }

    pub fn render_size(&self) -> Vector2 {
        Vector2::new(f64::from(self.render_width), f64::from(self.render_height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("rivet2d-{}-{}.ini", name, std::process::id()))
    }

    #[test]
    fn missing_file_is_an_error_and_keeps_defaults() {
        let mut config = GameConfig::with_path(temp_path("missing"));
        assert!(matches!(config.load_from_file(), Err(EngineError::Config(_))));
        assert_eq!(config.target_fps, DEFAULT_TARGET_FPS);
    }

    #[test]
    fn save_then_load_restores_values() {
        let path = temp_path("roundtrip");
        let mut saved = GameConfig::with_path(&path);
        saved.target_fps = 30;
        saved.time_scale = 0.5;
        saved.gravity = Vector2::new(0.0, 98.0);
        saved.set_render_size(320, 200);
        saved.save_to_file().unwrap();

        let mut loaded = GameConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, saved);
        assert!((loaded.frame_delta() - 1.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let path = temp_path("partial");
        std::fs::write(&path, "[physics]\ngravity_y = 9.5\n").unwrap();
        let mut config = GameConfig::with_path(&path);
        config.load_from_file().unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(config.gravity, Vector2::new(0.0, 9.5));
        assert_eq!(config.render_width, DEFAULT_RENDER_WIDTH);
        assert_eq!(config.max_frames, DEFAULT_MAX_FRAMES);
    }
}
