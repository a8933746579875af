//! Configuration file support for the polygon editor.
//!
//! Editor tuning (hit tolerances, zoom limits, density bounds, display
//! defaults, auto-save timing) is kept in a versioned JSON document so it can
//! be exported, imported, and loaded at startup.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_POINT_DENSITY, DEFAULT_VERTEX_RADIUS, ERASE_TOLERANCE_PX, MAX_POINT_DENSITY, MAX_ZOOM,
    MIN_POLYGON_VERTICES, MIN_ZOOM, SELECT_TOLERANCE, VERTEX_RADIUS_RANGE, ZOOM_STEP,
};
use crate::render::DisplayMode;
use crate::view::ZoomLimits;

/// Verbosity of the `log` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    /// File and persistence lifecycle
    #[default]
    Info,
    /// Every user action
    Debug,
    /// Auto-save scheduling as well
    Trace,
}

impl LogLevel {
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Filter to hand to the logger.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// When a polygon drag in the Move tool ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MoveRelease {
    /// Releasing the pointer drops the polygon
    #[default]
    PointerUp,
    /// The polygon follows the pointer until the next click
    SecondClick,
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Editor configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Vertex/edge hit distance for the select tool, in image pixels
    #[serde(default = "default_select_tolerance")]
    pub select_tolerance: f32,

    /// Vertex hit distance for the erase tool, in surface pixels
    #[serde(default = "default_erase_tolerance_px")]
    pub erase_tolerance_px: f32,

    /// Zoom factor per step
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f32,

    /// Smallest zoom factor
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f32,

    /// Largest zoom factor
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f32,

    /// Resampling density offered before a polygon is selected
    #[serde(default = "default_point_density")]
    pub default_point_density: usize,

    /// Upper bound for resampling targets
    #[serde(default = "default_max_point_density")]
    pub max_point_density: usize,

    /// Vertex marker radius in surface pixels
    #[serde(default = "default_vertex_radius")]
    pub vertex_radius: f32,

    /// Initial display mode
    #[serde(default)]
    pub display_mode: DisplayMode,

    /// How Move-tool drags end
    #[serde(default)]
    pub move_release: MoveRelease,

    /// Commit the draft when clicking this close (image pixels) to its
    /// first vertex. Disabled when absent.
    #[serde(default)]
    pub auto_close_threshold: Option<f32>,

    /// Whether edits are saved automatically
    #[serde(default = "default_auto_save")]
    pub auto_save: bool,

    /// Quiet period after the last edit before auto-saving, in milliseconds
    #[serde(default = "default_auto_save_debounce_ms")]
    pub auto_save_debounce_ms: u64,

    /// Minimum time between two auto-saves, in milliseconds
    #[serde(default = "default_auto_save_interval_ms")]
    pub auto_save_interval_ms: u64,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_select_tolerance() -> f32 {
    SELECT_TOLERANCE
}

fn default_erase_tolerance_px() -> f32 {
    ERASE_TOLERANCE_PX
}

fn default_zoom_step() -> f32 {
    ZOOM_STEP
}

fn default_min_zoom() -> f32 {
    MIN_ZOOM
}

fn default_max_zoom() -> f32 {
    MAX_ZOOM
}

fn default_point_density() -> usize {
    DEFAULT_POINT_DENSITY
}

fn default_max_point_density() -> usize {
    MAX_POINT_DENSITY
}

fn default_vertex_radius() -> f32 {
    DEFAULT_VERTEX_RADIUS
}

fn default_auto_save() -> bool {
    true
}

fn default_auto_save_debounce_ms() -> u64 {
    1_000
}

fn default_auto_save_interval_ms() -> u64 {
    5_000
}

impl EditorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            select_tolerance: default_select_tolerance(),
            erase_tolerance_px: default_erase_tolerance_px(),
            zoom_step: default_zoom_step(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            default_point_density: default_point_density(),
            max_point_density: default_max_point_density(),
            vertex_radius: default_vertex_radius(),
            display_mode: DisplayMode::default(),
            move_release: MoveRelease::default(),
            auto_close_threshold: None,
            auto_save: default_auto_save(),
            auto_save_debounce_ms: default_auto_save_debounce_ms(),
            auto_save_interval_ms: default_auto_save_interval_ms(),
            log_level: LogLevel::default(),
        }
    }

    /// Builder: set how Move-tool drags end.
    pub fn with_move_release(mut self, release: MoveRelease) -> Self {
        self.move_release = release;
        self
    }

    /// Builder: enable proximity auto-close.
    pub fn with_auto_close(mut self, threshold: f32) -> Self {
        self.auto_close_threshold = Some(threshold);
        self
    }

    /// Builder: enable or disable auto-save.
    pub fn with_auto_save(mut self, enabled: bool) -> Self {
        self.auto_save = enabled;
        self
    }

    /// Builder: set auto-save timing.
    pub fn with_auto_save_timing(mut self, debounce: Duration, interval: Duration) -> Self {
        self.auto_save_debounce_ms = u64::try_from(debounce.as_millis()).unwrap_or(u64::MAX);
        self.auto_save_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Zoom step and limits for the view transform.
    pub fn zoom_limits(&self) -> ZoomLimits {
        ZoomLimits {
            step: self.zoom_step,
            min: self.min_zoom,
            max: self.max_zoom,
        }
    }

    pub fn auto_save_debounce(&self) -> Duration {
        Duration::from_millis(self.auto_save_debounce_ms)
    }

    pub fn auto_save_interval(&self) -> Duration {
        Duration::from_millis(self.auto_save_interval_ms)
    }

    /// Pull out-of-range values back into their valid ranges.
    pub fn sanitized(mut self) -> Self {
        let (min_radius, max_radius) = VERTEX_RADIUS_RANGE;
        self.vertex_radius = self.vertex_radius.clamp(min_radius, max_radius);
        self.max_point_density = self.max_point_density.max(MIN_POLYGON_VERTICES);
        self.default_point_density = self
            .default_point_density
            .clamp(MIN_POLYGON_VERTICES, self.max_point_density);
        if self.zoom_step <= 1.0 {
            self.zoom_step = ZOOM_STEP;
        }
        if self.min_zoom <= 0.0 || self.min_zoom > self.max_zoom {
            self.min_zoom = MIN_ZOOM;
            self.max_zoom = MAX_ZOOM;
        }
        self.select_tolerance = self.select_tolerance.max(0.0);
        self.erase_tolerance_px = self.erase_tolerance_px.max(0.0);
        self
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config.sanitized())
    }

    /// File name used under the per-user config folder.
    pub fn default_filename() -> &'static str {
        "polyseg-config.json"
    }

    /// Read configuration from an explicit path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write configuration to an explicit path, creating parent folders.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("⚙️ Saved configuration to {:?}", path);
        Ok(())
    }

    /// `<config_dir>/polyseg/polyseg-config.json`, or `~/.config/polyseg/...`
    /// where the platform has no config folder.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .map(|dir| dir.join("polyseg").join(Self::default_filename()))
    }

    /// Startup configuration. `None` when there is no readable file, in
    /// which case the caller falls back to defaults.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("⚙️ No configuration at {:?}", path);
            return None;
        }

        match Self::load(&path) {
            Ok(config) => {
                log::info!("⚙️ Loaded configuration from {:?}", path);
                Some(config)
            }
            Err(e) => {
                log::warn!("⚠️ Ignoring configuration {:?}: {}", path, e);
                None
            }
        }
    }

    /// Write to [`EditorConfig::default_path`].
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no config or home directory on this platform",
            ))
        })?;
        self.save(&path)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a configuration could not be read or written.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Written by a newer polyseg
    #[error("Configuration version {file_version} is newer than {supported_version}")]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    #[error("Configuration file error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.select_tolerance, 10.0);
        assert_eq!(config.erase_tolerance_px, 15.0);
        assert_eq!(config.default_point_density, 50);
        assert_eq!(config.max_point_density, 100);
        assert_eq!(config.move_release, MoveRelease::PointerUp);
        assert!(config.auto_close_threshold.is_none());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = EditorConfig::new()
            .with_move_release(MoveRelease::SecondClick)
            .with_auto_close(12.0);
        let json = config.to_json().unwrap();
        assert!(json.contains("\"second_click\""));
        let back = EditorConfig::from_json(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = EditorConfig::from_json(r#"{ "version": 1, "log_level": "debug" }"#).unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.vertex_radius, DEFAULT_VERTEX_RADIUS);
        assert_eq!(config.display_mode, DisplayMode::Polygon);
    }

    #[test]
    fn test_version_too_new() {
        let err = EditorConfig::from_json(r#"{ "version": 99 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::VersionTooNew {
                file_version: 99,
                ..
            }
        ));
    }

    #[test]
    fn test_sanitize_clamps_ranges() {
        let config = EditorConfig::from_json(
            r#"{ "version": 1, "vertex_radius": 40.0, "default_point_density": 1, "min_zoom": 9.0 }"#,
        )
        .unwrap();
        assert_eq!(config.vertex_radius, 10.0);
        assert_eq!(config.default_point_density, 3);
        assert_eq!(config.min_zoom, MIN_ZOOM);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(EditorConfig::default_filename());
        let config = EditorConfig::new().with_auto_save(false);
        config.save(&path).unwrap();
        assert_eq!(EditorConfig::load(&path).unwrap(), config);
    }
}
