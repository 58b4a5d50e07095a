//! Store configuration resource.
//!
//! Locates the preference file and document directory, names the scene to
//! start in, and tunes the camera rig. Defaults allow a safe startup without
//! any file; [`StoreConfig::load_from_file`] overrides whatever the file
//! provides.
//!
//! # Configuration File Format
//!
//! ```ini
//! [storage]
//! prefs_path = ./prefs.ini
//! documents_dir = ./documents
//!
//! [scene]
//! initial = boot
//!
//! [camera]
//! zoom_sensitivity = 0.1
//! min_size = 2.0
//! max_size = 10.0
//! viewport_height = 720
//! ```

use crate::error::ConfigError;
use crate::resources::camera::CameraRig;
use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

/// Default safe values for startup
const DEFAULT_PREFS_PATH: &str = "./prefs.ini";
const DEFAULT_DOCUMENTS_DIR: &str = "./documents";
const DEFAULT_INITIAL_SCENE: &str = "boot";
const DEFAULT_ZOOM_SENSITIVITY: f32 = 0.1;
const DEFAULT_MIN_SIZE: f32 = 2.0;
const DEFAULT_MAX_SIZE: f32 = 10.0;
const DEFAULT_VIEWPORT_HEIGHT: f32 = 720.0;
const DEFAULT_CONFIG_PATH: &str = "./smartvalues.ini";

/// Store configuration resource.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// INI file backing persisted values.
    pub prefs_path: PathBuf,
    /// Directory holding JSON documents.
    pub documents_dir: PathBuf,
    /// Scene active at startup.
    pub initial_scene: String,
    pub zoom_sensitivity: f32,
    pub min_size: f32,
    pub max_size: f32,
    pub viewport_height: f32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            prefs_path: PathBuf::from(DEFAULT_PREFS_PATH),
            documents_dir: PathBuf::from(DEFAULT_DOCUMENTS_DIR),
            initial_scene: DEFAULT_INITIAL_SCENE.to_string(),
            zoom_sensitivity: DEFAULT_ZOOM_SENSITIVITY,
            min_size: DEFAULT_MIN_SIZE,
            max_size: DEFAULT_MAX_SIZE,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
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
    pub fn load_from_file(&mut self) -> Result<(), ConfigError> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(ConfigError::Load)?;

        // [storage] section
        if let Some(path) = config.get("storage", "prefs_path") {
            self.prefs_path = PathBuf::from(path);
        }
        if let Some(dir) = config.get("storage", "documents_dir") {
            self.documents_dir = PathBuf::from(dir);
        }

        // [scene] section
        if let Some(scene) = config.get("scene", "initial") {
            self.initial_scene = scene;
        }

        // [camera] section
        if let Some(v) = read_float(&config, "camera", "zoom_sensitivity")? {
            self.zoom_sensitivity = v;
        }
        if let Some(v) = read_float(&config, "camera", "min_size")? {
            self.min_size = v;
        }
        if let Some(v) = read_float(&config, "camera", "max_size")? {
            self.max_size = v;
        }
        if let Some(v) = read_float(&config, "camera", "viewport_height")? {
            self.viewport_height = v;
        }

        info!(
            "Loaded config: prefs={:?}, documents={:?}, scene={}, camera size {}..{}",
            self.prefs_path, self.documents_dir, self.initial_scene, self.min_size, self.max_size
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), ConfigError> {
        let mut config = Ini::new();

        // [storage] section
        config.set(
            "storage",
            "prefs_path",
            Some(self.prefs_path.display().to_string()),
        );
        config.set(
            "storage",
            "documents_dir",
            Some(self.documents_dir.display().to_string()),
        );

        // [scene] section
        config.set("scene", "initial", Some(self.initial_scene.clone()));

        // [camera] section
        config.set(
            "camera",
            "zoom_sensitivity",
            Some(self.zoom_sensitivity.to_string()),
        );
        config.set("camera", "min_size", Some(self.min_size.to_string()));
        config.set("camera", "max_size", Some(self.max_size.to_string()));
        config.set(
            "camera",
            "viewport_height",
            Some(self.viewport_height.to_string()),
        );

        config.write(&self.config_path)?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Camera rig configured from the `[camera]` values.
    pub fn camera_rig(&self) -> CameraRig {
        CameraRig::new(
            self.min_size,
            self.max_size,
            self.zoom_sensitivity,
            self.viewport_height,
        )
    }
}

fn read_float(
    config: &Ini,
    section: &'static str,
    key: &'static str,
) -> Result<Option<f32>, ConfigError> {
    config
        .getfloat(section, key)
        .map(|v| v.map(|v| v as f32))
        .map_err(|reason| ConfigError::Invalid {
            section,
            key,
            reason,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "smartvalues-config-{}-{}",
            std::process::id(),
            name
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join("smartvalues.ini")
    }

    #[test]
    fn test_defaults() {
        let config = StoreConfig::new();
        assert_eq!(config.initial_scene, "boot");
        assert_eq!(config.prefs_path, PathBuf::from("./prefs.ini"));
        assert!(config.min_size < config.max_size);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let path = temp_config("partial");
        std::fs::write(&path, "[scene]\ninitial = menu\n\n[camera]\nmax_size = 20\n").unwrap();
        let mut config = StoreConfig::with_path(&path);
        config.load_from_file().unwrap();
        assert_eq!(config.initial_scene, "menu");
        assert_eq!(config.max_size, 20.0);
        assert_eq!(config.min_size, DEFAULT_MIN_SIZE);
        assert_eq!(config.documents_dir, PathBuf::from(DEFAULT_DOCUMENTS_DIR));
    }

    #[test]
    fn test_invalid_float_is_error() {
        let path = temp_config("invalid");
        std::fs::write(&path, "[camera]\nmin_size = tiny\n").unwrap();
        let mut config = StoreConfig::with_path(&path);
        assert!(matches!(
            config.load_from_file(),
            Err(ConfigError::Invalid { key: "min_size", .. })
        ));
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_config("save");
        let mut config = StoreConfig::with_path(&path);
        config.initial_scene = "harbor".to_string();
        config.zoom_sensitivity = 0.5;
        config.save_to_file().unwrap();

        let mut loaded = StoreConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        assert_eq!(loaded.initial_scene, "harbor");
        assert_eq!(loaded.zoom_sensitivity, 0.5);
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let mut config = StoreConfig::with_path("/nonexistent/smartvalues.ini");
        assert!(matches!(config.load_from_file(), Err(ConfigError::Load(_))));
    }
}
