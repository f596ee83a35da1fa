//! YAML configuration for the demo.
//!
//! Layout of a full config file:
//! ```yaml
//! window:
//!   title: marchlight
//!   width: 800
//!   height: 600
//!   vsync: true
//! camera:
//!   position: [0.0, 0.0, 4.0]
//!   world_up: [0.0, 1.0, 0.0]
//!   yaw: 90.0
//!   pitch: 0.0
//!   speed: 50.0
//!   sensitivity: 0.1
//!   fov: 45.0
//! controls:
//!   speed_up_multiplier: 2.0
//!   constrain_pitch: true
//!   look_button: right
//! scene:
//!   manifest: scenes/gallery.yaml
//! ```

use crate::types::{PointerButton, Resolution};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Window creation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "marchlight".into(),
            width: 800,
            height: 600,
            vsync: true,
        }
    }
}

impl WindowConfig {
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }
}

/// Initial camera pose and tuning. Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub world_up: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub speed: f32,
    pub sensitivity: f32,
    pub fov: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 4.0),
            world_up: Vec3::Y,
            yaw: 90.0,
            pitch: 0.0,
            speed: 50.0,
            sensitivity: 0.1,
            fov: 45.0,
        }
    }
}

/// Input tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Movement multiplier applied while the speed-up key is held.
    pub speed_up_multiplier: f32,
    pub constrain_pitch: bool,
    /// Button that must be held for pointer motion to turn the camera.
    pub look_button: PointerButton,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            speed_up_multiplier: 2.0,
            constrain_pitch: true,
            look_button: PointerButton::Right,
        }
    }
}

/// Which scene to draw. `None` selects the built-in scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub manifest: Option<PathBuf>,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub scene: SceneConfig,
}

impl DemoConfig {
    /// Parse and validate a config from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file. A relative scene manifest path is resolved
    /// against the directory containing the config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml(&text)?;
        if let (Some(manifest), Some(dir)) = (&config.scene.manifest, path.parent()) {
            if manifest.is_relative() {
                config.scene.manifest = Some(dir.join(manifest));
            }
        }
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` if given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => {
                tracing::debug!("no config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid {
                field: "window",
                reason: format!(
                    "size must be non-zero, got {}x{}",
                    self.window.width, self.window.height
                ),
            });
        }
        if self.camera.speed.is_nan() || self.camera.speed <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "camera.speed",
                reason: format!("must be positive, got {}", self.camera.speed),
            });
        }
        if self.controls.speed_up_multiplier.is_nan() || self.controls.speed_up_multiplier <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "controls.speed_up_multiplier",
                reason: format!(
                    "must be positive, got {}",
                    self.controls.speed_up_multiplier
                ),
            });
        }
        if self.camera.world_up.length_squared() == 0.0 {
            return Err(ConfigError::Invalid {
                field: "camera.world_up",
                reason: "must be a non-zero vector".into(),
            });
        }
        Ok(())
    }
}
