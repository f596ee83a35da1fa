//! Shared types and configuration for the marchlight workspace.
//!
//! # Invariants
//! - Configuration is plain data: loading it never touches the GPU or window.
//! - Every configuration field has a default, so a partial file is valid.

pub mod config;
pub mod types;

pub use config::{
    CameraConfig, ConfigError, ControlsConfig, DemoConfig, SceneConfig, WindowConfig,
};
pub use types::{PointerButton, Resolution};
