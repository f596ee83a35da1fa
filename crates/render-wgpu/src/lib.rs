//! wgpu render backend.
//!
//! Draws one screen-filling quad per frame. The scene's fragment shader
//! does all the work (typically ray marching), reading the camera basis,
//! resolution and time from a uniform block and sampling the scene
//! textures.
//!
//! # Invariants
//! - Renderer never mutates camera state; it only reads a `RenderView`.
//! - Shader validation failures are returned as errors, never only logged.

mod gpu;
mod shaders;
mod textures;

pub use gpu::{FrameUniforms, QuadRenderer, RenderError, check_scene_limits};
pub use shaders::{DEFAULT_SCENE, compose_shader, default_scene};
pub use textures::GpuTexture;
