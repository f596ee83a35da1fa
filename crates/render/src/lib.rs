//! Rendering adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers never mutate the camera; they consume a [`RenderView`]
//!   captured after input has been applied for the frame.
//! - A view is only captured from a constructed camera, so its basis has
//!   been computed at least once.

mod renderer;
mod view;

pub use renderer::{DebugTextRenderer, Renderer};
pub use view::RenderView;
