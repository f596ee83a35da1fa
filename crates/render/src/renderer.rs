use crate::view::RenderView;
use std::fmt::Write;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads a captured view and produces output. It never
/// mutates the camera; camera state is owned by the frame loop.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given view.
    fn render(&self, view: &RenderView) -> Self::Output;
}

/// Produces a human-readable description of a frame.
///
/// Used by the CLI for headless runs and by tests of the render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, view: &RenderView) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame ({}x{}, t={:.3}s) ===",
            view.resolution.width, view.resolution.height, view.time
        );
        for (name, v) in [
            ("position", view.position),
            ("front", view.front),
            ("right", view.right),
            ("up", view.up),
        ] {
            let _ = writeln!(out, "{name:>8}: ({:.3}, {:.3}, {:.3})", v.x, v.y, v.z);
        }
        let _ = writeln!(out, "     fov: {:.1}", view.fov_degrees);
        out
    }
}
