use serde::{Deserialize, Serialize};

/// Framebuffer size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height. A zero height is treated as one pixel so a
    /// minimised window never produces an infinite aspect.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Same size with each axis raised to at least one pixel.
    pub fn non_zero(&self) -> Self {
        Self {
            width: self.width.max(1),
            height: self.height.max(1),
        }
    }

    pub fn as_vec2(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width as f32, self.height as f32)
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// A pointer (mouse) button, independent of the windowing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerButton {
    Left,
    Right,
    Middle,
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_800_by_600() {
        let r = Resolution::default();
        assert_eq!((r.width, r.height), (800, 600));
        assert!((r.aspect() - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn zero_height_does_not_divide_by_zero() {
        let r = Resolution::new(640, 0);
        assert_eq!(r.aspect(), 640.0);
        assert_eq!(r.non_zero(), Resolution::new(640, 1));
    }
}
