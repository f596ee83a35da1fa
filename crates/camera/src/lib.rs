//! Orientation model for the fly camera.
//!
//! # Invariants
//! - `front`, `right` and `up` are derived from yaw, pitch and world up and
//!   are recomputed by every operation that changes an angle.
//! - Yaw is kept in `[0, 360)`; field of view is kept in `[0, 45]`.
//! - Camera motion is driven by the frame loop, never by the renderer.

mod fly;

pub use fly::{
    DEFAULT_FOV, DEFAULT_PITCH, DEFAULT_SENSITIVITY, DEFAULT_SPEED, DEFAULT_YAW, FlyCamera,
    MAX_FOV, MAX_PITCH, Movement,
};
