use glam::{Mat4, Vec3};
use marchlight_camera::FlyCamera;
use marchlight_common::Resolution;
use serde::Serialize;

/// Everything a renderer reads for one frame, copied out of the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderView {
    /// Camera position in world space.
    pub position: Vec3,
    pub front: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub view: Mat4,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub resolution: Resolution,
    /// Seconds since the frame clock started.
    pub time: f32,
}

impl RenderView {
    pub fn capture(camera: &FlyCamera, resolution: Resolution, time: f32) -> Self {
        Self {
            position: camera.position(),
            front: camera.front(),
            right: camera.right(),
            up: camera.up(),
            view: camera.view_matrix(),
            fov_degrees: camera.fov(),
            resolution,
            time,
        }
    }
}

impl Default for RenderView {
    fn default() -> Self {
        Self::capture(&FlyCamera::default(), Resolution::default(), 0.0)
    }
}
