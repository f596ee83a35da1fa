use glam::{DVec2, Mat4, Vec3};
use marchlight_common::CameraConfig;

/// Default yaw in degrees. With the basis convention below this faces -Z.
pub const DEFAULT_YAW: f32 = 90.0;
pub const DEFAULT_PITCH: f32 = 0.0;
pub const DEFAULT_SPEED: f32 = 50.0;
pub const DEFAULT_SENSITIVITY: f32 = 0.1;
/// Unzoomed field of view in degrees; also the upper zoom bound.
pub const DEFAULT_FOV: f32 = 45.0;
pub const MAX_FOV: f32 = 45.0;
/// Pitch bound used when pitch is constrained. Stops short of the poles
/// where `front` becomes parallel to world up.
pub const MAX_PITCH: f32 = 89.0;

/// Scroll results below this many degrees snap to a fully zoomed 0.
const MIN_FOV_STEP: f32 = 1.0;

/// Cursor position assumed before the first pointer sample: the centre of
/// an 800x600 window.
const DEFAULT_CURSOR: DVec2 = DVec2::new(400.0, 300.0);

/// Direction of a keyboard movement along the camera's own axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Free-flying camera driven by yaw and pitch Euler angles (degrees).
///
/// The basis vectors are private and derived: anything that changes yaw or
/// pitch goes through a method that recomputes them before returning.
#[derive(Debug, Clone, PartialEq)]
pub struct FlyCamera {
    position: Vec3,
    front: Vec3,
    right: Vec3,
    up: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    /// World units per second at a speed multiplier of 1.
    pub movement_speed: f32,
    /// Degrees of rotation per pixel of pointer travel.
    pub mouse_sensitivity: f32,
    fov: f32,
    last_cursor: DVec2,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Y, DEFAULT_YAW, DEFAULT_PITCH)
    }
}

impl FlyCamera {
    /// Create a camera at `position` looking along the direction given by
    /// `yaw` and `pitch`. The initial pitch is taken as-is; only mouse look
    /// applies the pitch constraint.
    pub fn new(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
            world_up,
            yaw: wrap_degrees(yaw as f64),
            pitch,
            movement_speed: DEFAULT_SPEED,
            mouse_sensitivity: DEFAULT_SENSITIVITY,
            fov: DEFAULT_FOV,
            last_cursor: DEFAULT_CURSOR,
        };
        camera.recompute_basis();
        camera
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self::new(config.position, config.world_up, config.yaw, config.pitch);
        camera.movement_speed = config.speed;
        camera.mouse_sensitivity = config.sensitivity;
        camera.set_fov(config.fov);
        if camera.fov != config.fov {
            tracing::warn!("fov {} out of range, clamped to {}", config.fov, camera.fov);
        }
        tracing::debug!(
            "fly camera at {:?}, yaw {:.1} pitch {:.1}",
            camera.position,
            camera.yaw,
            camera.pitch
        );
        camera
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn world_up(&self) -> Vec3 {
        self.world_up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees.
    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn last_cursor(&self) -> DVec2 {
        self.last_cursor
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.movement_speed = speed;
    }

    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.mouse_sensitivity = sensitivity;
    }

    /// Set the field of view directly, clamped to `[0, 45]`.
    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov.clamp(0.0, MAX_FOV);
    }

    /// Record a pointer position without turning the camera.
    pub fn set_last_cursor(&mut self, x: f64, y: f64) {
        self.last_cursor = DVec2::new(x, y);
    }

    /// Replace both angles and rebuild the basis. Yaw is wrapped into
    /// `[0, 360)`; pitch is not clamped.
    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = wrap_degrees(yaw as f64);
        self.pitch = pitch;
        self.recompute_basis();
    }

    /// Rebuild `front`, `right` and `up` from yaw, pitch and world up.
    ///
    /// Yaw is measured from +X towards -Z, so yaw 90 looks down -Z. The
    /// result is undefined when `front` ends up parallel to world up.
    pub fn recompute_basis(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            pitch.cos() * yaw.cos(),
            pitch.sin(),
            -pitch.cos() * yaw.sin(),
        );
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }

    fn velocity(&self, elapsed: f32, speed_multiplier: f32) -> f32 {
        self.movement_speed * elapsed * speed_multiplier
    }

    /// Move along the camera's own front/right axes.
    pub fn apply_keyboard_movement(
        &mut self,
        direction: Movement,
        elapsed: f32,
        speed_multiplier: f32,
    ) {
        let velocity = self.velocity(elapsed, speed_multiplier);
        match direction {
            Movement::Forward => self.position += self.front * velocity,
            Movement::Backward => self.position -= self.front * velocity,
            Movement::Left => self.position -= self.right * velocity,
            Movement::Right => self.position += self.right * velocity,
        }
    }

    /// Move along the fixed world Y axis, independent of where the camera
    /// looks. A positive `sign` moves up, a negative one down and zero
    /// (or NaN) not at all.
    pub fn apply_vertical_movement(&mut self, elapsed: f32, speed_multiplier: f32, sign: f32) {
        if sign == 0.0 || sign.is_nan() {
            return;
        }
        let velocity = self.velocity(elapsed, speed_multiplier);
        self.position += Vec3::Y * velocity * sign.signum();
    }

    pub fn move_up(&mut self, elapsed: f32, speed_multiplier: f32) {
        self.apply_vertical_movement(elapsed, speed_multiplier, 1.0);
    }

    pub fn move_down(&mut self, elapsed: f32, speed_multiplier: f32) {
        self.apply_vertical_movement(elapsed, speed_multiplier, -1.0);
    }

    /// Move along an arbitrary direction. The vector is not normalised, so
    /// its length scales the step.
    pub fn apply_free_movement(&mut self, direction: Vec3, elapsed: f32, speed_multiplier: f32) {
        let velocity = self.velocity(elapsed, speed_multiplier);
        self.position += direction * velocity;
    }

    /// Turn the camera from the pointer travel since the last sample.
    ///
    /// Screen Y grows downwards while pitch grows upwards, so the vertical
    /// delta is `last - current`. Moving the pointer right decreases yaw
    /// under this basis convention. The new position is always stored.
    pub fn apply_mouse_look(&mut self, x: f64, y: f64, constrain_pitch: bool) {
        let sensitivity = self.mouse_sensitivity as f64;
        let dx = (x - self.last_cursor.x) * sensitivity;
        let dy = (self.last_cursor.y - y) * sensitivity;
        self.last_cursor = DVec2::new(x, y);

        self.yaw = wrap_degrees(self.yaw as f64 - dx);
        self.pitch += dy as f32;
        if constrain_pitch {
            self.pitch = self.pitch.clamp(-MAX_PITCH, MAX_PITCH);
        }

        self.recompute_basis();
    }

    /// Zoom by a scroll delta: positive scroll narrows the view.
    pub fn apply_scroll_zoom(&mut self, delta: f32) {
        self.fov -= delta;
        if self.fov < MIN_FOV_STEP {
            self.fov = 0.0;
        }
        if self.fov > MAX_FOV {
            self.fov = MAX_FOV;
        }
    }

    /// Right-handed look-at from the camera position along `front`, using
    /// world up rather than the derived up as the reference.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.world_up)
    }

    /// Right-handed perspective projection from the current field of view.
    /// A fully zoomed camera (fov 0) yields a degenerate matrix.
    pub fn projection_matrix(&self, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), aspect, near, far)
    }
}

/// Wrap an angle in degrees into `[0, 360)`.
fn wrap_degrees(degrees: f64) -> f32 {
    let wrapped = degrees.rem_euclid(360.0) as f32;
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    fn assert_orthonormal(cam: &FlyCamera) {
        for v in [cam.front(), cam.right(), cam.up()] {
            assert!((v.length() - 1.0).abs() < 1e-4, "not unit: {v:?}");
        }
        assert!(cam.front().dot(cam.right()).abs() < 1e-4);
        assert!(cam.front().dot(cam.up()).abs() < 1e-4);
        assert!(cam.right().dot(cam.up()).abs() < 1e-4);
    }

    /// Small deterministic generator for pointer paths.
    struct Lcg(u64);

    impl Lcg {
        fn next_f64(&mut self, range: f64) -> f64 {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((self.0 >> 11) as f64 / (1u64 << 53) as f64 - 0.5) * 2.0 * range
        }
    }

    #[test]
    fn default_camera_faces_negative_z() {
        let cam = FlyCamera::default();
        assert_eq!(cam.yaw(), 90.0);
        assert_eq!(cam.pitch(), 0.0);
        assert!(approx(cam.front(), Vec3::NEG_Z));
        assert!(approx(cam.right(), Vec3::X));
        assert!(approx(cam.up(), Vec3::Y));
        assert_eq!(cam.fov(), 45.0);
        assert_eq!(cam.last_cursor(), DVec2::new(400.0, 300.0));
    }

    #[test]
    fn forward_for_one_second_moves_fifty_units() {
        let mut cam = FlyCamera::default();
        cam.apply_keyboard_movement(Movement::Forward, 1.0, 1.0);
        assert!(approx(cam.position(), Vec3::new(0.0, 0.0, -50.0)));
    }

    #[test]
    fn strafing_follows_right_axis() {
        let mut cam = FlyCamera::default();
        cam.apply_keyboard_movement(Movement::Left, 0.5, 2.0);
        assert!(approx(cam.position(), Vec3::new(-50.0, 0.0, 0.0)));
        cam.apply_keyboard_movement(Movement::Right, 0.5, 2.0);
        cam.apply_keyboard_movement(Movement::Backward, 0.1, 1.0);
        assert!(approx(cam.position(), Vec3::new(0.0, 0.0, 5.0)));
    }

    #[test]
    fn vertical_movement_ignores_pitch() {
        let mut cam = FlyCamera::default();
        cam.set_orientation(30.0, 60.0);
        cam.move_up(1.0, 1.0);
        assert!(approx(cam.position(), Vec3::new(0.0, 50.0, 0.0)));
        cam.move_down(0.5, 2.0);
        assert!(approx(cam.position(), Vec3::ZERO));
    }

    #[test]
    fn vertical_movement_uses_only_the_sign() {
        let mut cam = FlyCamera::default();
        cam.apply_vertical_movement(1.0, 1.0, 0.0);
        assert_eq!(cam.position(), Vec3::ZERO);
        cam.apply_vertical_movement(1.0, 1.0, -0.0);
        assert_eq!(cam.position(), Vec3::ZERO);
        cam.apply_vertical_movement(1.0, 1.0, -0.5);
        assert!(approx(cam.position(), Vec3::new(0.0, -50.0, 0.0)));
        cam.apply_vertical_movement(1.0, 1.0, 3.0);
        assert!(approx(cam.position(), Vec3::ZERO));
    }

    #[test]
    fn free_movement_scales_direction() {
        let mut cam = FlyCamera::default();
        cam.apply_free_movement(Vec3::new(1.0, 2.0, 0.0), 0.1, 1.0);
        assert!(approx(cam.position(), Vec3::new(5.0, 10.0, 0.0)));
    }

    #[test]
    fn pointer_right_decreases_yaw() {
        let mut cam = FlyCamera::default();
        cam.set_last_cursor(400.0, 300.0);
        cam.apply_mouse_look(410.0, 300.0, true);
        assert!((cam.yaw() - 89.0).abs() < EPS);
        assert_eq!(cam.pitch(), 0.0);
        assert_eq!(cam.last_cursor(), DVec2::new(410.0, 300.0));
    }

    #[test]
    fn pointer_up_increases_pitch() {
        let mut cam = FlyCamera::default();
        cam.apply_mouse_look(400.0, 250.0, true);
        assert!((cam.pitch() - 5.0).abs() < EPS);
        assert!(cam.front().y > 0.0);
    }

    #[test]
    fn yaw_wraps_into_range() {
        let mut cam = FlyCamera::new(Vec3::ZERO, Vec3::Y, 0.5, 0.0);
        cam.apply_mouse_look(410.0, 300.0, true);
        assert!((cam.yaw() - 359.5).abs() < 1e-3);

        cam.set_orientation(-90.0, 0.0);
        assert!((cam.yaw() - 270.0).abs() < EPS);
        cam.set_orientation(720.0, 0.0);
        assert!(cam.yaw().abs() < EPS);
    }

    #[test]
    fn yaw_is_invariant_under_zero_net_horizontal_delta() {
        let mut cam = FlyCamera::new(Vec3::ZERO, Vec3::Y, 123.0, 0.0);
        let start = cam.yaw();
        for dx in [35.0, -12.0, 100.0, -123.0] {
            let x = cam.last_cursor().x + dx;
            cam.apply_mouse_look(x, 300.0, true);
        }
        assert!((cam.yaw() - start).abs() < 1e-3);
    }

    #[test]
    fn constrained_pitch_never_leaves_bounds() {
        let mut cam = FlyCamera::default();
        for i in 1..=200 {
            cam.apply_mouse_look(400.0, 300.0 - 50.0 * i as f64, true);
            assert!(cam.pitch() <= MAX_PITCH);
        }
        assert_eq!(cam.pitch(), MAX_PITCH);
        for i in 1..=400 {
            cam.apply_mouse_look(400.0, -10_000.0 + 80.0 * i as f64, true);
            assert!(cam.pitch() >= -MAX_PITCH);
        }
        assert_eq!(cam.pitch(), -MAX_PITCH);
    }

    #[test]
    fn unconstrained_pitch_can_pass_the_bound() {
        let mut cam = FlyCamera::default();
        cam.apply_mouse_look(400.0, -700.0, false);
        assert!((cam.pitch() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn basis_stays_orthonormal_through_random_look() {
        let mut cam = FlyCamera::default();
        let mut rng = Lcg(7);
        for _ in 0..1_000 {
            let x = cam.last_cursor().x + rng.next_f64(300.0);
            let y = cam.last_cursor().y + rng.next_f64(300.0);
            cam.apply_mouse_look(x, y, true);
            assert_orthonormal(&cam);
            assert!((0.0..360.0).contains(&cam.yaw()));
        }
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut cam = FlyCamera::new(Vec3::ONE, Vec3::Y, 211.0, -33.0);
        let before = (cam.front(), cam.right(), cam.up());
        cam.recompute_basis();
        cam.recompute_basis();
        assert_eq!((cam.front(), cam.right(), cam.up()), before);
    }

    #[test]
    fn scroll_zoom_stays_in_range() {
        let mut cam = FlyCamera::default();
        let mut rng = Lcg(99);
        for _ in 0..500 {
            cam.apply_scroll_zoom(rng.next_f64(10.0) as f32);
            assert!((0.0..=MAX_FOV).contains(&cam.fov()));
        }
    }

    #[test]
    fn scroll_below_one_degree_snaps_to_zero() {
        let mut cam = FlyCamera::default();
        cam.apply_scroll_zoom(44.5);
        assert_eq!(cam.fov(), 0.0);
        cam.apply_scroll_zoom(-100.0);
        assert_eq!(cam.fov(), MAX_FOV);
        cam.apply_scroll_zoom(43.0);
        assert!((cam.fov() - 2.0).abs() < EPS);
    }

    #[test]
    fn view_matrix_maps_front_to_negative_z() {
        let mut cam = FlyCamera::new(Vec3::new(1.0, 2.0, 3.0), Vec3::Y, 0.0, 0.0);
        let ahead = cam.position() + cam.front() * 5.0;
        let in_view = cam.view_matrix().transform_point3(ahead);
        assert!(approx(in_view, Vec3::new(0.0, 0.0, -5.0)));

        cam.apply_mouse_look(300.0, 200.0, true);
        let ahead = cam.position() + cam.front() * 2.0;
        let in_view = cam.view_matrix().transform_point3(ahead);
        assert!(approx(in_view, Vec3::new(0.0, 0.0, -2.0)));
    }

    #[test]
    fn from_config_applies_tuning() {
        let config = CameraConfig {
            position: Vec3::new(0.0, 0.0, 4.0),
            speed: 10.0,
            sensitivity: 0.5,
            fov: 90.0,
            ..CameraConfig::default()
        };
        let cam = FlyCamera::from_config(&config);
        assert_eq!(cam.position(), Vec3::new(0.0, 0.0, 4.0));
        assert_eq!(cam.movement_speed, 10.0);
        assert_eq!(cam.mouse_sensitivity, 0.5);
        assert_eq!(cam.fov(), MAX_FOV);
    }

    #[test]
    fn projection_is_finite_when_unzoomed() {
        let cam = FlyCamera::default();
        let proj = cam.projection_matrix(4.0 / 3.0, 0.1, 100.0);
        assert!(proj.to_cols_array().iter().all(|v| v.is_finite()));
    }
}
