use crate::action::{Action, Key};
use marchlight_camera::{FlyCamera, Movement};
use marchlight_common::{ControlsConfig, PointerButton};
use std::collections::HashSet;

/// Which keys drive which camera operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    pub forward: Key,
    pub backward: Key,
    pub left: Key,
    pub right: Key,
    pub up: Key,
    pub down: Key,
    pub speed_up: Key,
    pub quit: Key,
    pub toggle_overlay: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: Key::W,
            backward: Key::S,
            left: Key::A,
            right: Key::D,
            up: Key::Space,
            down: Key::LeftControl,
            speed_up: Key::LeftShift,
            quit: Key::Escape,
            toggle_overlay: Key::F1,
        }
    }
}

/// Translates raw key, pointer and scroll events into camera operations.
///
/// Keys are polled once per frame through [`InputMapper::apply_movement`];
/// pointer and scroll events are applied as they arrive.
#[derive(Debug, Clone)]
pub struct InputMapper {
    pub bindings: KeyBindings,
    /// Button that must be held for pointer motion to turn the camera.
    pub look_button: PointerButton,
    pub speed_up_multiplier: f32,
    pub constrain_pitch: bool,
    keys_held: HashSet<Key>,
    buttons_held: HashSet<PointerButton>,
}

impl Default for InputMapper {
    fn default() -> Self {
        Self::from_config(&ControlsConfig::default())
    }
}

impl InputMapper {
    pub fn from_config(config: &ControlsConfig) -> Self {
        Self {
            bindings: KeyBindings::default(),
            look_button: config.look_button,
            speed_up_multiplier: config.speed_up_multiplier,
            constrain_pitch: config.constrain_pitch,
            keys_held: HashSet::new(),
            buttons_held: HashSet::new(),
        }
    }

    /// Record a key transition. Returns an action for presses of the quit
    /// or overlay keys.
    pub fn key_event(&mut self, key: Key, pressed: bool) -> Option<Action> {
        if !pressed {
            self.keys_held.remove(&key);
            return None;
        }
        // Repeats arrive as presses of an already-held key.
        let first_press = self.keys_held.insert(key);
        if key == self.bindings.quit {
            tracing::debug!("quit requested");
            return Some(Action::Quit);
        }
        if key == self.bindings.toggle_overlay && first_press {
            return Some(Action::ToggleOverlay);
        }
        None
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.keys_held.contains(&key)
    }

    /// Multiplier for this frame's movement: boosted while speed-up is held.
    pub fn speed_multiplier(&self) -> f32 {
        if self.is_held(self.bindings.speed_up) {
            self.speed_up_multiplier
        } else {
            1.0
        }
    }

    /// Poll held movement keys and move the camera for one frame.
    pub fn apply_movement(&self, camera: &mut FlyCamera, elapsed: f32) {
        let multiplier = self.speed_multiplier();
        let b = &self.bindings;

        for (key, movement) in [
            (b.forward, Movement::Forward),
            (b.backward, Movement::Backward),
            (b.left, Movement::Left),
            (b.right, Movement::Right),
        ] {
            if self.is_held(key) {
                camera.apply_keyboard_movement(movement, elapsed, multiplier);
            }
        }

        if self.is_held(b.up) {
            camera.move_up(elapsed, multiplier);
        }
        if self.is_held(b.down) {
            camera.move_down(elapsed, multiplier);
        }
    }

    pub fn pointer_button(&mut self, button: PointerButton, pressed: bool) {
        if pressed {
            self.buttons_held.insert(button);
        } else {
            self.buttons_held.remove(&button);
        }
        if button == self.look_button {
            tracing::debug!(active = pressed, "look gesture");
        }
    }

    /// Whether pointer motion currently turns the camera.
    pub fn look_active(&self) -> bool {
        self.buttons_held.contains(&self.look_button)
    }

    /// Handle an absolute pointer position in window pixels.
    ///
    /// The camera always records the position, so the first sample after
    /// the look button goes down measures from where the pointer actually
    /// was rather than from a stale point.
    pub fn pointer_moved(&self, camera: &mut FlyCamera, x: f64, y: f64) {
        if self.look_active() {
            camera.apply_mouse_look(x, y, self.constrain_pitch);
        } else {
            camera.set_last_cursor(x, y);
        }
    }

    pub fn scrolled(&self, camera: &mut FlyCamera, delta: f32) {
        camera.apply_scroll_zoom(delta);
    }

    /// Forget all held keys and buttons, e.g. when the window loses focus
    /// and release events will never arrive.
    pub fn release_all(&mut self) {
        self.keys_held.clear();
        self.buttons_held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn escape_requests_quit() {
        let mut mapper = InputMapper::default();
        assert_eq!(mapper.key_event(Key::Escape, true), Some(Action::Quit));
        assert_eq!(mapper.key_event(Key::Escape, false), None);
    }

    #[test]
    fn overlay_toggles_once_per_press() {
        let mut mapper = InputMapper::default();
        assert_eq!(mapper.key_event(Key::F1, true), Some(Action::ToggleOverlay));
        assert_eq!(mapper.key_event(Key::F1, true), None);
        mapper.key_event(Key::F1, false);
        assert_eq!(mapper.key_event(Key::F1, true), Some(Action::ToggleOverlay));
    }

    #[test]
    fn held_forward_moves_each_frame() {
        let mut mapper = InputMapper::default();
        let mut cam = FlyCamera::default();
        mapper.key_event(Key::W, true);
        mapper.apply_movement(&mut cam, 0.5);
        mapper.apply_movement(&mut cam, 0.5);
        assert!(approx(cam.position(), Vec3::new(0.0, 0.0, -50.0)));

        mapper.key_event(Key::W, false);
        mapper.apply_movement(&mut cam, 1.0);
        assert!(approx(cam.position(), Vec3::new(0.0, 0.0, -50.0)));
    }

    #[test]
    fn shift_doubles_speed() {
        let mut mapper = InputMapper::default();
        let mut cam = FlyCamera::default();
        mapper.key_event(Key::LeftShift, true);
        mapper.key_event(Key::D, true);
        mapper.apply_movement(&mut cam, 0.1);
        assert!(approx(cam.position(), Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut mapper = InputMapper::default();
        let mut cam = FlyCamera::default();
        for key in [Key::W, Key::S, Key::Space, Key::LeftControl] {
            mapper.key_event(key, true);
        }
        mapper.apply_movement(&mut cam, 1.0);
        assert!(approx(cam.position(), Vec3::ZERO));
    }

    #[test]
    fn space_rises_along_world_up() {
        let mut mapper = InputMapper::default();
        let mut cam = FlyCamera::default();
        cam.set_orientation(90.0, -45.0);
        mapper.key_event(Key::Space, true);
        mapper.apply_movement(&mut cam, 0.2);
        assert!(approx(cam.position(), Vec3::new(0.0, 10.0, 0.0)));
    }

    #[test]
    fn pointer_motion_without_look_button_only_tracks() {
        let mapper = InputMapper::default();
        let mut cam = FlyCamera::default();
        mapper.pointer_moved(&mut cam, 700.0, 20.0);
        assert_eq!(cam.yaw(), 90.0);
        assert_eq!(cam.pitch(), 0.0);
        assert_eq!(cam.last_cursor(), glam::DVec2::new(700.0, 20.0));
    }

    #[test]
    fn first_gated_sample_has_no_spurious_delta() {
        let mut mapper = InputMapper::default();
        let mut cam = FlyCamera::default();
        mapper.pointer_moved(&mut cam, 700.0, 20.0);
        mapper.pointer_button(PointerButton::Right, true);
        assert!(mapper.look_active());
        mapper.pointer_moved(&mut cam, 710.0, 20.0);
        assert!((cam.yaw() - 89.0).abs() < 1e-4);
        assert_eq!(cam.pitch(), 0.0);
    }

    #[test]
    fn releasing_look_button_stops_turning() {
        let mut mapper = InputMapper::default();
        let mut cam = FlyCamera::default();
        mapper.pointer_button(PointerButton::Right, true);
        mapper.pointer_moved(&mut cam, 400.0, 280.0);
        let pitch = cam.pitch();
        mapper.pointer_button(PointerButton::Right, false);
        mapper.pointer_moved(&mut cam, 400.0, 0.0);
        assert_eq!(cam.pitch(), pitch);
    }

    #[test]
    fn other_buttons_do_not_gate_look() {
        let mut mapper = InputMapper::default();
        let mut cam = FlyCamera::default();
        mapper.pointer_button(PointerButton::Left, true);
        mapper.pointer_moved(&mut cam, 500.0, 300.0);
        assert_eq!(cam.yaw(), 90.0);
    }

    #[test]
    fn configured_look_button_is_respected() {
        let config = ControlsConfig {
            look_button: PointerButton::Left,
            ..ControlsConfig::default()
        };
        let mut mapper = InputMapper::from_config(&config);
        mapper.pointer_button(PointerButton::Left, true);
        assert!(mapper.look_active());
    }

    #[test]
    fn scroll_routes_to_zoom() {
        let mapper = InputMapper::default();
        let mut cam = FlyCamera::default();
        mapper.scrolled(&mut cam, 5.0);
        assert_eq!(cam.fov(), 40.0);
    }

    #[test]
    fn release_all_clears_state() {
        let mut mapper = InputMapper::default();
        mapper.key_event(Key::W, true);
        mapper.pointer_button(PointerButton::Right, true);
        mapper.release_all();
        assert!(!mapper.is_held(Key::W));
        assert!(!mapper.look_active());
    }
}
