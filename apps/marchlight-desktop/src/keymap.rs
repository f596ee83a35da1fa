use marchlight_input::{Key, PointerButton};
use winit::event::{MouseButton, MouseScrollDelta};
use winit::keyboard::KeyCode;

/// Zoom degrees per pixel for touchpads that report pixel deltas.
const PIXEL_SCROLL_SCALE: f32 = 0.01;

pub fn key(code: KeyCode) -> Key {
    match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::Space => Key::Space,
        KeyCode::ShiftLeft => Key::LeftShift,
        KeyCode::ControlLeft => Key::LeftControl,
        KeyCode::Escape => Key::Escape,
        KeyCode::F1 => Key::F1,
        _ => Key::Other,
    }
}

pub fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Left,
        MouseButton::Right => PointerButton::Right,
        MouseButton::Middle => PointerButton::Middle,
        _ => PointerButton::Other,
    }
}

/// Vertical scroll amount in wheel lines.
pub fn scroll(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * PIXEL_SCROLL_SCALE,
    }
}
