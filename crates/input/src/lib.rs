//! Input mapping and frame timing.
//!
//! # Invariants
//! - Raw device events are translated into camera operations here; the
//!   camera never sees backend key codes.
//! - The latest pointer position is recorded on every motion event, even
//!   when look is inactive.
//! - Frame time is a pure variable step: no smoothing, no clamping.

pub mod action;
pub mod clock;
pub mod mapper;

pub use action::{Action, Key};
pub use clock::{FrameClock, ManualClock, MonotonicClock, TimeSource};
pub use mapper::{InputMapper, KeyBindings};
pub use marchlight_common::PointerButton;
