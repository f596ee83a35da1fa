/// A keyboard key, independent of the windowing backend.
///
/// Only keys the demo binds are named; everything else maps to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    W,
    A,
    S,
    D,
    Space,
    LeftShift,
    LeftControl,
    Escape,
    F1,
    Other,
}

impl Key {
    /// Parse a single script character as used by headless simulation
    /// (`w`, `a`, `s`, `d`, ` ` for space, `^` for control, `+` for shift).
    pub fn from_script_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'w' => Some(Key::W),
            'a' => Some(Key::A),
            's' => Some(Key::S),
            'd' => Some(Key::D),
            ' ' => Some(Key::Space),
            '^' => Some(Key::LeftControl),
            '+' => Some(Key::LeftShift),
            _ => None,
        }
    }
}

/// A discrete request produced by input that the frame loop must act on.
///
/// Camera motion is applied directly by the mapper; actions cover what the
/// mapper does not own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Close the application at the end of this iteration.
    Quit,
    /// Show or hide the diagnostics overlay.
    ToggleOverlay,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_chars_map_to_keys() {
        assert_eq!(Key::from_script_char('W'), Some(Key::W));
        assert_eq!(Key::from_script_char(' '), Some(Key::Space));
        assert_eq!(Key::from_script_char('^'), Some(Key::LeftControl));
        assert_eq!(Key::from_script_char('+'), Some(Key::LeftShift));
        assert_eq!(Key::from_script_char('x'), None);
    }

    #[test]
    fn actions_compare_by_kind() {
        assert_ne!(Action::Quit, Action::ToggleOverlay);
    }
}
