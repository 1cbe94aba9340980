/// Keyboard key identifier.
///
/// Only keys the application reacts to get a variant; everything else is
/// carried as `Unknown` with the platform key code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,

    /// Platform-dependent key not represented here.
    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Platform-agnostic input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Window focus gained (`true`) or lost (`false`).
    Focused(bool),

    Key {
        key: Key,
        state: KeyState,
        /// OS key repeat.
        repeat: bool,
    },
}
