use std::collections::HashSet;

use super::types::{InputEvent, Key};

/// Input that arrived since the previous redraw.
///
/// The runtime clears it after every `on_frame`, so a key shows up in
/// `keys_pressed` for exactly one frame. Held keys live in `InputState`.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Translated events, oldest first.
    pub events: Vec<InputEvent>,

    pub keys_pressed: HashSet<Key>,
    pub keys_released: HashSet<Key>,
}

impl InputFrame {
    /// Whether `key` went down during this frame. Auto-repeat does not count.
    pub fn pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    pub(crate) fn push_event(&mut self, ev: InputEvent) {
        self.events.push(ev);
    }
}
