use std::collections::HashSet;

use super::types::Key;

/// Per-frame input deltas.
///
/// [`super::InputState`] answers "is this key held"; `InputFrame` answers
/// "did it go down or up this frame". The runtime clears it after each
/// `on_frame` call.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Keys pressed this frame.
    pub keys_pressed: HashSet<Key>,

    /// Keys released this frame.
    pub keys_released: HashSet<Key>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
    }
}
