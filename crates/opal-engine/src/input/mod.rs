//! Keyboard input model.
//!
//! The runtime translates window system events into [`InputEvent`]s and
//! feeds them through [`InputState::apply_event`]. Applications read the
//! current state (`key_down`) or the per-frame transition sets in
//! [`InputFrame`]. Pointer, wheel, and text input are intentionally absent:
//! this scaffold needs nothing beyond key state.

mod frame;
mod state;
mod types;

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{InputEvent, Key, KeyState, Modifiers};
