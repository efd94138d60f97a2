//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the single window, and wires them to the
//! GL device layer.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
