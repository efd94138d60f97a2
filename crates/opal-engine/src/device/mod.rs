//! GL device + surface management.
//!
//! Responsible for:
//! - picking a framebuffer config and creating the window alongside it
//! - creating the GL context and window surface, and making them current
//! - loading the GL function table (shared as an `Arc`)
//! - per-frame clear/present and resize handling

mod context;

pub use context::{GlContext, GlInit};
