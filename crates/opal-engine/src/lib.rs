//! Opal engine crate.
//!
//! A minimal real-time rendering scaffold: window runtime, GL device layer,
//! shader programs, mesh upload, keyboard input, and frame timing. The
//! binary crate implements [`core::App`] and hands it to [`window::Runtime`].

pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod mesh;
pub mod paint;
pub mod shader;
pub mod time;
pub mod window;

// Applications construct window sizes and may issue raw GL calls inside the
// frame's draw closure; re-export the underlying crates so they do not have
// to pin matching versions themselves.
pub use glow;
pub use winit;
