//! Color values used by the render loop.

mod color;

pub use color::Color;
