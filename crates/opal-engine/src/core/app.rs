use winit::event::WindowEvent;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by the binary crate.
///
/// The runtime owns the window and the GL context; the app only reacts to
/// events and describes one frame at a time.
pub trait App {
    /// Called for raw window events the runtime does not consume itself.
    /// Most apps never need this; keyboard state is already tracked and
    /// available from [`FrameCtx::input`].
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per rendered frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl;
}
