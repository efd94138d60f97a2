use std::sync::Arc;

use winit::window::Window;

use crate::device::GlContext;
use crate::input::{InputFrame, InputState};
use crate::paint::Color;
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Per-frame context passed to [`super::App::on_frame`].
pub struct FrameCtx<'a> {
    pub window: &'a Window,
    pub device: &'a mut GlContext,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl FrameCtx<'_> {
    /// Shared GL function table, for constructing meshes and shader
    /// programs.
    pub fn gl(&self) -> &Arc<glow::Context> {
        self.device.gl()
    }

    /// Clears the backbuffer with `clear`, invokes `draw` with the live
    /// function table, then presents.
    ///
    /// Present failures on GL are transient: they are logged and the frame
    /// is dropped, so this always returns [`AppControl::Continue`] — exit
    /// decisions stay with the app.
    pub fn render<F>(&mut self, clear: Color, draw: F) -> AppControl
    where
        F: FnOnce(&Arc<glow::Context>),
    {
        self.device.begin_frame(clear);
        draw(self.device.gl());

        if let Err(e) = self.device.present() {
            log::error!("failed to present frame: {e:#}");
        }

        AppControl::Continue
    }
}
