use std::num::NonZeroU32;
use std::sync::Arc;

use anyhow::{Context as _, Result, anyhow};
use glow::HasContext;
use glutin::config::{Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

use crate::paint::Color;

/// Initialization parameters for the GL layer.
///
/// Keep this structure stable and minimal; add flags only when a concrete
/// platform requirement exists.
#[derive(Debug, Clone)]
pub struct GlInit {
    /// OpenGL core-profile version requested at context creation. When the
    /// driver refuses it, context creation retries with platform defaults.
    pub context_version: (u8, u8),

    /// Prefer an sRGB-capable framebuffer config when available.
    pub prefer_srgb: bool,

    /// Multisample count requested in the config template. Zero disables
    /// MSAA.
    pub msaa_samples: u8,

    /// Synchronize buffer swaps with the display refresh rate.
    pub vsync: bool,
}

impl Default for GlInit {
    fn default() -> Self {
        Self {
            context_version: (3, 3),
            prefer_srgb: true,
            msaa_samples: 0,
            vsync: true,
        }
    }
}

/// Owns the GL context, the window surface, and the loaded function table.
///
/// The function table is shared as an `Arc` so GPU resources (shader
/// programs, meshes) can release themselves on drop.
pub struct GlContext {
    gl: Arc<glow::Context>,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    size: PhysicalSize<u32>,
}

impl GlContext {
    /// Creates the window plus a current GL context bound to it.
    ///
    /// glutin has to pick the framebuffer config before the window can
    /// exist, so window and context creation are one operation here rather
    /// than two.
    pub fn create(
        event_loop: &ActiveEventLoop,
        attrs: WindowAttributes,
        init: &GlInit,
    ) -> Result<(Window, Self)> {
        let template = ConfigTemplateBuilder::new().with_multisampling(init.msaa_samples);
        let prefer_srgb = init.prefer_srgb;

        let (window, gl_config) = DisplayBuilder::new()
            .with_window_attributes(Some(attrs))
            .build(event_loop, template, move |configs| {
                pick_config(configs, prefer_srgb)
            })
            .map_err(|e| anyhow!("failed to create window and GL display: {e}"))?;
        let window = window.context("display builder produced no window")?;

        let raw_handle = window
            .window_handle()
            .context("window has no native handle")?
            .as_raw();
        let gl_display = gl_config.display();

        let (major, minor) = init.context_version;
        let requested = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
            .with_profile(GlProfile::Core)
            .build(Some(raw_handle));

        let not_current = unsafe {
            gl_display
                .create_context(&gl_config, &requested)
                .or_else(|_| {
                    log::warn!(
                        "GL {major}.{minor} core context unavailable; retrying with platform defaults"
                    );
                    let fallback = ContextAttributesBuilder::new().build(Some(raw_handle));
                    gl_display.create_context(&gl_config, &fallback)
                })
                .context("failed to create GL context")?
        };

        let surface_attrs = window
            .build_surface_attributes(Default::default())
            .context("failed to build surface attributes")?;
        let surface = unsafe {
            gl_display
                .create_window_surface(&gl_config, &surface_attrs)
                .context("failed to create GL surface")?
        };

        let context = not_current
            .make_current(&surface)
            .context("failed to make GL context current")?;

        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|symbol| gl_display.get_proc_address(symbol))
        };
        log::debug!("GL version: {}", unsafe { gl.get_parameter_string(glow::VERSION) });

        let swap = if init.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = surface.set_swap_interval(&context, swap) {
            log::warn!("failed to set swap interval: {e}");
        }

        let this = Self {
            gl: Arc::new(gl),
            surface,
            context,
            size: window.inner_size(),
        };
        this.apply_viewport();

        Ok((window, this))
    }

    /// Shared handle to the loaded GL function table.
    pub fn gl(&self) -> &Arc<glow::Context> {
        &self.gl
    }

    /// Current drawable size in physical pixels.
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Resizes the drawable surface and viewport.
    ///
    /// Zero-sized dimensions are ignored; minimized windows report 0x0 and
    /// GL surfaces cannot take that size.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let (Some(w), Some(h)) = (NonZeroU32::new(new_size.width), NonZeroU32::new(new_size.height))
        else {
            return;
        };

        self.size = new_size;
        self.surface.resize(&self.context, w, h);
        self.apply_viewport();
    }

    /// Clears the backbuffer to `clear`.
    pub fn begin_frame(&self, clear: Color) {
        let c = clear.clamped();
        unsafe {
            self.gl.clear_color(c.r, c.g, c.b, c.a);
            self.gl.clear(glow::COLOR_BUFFER_BIT);
        }
    }

    /// Swaps buffers, presenting the frame.
    pub fn present(&self) -> Result<()> {
        self.surface
            .swap_buffers(&self.context)
            .context("failed to swap buffers")
    }

    fn apply_viewport(&self) {
        unsafe {
            self.gl
                .viewport(0, 0, self.size.width as i32, self.size.height as i32);
        }
    }
}

/// Picks the config with the most samples, preferring sRGB-capable ones
/// when requested.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>, prefer_srgb: bool) -> Config {
    configs
        .reduce(|best, candidate| {
            let srgb_upgrade = prefer_srgb && candidate.srgb_capable() && !best.srgb_capable();
            if srgb_upgrade || candidate.num_samples() > best.num_samples() {
                candidate
            } else {
                best
            }
        })
        .expect("display offered no GL configs")
}
