//! Triangle demo: the smallest complete application on the engine.
//!
//! Opens a window, builds one shader program and one mesh on the first
//! frame, then renders until Escape is pressed or the window closes.

use anyhow::Result;
use opal_engine::core::{App, AppControl, FrameCtx};
use opal_engine::device::GlInit;
use opal_engine::input::Key;
use opal_engine::logging::{LoggingConfig, init_logging};
use opal_engine::mesh::{ColorVertex, Mesh};
use opal_engine::paint::Color;
use opal_engine::shader::{ShaderProgram, StageSources};
use opal_engine::window::{Runtime, RuntimeConfig};
use opal_engine::winit::dpi::LogicalSize;

const VERTEX_SRC: &str = include_str!("../shaders/triangle.vert");
const FRAGMENT_SRC: &str = include_str!("../shaders/triangle.frag");

const CLEAR: Color = Color::opaque(0.2, 0.3, 0.3);

/// One triangle, interleaved position + color.
const TRIANGLE: [ColorVertex; 3] = [
    ColorVertex::new([0.5, -0.5, 0.0], [1.0, 0.0, 0.0]),
    ColorVertex::new([-0.5, -0.5, 0.0], [0.0, 1.0, 0.0]),
    ColorVertex::new([0.0, 0.5, 0.0], [0.0, 0.0, 1.0]),
];

struct Scene {
    program: ShaderProgram,
    mesh: Mesh,
}

impl Scene {
    fn create(ctx: &FrameCtx<'_>) -> Result<Self> {
        let program =
            ShaderProgram::new(ctx.gl().clone(), StageSources::new(VERTEX_SRC, FRAGMENT_SRC));
        anyhow::ensure!(program.is_linked(), "triangle shader did not link");

        let mesh = Mesh::from_vertices(ctx.gl().clone(), &TRIANGLE)?;
        Ok(Self { program, mesh })
    }
}

#[derive(Default)]
struct TriangleApp {
    scene: Option<Scene>,
}

impl App for TriangleApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        if ctx.input.key_down(Key::Escape) {
            return AppControl::Exit;
        }

        // GL objects need a live context, so the scene is built on the
        // first frame rather than in main.
        if self.scene.is_none() {
            match Scene::create(ctx) {
                Ok(scene) => self.scene = Some(scene),
                Err(e) => {
                    log::error!("failed to build the triangle scene: {e:#}");
                    return AppControl::Exit;
                }
            }
        }
        let Some(scene) = self.scene.as_mut() else {
            return AppControl::Exit;
        };

        let elapsed = ctx.time.elapsed;
        ctx.render(CLEAR, |_gl| {
            scene.program.set_f32("u_time", elapsed, true);
            scene.mesh.draw();
        })
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    Runtime::run(
        RuntimeConfig {
            title: "Opal Triangle".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        },
        GlInit::default(),
        TriangleApp::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // Guards the uniform name against drifting apart between the shader
    // source and the set call in `on_frame`.
    #[test]
    fn fragment_source_declares_the_uniform_we_set() {
        assert!(FRAGMENT_SRC.contains("uniform float u_time"));
    }

    #[test]
    fn vertex_source_matches_the_mesh_attribute_locations() {
        assert!(VERTEX_SRC.contains(&format!(
            "layout (location = {}) in vec3 a_pos",
            ColorVertex::POSITION_LOCATION
        )));
        assert!(VERTEX_SRC.contains(&format!(
            "layout (location = {}) in vec3 a_color",
            ColorVertex::COLOR_LOCATION
        )));
    }
}
