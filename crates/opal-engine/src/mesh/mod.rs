//! Vertex data upload.
//!
//! [`Mesh`] owns one VAO/VBO pair holding a static, interleaved
//! position+color vertex list, drawn as a triangle list.

use std::mem;
use std::sync::Arc;

use anyhow::{Context as _, Result, anyhow};
use bytemuck::{Pod, Zeroable};
use glow::HasContext;

/// Interleaved vertex: position then color.
///
/// Every program drawing this layout must bind position at
/// [`Self::POSITION_LOCATION`] and color at [`Self::COLOR_LOCATION`].
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub pos: [f32; 3],
    pub color: [f32; 3],
}

impl ColorVertex {
    pub const POSITION_LOCATION: u32 = 0;
    pub const COLOR_LOCATION: u32 = 1;

    const STRIDE: i32 = mem::size_of::<ColorVertex>() as i32;
    const COLOR_OFFSET: i32 = mem::offset_of!(ColorVertex, color) as i32;

    pub const fn new(pos: [f32; 3], color: [f32; 3]) -> Self {
        Self { pos, color }
    }
}

/// A GPU-resident triangle list.
pub struct Mesh {
    gl: Arc<glow::Context>,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    vertex_count: i32,
}

impl Mesh {
    /// Uploads `vertices` into a fresh VAO/VBO pair as static draw data.
    ///
    /// The attribute layout is configured once here; drawing only needs to
    /// bind the VAO again.
    pub fn from_vertices(gl: Arc<glow::Context>, vertices: &[ColorVertex]) -> Result<Self> {
        let vertex_count =
            i32::try_from(vertices.len()).context("vertex count does not fit a draw call")?;

        let (vao, vbo) = unsafe {
            let vao = gl
                .create_vertex_array()
                .map_err(|e| anyhow!("failed to create vertex array: {e}"))?;
            let vbo = match gl.create_buffer() {
                Ok(vbo) => vbo,
                Err(e) => {
                    gl.delete_vertex_array(vao);
                    return Err(anyhow!("failed to create vertex buffer: {e}"));
                }
            };

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(vertices),
                glow::STATIC_DRAW,
            );

            gl.vertex_attrib_pointer_f32(
                ColorVertex::POSITION_LOCATION,
                3,
                glow::FLOAT,
                false,
                ColorVertex::STRIDE,
                0,
            );
            gl.enable_vertex_attrib_array(ColorVertex::POSITION_LOCATION);

            gl.vertex_attrib_pointer_f32(
                ColorVertex::COLOR_LOCATION,
                3,
                glow::FLOAT,
                false,
                ColorVertex::STRIDE,
                ColorVertex::COLOR_OFFSET,
            );
            gl.enable_vertex_attrib_array(ColorVertex::COLOR_LOCATION);

            gl.bind_vertex_array(None);
            (vao, vbo)
        };

        Ok(Self { gl, vao, vbo, vertex_count })
    }

    /// Issues the draw call for the whole vertex list.
    ///
    /// Assumes the desired program is already active.
    pub fn draw(&self) {
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
            self.gl.draw_arrays(glow::TRIANGLES, 0, self.vertex_count);
        }
    }

    pub fn vertex_count(&self) -> i32 {
        self.vertex_count
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_vertex_array(self.vao);
            self.gl.delete_buffer(self.vbo);
        }
    }
}
