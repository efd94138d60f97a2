use std::fmt;

use glow::HasContext;

/// One compilable unit of shader source.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
}

impl ShaderStage {
    pub fn label(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Geometry => "geometry",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The slice of the GL function table the program lifecycle touches.
///
/// Kept deliberately narrow: stage objects, one program object, and typed
/// uniform stores. [`glow::Context`] is the production implementation;
/// tests provide a scripted fake to drive compile/link outcomes.
pub trait ShaderGl {
    type Shader: Copy;
    type Program: Copy + PartialEq;
    type Uniform: Clone;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn compile_succeeded(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn link_succeeded(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);

    /// Makes `program` (or no program, for `None`) current for subsequent
    /// draw calls. This is context-wide mutable state.
    fn use_program(&self, program: Option<Self::Program>);

    /// Resolves a uniform name against a linked program. `None` means the
    /// name does not correspond to an active uniform.
    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::Uniform>;

    fn set_uniform_f32(&self, location: &Self::Uniform, value: f32);
    fn set_uniform_i32(&self, location: &Self::Uniform, value: i32);
    fn set_uniform_vec2(&self, location: &Self::Uniform, value: [f32; 2]);
    fn set_uniform_vec3(&self, location: &Self::Uniform, value: [f32; 3]);
    fn set_uniform_vec4(&self, location: &Self::Uniform, value: [f32; 4]);
    /// Column-major 4x4 matrix.
    fn set_uniform_mat4(&self, location: &Self::Uniform, value: &[f32; 16]);
}

fn stage_kind(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        ShaderStage::Geometry => glow::GEOMETRY_SHADER,
    }
}

impl ShaderGl for glow::Context {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type Uniform = glow::UniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        unsafe { HasContext::create_shader(self, stage_kind(stage)) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { HasContext::shader_source(self, shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::compile_shader(self, shader) }
    }

    fn compile_succeeded(&self, shader: Self::Shader) -> bool {
        unsafe { self.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { HasContext::create_program(self) }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { HasContext::link_program(self, program) }
    }

    fn link_succeeded(&self, program: Self::Program) -> bool {
        unsafe { self.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.get_program_info_log(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { HasContext::use_program(self, program) }
    }

    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::Uniform> {
        unsafe { self.get_uniform_location(program, name) }
    }

    fn set_uniform_f32(&self, location: &Self::Uniform, value: f32) {
        unsafe { self.uniform_1_f32(Some(location), value) }
    }

    fn set_uniform_i32(&self, location: &Self::Uniform, value: i32) {
        unsafe { self.uniform_1_i32(Some(location), value) }
    }

    fn set_uniform_vec2(&self, location: &Self::Uniform, value: [f32; 2]) {
        unsafe { self.uniform_2_f32(Some(location), value[0], value[1]) }
    }

    fn set_uniform_vec3(&self, location: &Self::Uniform, value: [f32; 3]) {
        unsafe { self.uniform_3_f32(Some(location), value[0], value[1], value[2]) }
    }

    fn set_uniform_vec4(&self, location: &Self::Uniform, value: [f32; 4]) {
        unsafe { self.uniform_4_f32(Some(location), value[0], value[1], value[2], value[3]) }
    }

    fn set_uniform_mat4(&self, location: &Self::Uniform, value: &[f32; 16]) {
        unsafe { self.uniform_matrix_4_f32_slice(Some(location), false, value) }
    }
}
