use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::api::{ShaderGl, ShaderStage};

/// Source text for the stages of one program.
///
/// Vertex and fragment are mandatory; geometry is optional and skipped when
/// absent. Source is only borrowed for the duration of construction — after
/// linking, the text is no longer needed.
#[derive(Debug, Clone)]
pub struct StageSources<'a> {
    pub vertex: &'a str,
    pub fragment: &'a str,
    pub geometry: Option<&'a str>,
}

impl<'a> StageSources<'a> {
    pub fn new(vertex: &'a str, fragment: &'a str) -> Self {
        Self { vertex, fragment, geometry: None }
    }

    pub fn with_geometry(mut self, source: &'a str) -> Self {
        self.geometry = Some(source);
        self
    }

    fn stages(&self) -> impl Iterator<Item = (ShaderStage, &'a str)> {
        [
            Some((ShaderStage::Vertex, self.vertex)),
            Some((ShaderStage::Fragment, self.fragment)),
            self.geometry.map(|src| (ShaderStage::Geometry, src)),
        ]
        .into_iter()
        .flatten()
    }
}

/// A compile or link failure captured during program construction.
///
/// Diagnostics are reported through the log and retained on the program;
/// they are not raised as errors (see [`ShaderProgram::new`]).
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderDiagnostic {
    /// One stage failed to compile. The other stages are still attempted so
    /// a single construction surfaces every broken stage at once.
    StageCompile { stage: ShaderStage, log: String },

    /// All stages compiled but the program failed to link.
    ProgramLink { log: String },
}

impl fmt::Display for ShaderDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderDiagnostic::StageCompile { stage, log } => {
                write!(f, "{stage} shader failed to compile: {log}")
            }
            ShaderDiagnostic::ProgramLink { log } => {
                write!(f, "shader program failed to link: {log}")
            }
        }
    }
}

impl std::error::Error for ShaderDiagnostic {}

/// A linked GPU program plus its uniform interface.
///
/// Lifecycle: constructed once from stage source, used repeatedly
/// (activate + set uniforms + draw), released exactly once on drop. The
/// program handle is exclusively owned; the shared `Arc` is only the GL
/// function table, which belongs to the context.
///
/// "Which program is currently active" is context-wide mutable state;
/// [`activate`](Self::activate) is the only way this crate mutates it, and
/// callers must not assume a program stays active across calls into other
/// code that may also activate one.
pub struct ShaderProgram<G: ShaderGl = glow::Context> {
    gl: Arc<G>,
    /// `Some` only when linking succeeded.
    program: Option<G::Program>,
    diagnostics: Vec<ShaderDiagnostic>,
    /// Cached name resolution, negative results included, so a misspelled
    /// name costs one lookup rather than one per frame.
    uniforms: HashMap<String, Option<G::Uniform>>,
}

impl<G: ShaderGl> ShaderProgram<G> {
    /// Compiles and links `sources` into a program.
    ///
    /// This never fails in the `Result` sense: compile and link errors are
    /// logged, recorded (see [`diagnostics`](Self::diagnostics)), and leave
    /// an inert object for which [`is_linked`](Self::is_linked) is false and
    /// every later operation is a no-op. All stages are compiled even when
    /// an earlier one fails; linking is only attempted when every stage
    /// compiled.
    pub fn new(gl: Arc<G>, sources: StageSources<'_>) -> Self {
        let mut diagnostics = Vec::new();
        let mut compiled = Vec::new();

        for (stage, source) in sources.stages() {
            match compile_stage(gl.as_ref(), stage, source) {
                Ok(shader) => compiled.push(shader),
                Err(diag) => {
                    log::error!("{diag}");
                    diagnostics.push(diag);
                }
            }
        }

        let program = if diagnostics.is_empty() {
            match link_stages(gl.as_ref(), &compiled) {
                Ok(program) => Some(program),
                Err(diag) => {
                    log::error!("{diag}");
                    diagnostics.push(diag);
                    None
                }
            }
        } else {
            None
        };

        // Stage objects are dead weight once linking is over (or abandoned);
        // each one is released here exactly once.
        for shader in compiled {
            gl.delete_shader(shader);
        }

        Self {
            gl,
            program,
            diagnostics,
            uniforms: HashMap::new(),
        }
    }

    /// True when construction produced a usable, linked program.
    pub fn is_linked(&self) -> bool {
        self.program.is_some()
    }

    /// Compile/link failures recorded during construction.
    pub fn diagnostics(&self) -> &[ShaderDiagnostic] {
        &self.diagnostics
    }

    /// Makes this program current for subsequent draw calls.
    ///
    /// Idempotent, and a no-op on an unlinked program.
    pub fn activate(&self) {
        if let Some(program) = self.program {
            self.gl.use_program(Some(program));
        }
    }

    pub fn set_f32(&mut self, name: &str, value: f32, activate: bool) {
        if let Some(loc) = self.prepare(name, activate) {
            self.gl.set_uniform_f32(&loc, value);
        }
    }

    pub fn set_i32(&mut self, name: &str, value: i32, activate: bool) {
        if let Some(loc) = self.prepare(name, activate) {
            self.gl.set_uniform_i32(&loc, value);
        }
    }

    pub fn set_vec2(&mut self, name: &str, value: [f32; 2], activate: bool) {
        if let Some(loc) = self.prepare(name, activate) {
            self.gl.set_uniform_vec2(&loc, value);
        }
    }

    pub fn set_vec3(&mut self, name: &str, value: [f32; 3], activate: bool) {
        if let Some(loc) = self.prepare(name, activate) {
            self.gl.set_uniform_vec3(&loc, value);
        }
    }

    pub fn set_vec4(&mut self, name: &str, value: [f32; 4], activate: bool) {
        if let Some(loc) = self.prepare(name, activate) {
            self.gl.set_uniform_vec4(&loc, value);
        }
    }

    /// Column-major 4x4 matrix.
    pub fn set_mat4(&mut self, name: &str, value: &[f32; 16], activate: bool) {
        if let Some(loc) = self.prepare(name, activate) {
            self.gl.set_uniform_mat4(&loc, value);
        }
    }

    /// Optionally activates, then resolves `name` through the cache.
    fn prepare(&mut self, name: &str, activate: bool) -> Option<G::Uniform> {
        if activate {
            self.activate();
        }
        self.location(name)
    }

    /// Resolves `name` against the linked program, caching the result.
    ///
    /// A name with no active uniform (misspelled, or optimized out by the
    /// driver) resolves to `None` and stays cached; setting through it is a
    /// silent no-op, mirroring GL itself.
    fn location(&mut self, name: &str) -> Option<G::Uniform> {
        let program = self.program?;

        if let Some(cached) = self.uniforms.get(name) {
            return cached.clone();
        }

        let location = self.gl.uniform_location(program, name);
        if location.is_none() {
            log::debug!("uniform `{name}` is not active in this program; ignoring");
        }
        self.uniforms.insert(name.to_owned(), location.clone());
        location
    }
}

impl<G: ShaderGl> Drop for ShaderProgram<G> {
    fn drop(&mut self) {
        if let Some(program) = self.program.take() {
            self.gl.delete_program(program);
        }
    }
}

/// Compiles one stage. On failure the stage object is released before the
/// diagnostic is returned.
fn compile_stage<G: ShaderGl>(
    gl: &G,
    stage: ShaderStage,
    source: &str,
) -> Result<G::Shader, ShaderDiagnostic> {
    let shader = gl
        .create_shader(stage)
        .map_err(|log| ShaderDiagnostic::StageCompile { stage, log })?;

    gl.shader_source(shader, source);
    gl.compile_shader(shader);

    if gl.compile_succeeded(shader) {
        Ok(shader)
    } else {
        let log = gl.shader_info_log(shader);
        gl.delete_shader(shader);
        Err(ShaderDiagnostic::StageCompile { stage, log })
    }
}

/// Attaches every compiled stage to a fresh program object and links it.
/// A failed link releases the program object before returning.
fn link_stages<G: ShaderGl>(gl: &G, stages: &[G::Shader]) -> Result<G::Program, ShaderDiagnostic> {
    let program = gl
        .create_program()
        .map_err(|log| ShaderDiagnostic::ProgramLink { log })?;

    for &shader in stages {
        gl.attach_shader(program, shader);
    }
    gl.link_program(program);

    if gl.link_succeeded(program) {
        Ok(program)
    } else {
        let log = gl.program_info_log(program);
        gl.delete_program(program);
        Err(ShaderDiagnostic::ProgramLink { log })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};

    use super::*;

    /// Scripted stand-in for the GL function table. Records every call and
    /// can be told to reject chosen stages or the link step.
    #[derive(Default)]
    struct FakeGl {
        fail_compile: HashSet<ShaderStage>,
        fail_link: bool,
        /// Names that resolve to locations after a successful link.
        active_uniforms: HashSet<String>,
        state: RefCell<FakeState>,
    }

    #[derive(Default)]
    struct FakeState {
        next_handle: u32,
        live_shaders: HashMap<u32, ShaderStage>,
        shaders_deleted: Vec<u32>,
        live_programs: HashSet<u32>,
        programs_deleted: Vec<u32>,
        attachments: Vec<(u32, u32)>,
        compile_calls: Vec<ShaderStage>,
        current: Option<u32>,
        use_calls: Vec<Option<u32>>,
        locations: HashMap<String, u32>,
        location_queries: Vec<String>,
        uniform_writes: Vec<(u32, String)>,
    }

    impl FakeGl {
        fn new() -> Self {
            Self::default()
        }

        fn fail_stage(mut self, stage: ShaderStage) -> Self {
            self.fail_compile.insert(stage);
            self
        }

        fn fail_link(mut self) -> Self {
            self.fail_link = true;
            self
        }

        fn with_uniform(mut self, name: &str) -> Self {
            self.active_uniforms.insert(name.to_owned());
            self
        }
    }

    impl ShaderGl for FakeGl {
        type Shader = u32;
        type Program = u32;
        type Uniform = u32;

        fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
            let mut st = self.state.borrow_mut();
            st.next_handle += 1;
            let handle = st.next_handle;
            st.live_shaders.insert(handle, stage);
            Ok(handle)
        }

        fn shader_source(&self, _shader: u32, _source: &str) {}

        fn compile_shader(&self, shader: u32) {
            let mut st = self.state.borrow_mut();
            let stage = st.live_shaders[&shader];
            st.compile_calls.push(stage);
        }

        fn compile_succeeded(&self, shader: u32) -> bool {
            let stage = self.state.borrow().live_shaders[&shader];
            !self.fail_compile.contains(&stage)
        }

        fn shader_info_log(&self, shader: u32) -> String {
            let stage = self.state.borrow().live_shaders[&shader];
            format!("0:1: syntax error in {stage} stage")
        }

        fn delete_shader(&self, shader: u32) {
            let mut st = self.state.borrow_mut();
            assert!(
                st.live_shaders.remove(&shader).is_some(),
                "shader {shader} deleted twice or never created"
            );
            st.shaders_deleted.push(shader);
        }

        fn create_program(&self) -> Result<u32, String> {
            let mut st = self.state.borrow_mut();
            st.next_handle += 1;
            let handle = st.next_handle;
            st.live_programs.insert(handle);
            Ok(handle)
        }

        fn attach_shader(&self, program: u32, shader: u32) {
            self.state.borrow_mut().attachments.push((program, shader));
        }

        fn link_program(&self, _program: u32) {}

        fn link_succeeded(&self, _program: u32) -> bool {
            !self.fail_link
        }

        fn program_info_log(&self, _program: u32) -> String {
            "interface mismatch between stages".to_owned()
        }

        fn delete_program(&self, program: u32) {
            let mut st = self.state.borrow_mut();
            assert!(
                st.live_programs.remove(&program),
                "program {program} deleted twice or never created"
            );
            st.programs_deleted.push(program);
        }

        fn use_program(&self, program: Option<u32>) {
            let mut st = self.state.borrow_mut();
            st.current = program;
            st.use_calls.push(program);
        }

        fn uniform_location(&self, _program: u32, name: &str) -> Option<u32> {
            let mut st = self.state.borrow_mut();
            st.location_queries.push(name.to_owned());
            if !self.active_uniforms.contains(name) {
                return None;
            }
            let next = st.locations.len() as u32;
            Some(*st.locations.entry(name.to_owned()).or_insert(next))
        }

        fn set_uniform_f32(&self, location: &u32, value: f32) {
            self.state.borrow_mut().uniform_writes.push((*location, format!("f32:{value}")));
        }

        fn set_uniform_i32(&self, location: &u32, value: i32) {
            self.state.borrow_mut().uniform_writes.push((*location, format!("i32:{value}")));
        }

        fn set_uniform_vec2(&self, location: &u32, value: [f32; 2]) {
            self.state.borrow_mut().uniform_writes.push((*location, format!("vec2:{value:?}")));
        }

        fn set_uniform_vec3(&self, location: &u32, value: [f32; 3]) {
            self.state.borrow_mut().uniform_writes.push((*location, format!("vec3:{value:?}")));
        }

        fn set_uniform_vec4(&self, location: &u32, value: [f32; 4]) {
            self.state.borrow_mut().uniform_writes.push((*location, format!("vec4:{value:?}")));
        }

        fn set_uniform_mat4(&self, location: &u32, _value: &[f32; 16]) {
            self.state.borrow_mut().uniform_writes.push((*location, "mat4".to_owned()));
        }
    }

    const VS: &str = "void main() {}";
    const FS: &str = "void main() {}";
    const GS: &str = "void main() {}";

    #[test]
    fn valid_pair_links_and_releases_stage_objects() {
        let gl = Arc::new(FakeGl::new().with_uniform("u_time"));
        let program = ShaderProgram::new(gl.clone(), StageSources::new(VS, FS));

        assert!(program.is_linked());
        assert!(program.diagnostics().is_empty());

        let st = gl.state.borrow();
        assert!(st.live_shaders.is_empty(), "stage objects must not outlive the link");
        assert_eq!(st.shaders_deleted.len(), 2);
        assert_eq!(st.live_programs.len(), 1);
    }

    #[test]
    fn activation_makes_the_program_current() {
        let gl = Arc::new(FakeGl::new());
        let program = ShaderProgram::new(gl.clone(), StageSources::new(VS, FS));

        program.activate();

        let st = gl.state.borrow();
        assert!(st.current.is_some());
        assert_eq!(st.use_calls.len(), 1);
    }

    #[test]
    fn repeated_activation_leaves_state_unchanged() {
        let gl = Arc::new(FakeGl::new());
        let program = ShaderProgram::new(gl.clone(), StageSources::new(VS, FS));

        program.activate();
        let current = gl.state.borrow().current;
        program.activate();

        assert_eq!(gl.state.borrow().current, current);
    }

    #[test]
    fn vertex_failure_is_reported_and_fragment_is_still_attempted() {
        let gl = Arc::new(FakeGl::new().fail_stage(ShaderStage::Vertex));
        let program = ShaderProgram::new(gl.clone(), StageSources::new(VS, FS));

        assert!(!program.is_linked());
        assert_eq!(program.diagnostics().len(), 1);
        assert!(matches!(
            program.diagnostics()[0],
            ShaderDiagnostic::StageCompile { stage: ShaderStage::Vertex, .. }
        ));

        let st = gl.state.borrow();
        // The failing vertex stage must not short-circuit the fragment stage.
        assert_eq!(st.compile_calls, vec![ShaderStage::Vertex, ShaderStage::Fragment]);
        // No program object was ever created, and no stage object leaked.
        assert!(st.live_programs.is_empty());
        assert!(st.live_shaders.is_empty());
    }

    #[test]
    fn every_broken_stage_is_reported_in_stage_order() {
        let gl = Arc::new(
            FakeGl::new()
                .fail_stage(ShaderStage::Vertex)
                .fail_stage(ShaderStage::Fragment),
        );
        let program = ShaderProgram::new(gl, StageSources::new(VS, FS));

        let stages: Vec<_> = program
            .diagnostics()
            .iter()
            .map(|d| match d {
                ShaderDiagnostic::StageCompile { stage, .. } => *stage,
                other => panic!("unexpected diagnostic: {other}"),
            })
            .collect();
        assert_eq!(stages, vec![ShaderStage::Vertex, ShaderStage::Fragment]);
    }

    #[test]
    fn unlinked_program_ignores_activate_and_setters() {
        let gl = Arc::new(FakeGl::new().fail_stage(ShaderStage::Fragment));
        let mut program = ShaderProgram::new(gl.clone(), StageSources::new(VS, FS));

        program.activate();
        program.set_f32("u_time", 1.0, true);

        let st = gl.state.borrow();
        assert!(st.use_calls.is_empty());
        assert!(st.location_queries.is_empty());
        assert!(st.uniform_writes.is_empty());
    }

    #[test]
    fn link_failure_releases_the_program_object_once() {
        let gl = Arc::new(FakeGl::new().fail_link());
        let program = ShaderProgram::new(gl.clone(), StageSources::new(VS, FS));

        assert!(!program.is_linked());
        assert_eq!(program.diagnostics().len(), 1);
        assert!(matches!(program.diagnostics()[0], ShaderDiagnostic::ProgramLink { .. }));
        assert_eq!(gl.state.borrow().programs_deleted.len(), 1);

        // Dropping the inert object must not release the handle again; the
        // fake panics on a double delete.
        drop(program);
        assert_eq!(gl.state.borrow().programs_deleted.len(), 1);
    }

    #[test]
    fn geometry_stage_is_compiled_and_attached_when_present() {
        let gl = Arc::new(FakeGl::new());
        let program = ShaderProgram::new(gl.clone(), StageSources::new(VS, FS).with_geometry(GS));

        assert!(program.is_linked());
        let st = gl.state.borrow();
        assert_eq!(st.shaders_deleted.len(), 3);
        assert_eq!(st.attachments.len(), 3);
    }

    #[test]
    fn setting_a_known_uniform_writes_through_its_location() {
        let gl = Arc::new(FakeGl::new().with_uniform("u_color"));
        let mut program = ShaderProgram::new(gl.clone(), StageSources::new(VS, FS));

        program.set_vec3("u_color", [1.0, 0.5, 0.0], true);

        let st = gl.state.borrow();
        assert_eq!(st.uniform_writes.len(), 1);
        assert_eq!(st.use_calls.len(), 1, "activate flag must use the program first");
    }

    #[test]
    fn setting_an_unknown_uniform_is_a_silent_noop() {
        let gl = Arc::new(FakeGl::new());
        let mut program = ShaderProgram::new(gl.clone(), StageSources::new(VS, FS));

        program.set_f32("u_missing", 1.0, false);
        program.set_f32("u_missing", 2.0, false);

        let st = gl.state.borrow();
        assert!(st.uniform_writes.is_empty());
        // Negative lookups are cached: the second set costs no GL query.
        assert_eq!(st.location_queries.len(), 1);
    }

    #[test]
    fn uniform_locations_are_resolved_once_per_name() {
        let gl = Arc::new(FakeGl::new().with_uniform("u_time"));
        let mut program = ShaderProgram::new(gl.clone(), StageSources::new(VS, FS));

        program.set_f32("u_time", 0.1, false);
        program.set_f32("u_time", 0.2, false);
        program.set_f32("u_time", 0.3, false);

        let st = gl.state.borrow();
        assert_eq!(st.location_queries.len(), 1);
        assert_eq!(st.uniform_writes.len(), 3);
    }

    #[test]
    fn every_setter_type_reaches_the_table() {
        let gl = Arc::new(
            FakeGl::new()
                .with_uniform("a")
                .with_uniform("b")
                .with_uniform("c")
                .with_uniform("d")
                .with_uniform("e")
                .with_uniform("f"),
        );
        let mut program = ShaderProgram::new(gl.clone(), StageSources::new(VS, FS));

        program.set_f32("a", 1.0, false);
        program.set_i32("b", 2, false);
        program.set_vec2("c", [0.0, 1.0], false);
        program.set_vec3("d", [0.0, 1.0, 2.0], false);
        program.set_vec4("e", [0.0, 1.0, 2.0, 3.0], false);
        program.set_mat4("f", &[0.0; 16], false);

        assert_eq!(gl.state.borrow().uniform_writes.len(), 6);
    }

    #[test]
    fn drop_releases_the_program_handle_exactly_once() {
        let gl = Arc::new(FakeGl::new());
        let program = ShaderProgram::new(gl.clone(), StageSources::new(VS, FS));

        assert!(program.is_linked());
        drop(program);

        let st = gl.state.borrow();
        assert!(st.live_programs.is_empty());
        assert_eq!(st.programs_deleted.len(), 1);
    }
}
