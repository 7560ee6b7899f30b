//! Shared fixtures: a device that records every call and a compiler that
//! counts invocations.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use myth_variants::errors::{Result, VariantError};
use myth_variants::{
    ActiveAttribute, ActiveUniform, CompileRequest, CompiledStages, EngineContext, GpuDevice,
    ShaderCompiler, TextureHandle, TextureTarget, UniformCall, VariantSettings,
};

pub const VS: &str = "void main() { gl_Position = vec4(0.0); }";
pub const FS: &str = "void main() {}";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// RecordingDevice
// ============================================================================

/// Fake device. Programs are plain integers, locations are uniform names.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    /// Uniforms every program reports on introspection.
    pub uniforms: Vec<ActiveUniform>,
    pub attributes: Vec<ActiveAttribute>,
    /// Makes the next `create_program` calls fail to link.
    pub fail_link: bool,
    next_program: u32,
    pub created: Vec<u32>,
    pub deleted: Vec<u32>,
    pub use_program_calls: Vec<Option<u32>>,
    /// `(location, Debug rendering of the call)`
    pub uniform_calls: Vec<(String, String)>,
    pub texture_binds: Vec<(u32, TextureTarget, Option<TextureHandle>)>,
}

impl RecordingDevice {
    pub fn with_uniforms(uniforms: Vec<ActiveUniform>) -> Self {
        Self {
            uniforms,
            ..Default::default()
        }
    }

    pub fn calls_to(&self, location: &str) -> Vec<&str> {
        self.uniform_calls
            .iter()
            .filter(|(loc, _)| loc == location)
            .map(|(_, call)| call.as_str())
            .collect()
    }
}

impl GpuDevice for RecordingDevice {
    type Program = u32;
    type Location = String;

    fn create_program(&mut self, _stages: &CompiledStages) -> Result<u32> {
        if self.fail_link {
            return Err(VariantError::ProgramLinkFailed("forced link failure".into()));
        }
        self.next_program += 1;
        self.created.push(self.next_program);
        Ok(self.next_program)
    }

    fn delete_program(&mut self, program: u32) {
        self.deleted.push(program);
    }

    fn active_uniforms(&self, _program: &u32) -> Vec<ActiveUniform> {
        self.uniforms.clone()
    }

    fn active_attributes(&self, _program: &u32) -> Vec<ActiveAttribute> {
        self.attributes.clone()
    }

    fn uniform_location(&self, _program: &u32, name: &str) -> Option<String> {
        Some(name.to_string())
    }

    fn attribute_location(&self, _program: &u32, name: &str) -> Option<u32> {
        self.attributes
            .iter()
            .position(|a| a.name == name)
            .map(|i| i as u32)
    }

    fn use_program(&mut self, program: Option<&u32>) {
        self.use_program_calls.push(program.copied());
    }

    fn set_uniform(&mut self, location: &String, call: UniformCall<'_>) {
        self.uniform_calls.push((location.clone(), format!("{call:?}")));
    }

    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: Option<TextureHandle>) {
        self.texture_binds.push((unit, target, texture));
    }
}

// ============================================================================
// CountingCompiler
// ============================================================================

/// Passes sources through unchanged; clones share their counters.
#[derive(Debug, Clone, Default)]
pub struct CountingCompiler {
    pub calls: Rc<Cell<usize>>,
    pub fail: Rc<Cell<bool>>,
    /// Macro list of every request, in call order.
    pub requests: Rc<RefCell<Vec<Vec<String>>>>,
    pub flags: Rc<RefCell<Vec<String>>>,
}

impl CountingCompiler {
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl ShaderCompiler for CountingCompiler {
    fn compile(&mut self, request: &CompileRequest<'_>) -> Result<CompiledStages> {
        self.calls.set(self.calls.get() + 1);
        self.requests.borrow_mut().push(request.macros.to_vec());
        *self.flags.borrow_mut() = request.platform_flags.to_vec();
        if self.fail.get() {
            return Err(VariantError::ShaderCompileFailed {
                stage: "fragment",
                log: "forced compile failure".into(),
            });
        }
        Ok(CompiledStages {
            vertex: request.vertex_source.to_string(),
            fragment: request.fragment_source.to_string(),
        })
    }
}

pub fn context(
    uniforms: Vec<ActiveUniform>,
) -> (EngineContext<RecordingDevice>, CountingCompiler) {
    init_logger();
    let compiler = CountingCompiler::default();
    let ctx = EngineContext::new(
        RecordingDevice::with_uniforms(uniforms),
        compiler.clone(),
        VariantSettings::default(),
    );
    (ctx, compiler)
}
