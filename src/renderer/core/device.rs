//! GPU device abstraction.
//!
//! The variant system issues every GPU call through [`GpuDevice`]. An OpenGL
//! implementation over `glow` lives in `glow_device` behind the
//! `glow` feature; tests plug in recording fakes.

use crate::errors::Result;
use crate::renderer::pipeline::compiler::CompiledStages;
use crate::resources::texture::{TextureHandle, TextureTarget};
use crate::resources::uniforms::{ActiveAttribute, ActiveUniform, UniformCall};

/// Program, introspection and uniform entry points of a graphics device.
///
/// Calls with identical arguments are idempotent.
pub trait GpuDevice {
    /// Linked program object.
    type Program;
    /// Uniform location inside a [`Self::Program`].
    type Location;

    /// Creates a program from the compiled stages and links it.
    fn create_program(&mut self, stages: &CompiledStages) -> Result<Self::Program>;

    fn delete_program(&mut self, program: Self::Program);

    /// Active uniforms of a linked program. Unsupported types are left out.
    fn active_uniforms(&self, program: &Self::Program) -> Vec<ActiveUniform>;

    fn active_attributes(&self, program: &Self::Program) -> Vec<ActiveAttribute>;

    fn uniform_location(&self, program: &Self::Program, name: &str) -> Option<Self::Location>;

    fn attribute_location(&self, program: &Self::Program, name: &str) -> Option<u32>;

    /// Makes `program` the active program; `None` unbinds.
    fn use_program(&mut self, program: Option<&Self::Program>);

    /// Sets a uniform of the active program.
    fn set_uniform(&mut self, location: &Self::Location, call: UniformCall<'_>);

    /// Binds `texture` (or nothing) to texture unit `unit`.
    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: Option<TextureHandle>);
}
