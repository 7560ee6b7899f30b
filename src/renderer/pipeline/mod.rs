//! Shader variant pipeline
//!
//! - [`ShaderPass`]: a source pair and the variants compiled from it
//! - [`VariantCache`]: macro-set keyed program cache with two-phase misses
//! - [`ProgramBinding`]: linked program, grouped uniforms and upload cache
//! - [`ShaderCompiler`]: turns sources plus macros into final stage sources

pub mod compiler;
pub mod program;
pub mod shader_pass;
pub mod variant_cache;

pub use compiler::{CompileRequest, CompiledStages, DefinePreamble, ShaderCompiler};
pub use program::{ProgramBinding, ProgramId, ProgramState, UniformSlot};
pub use shader_pass::ShaderPass;
pub use variant_cache::{PendingVariant, VariantCache, VariantLookup};
