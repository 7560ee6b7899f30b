#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Shader variant identity and caching.
//!
//! Materials and render passes describe which compile-time macros a draw needs
//! as a compact [`MacroSet`]. A [`ShaderPass`] maps every distinct set to a
//! linked [`ProgramBinding`], compiling each variant exactly once (failures
//! included) and caching uploaded uniform values per program.
//!
//! ```rust,ignore
//! use myth_variants::{
//!     EngineContext, MacroSet, ShaderData, ShaderPass, UniformGroup, VariantSettings,
//! };
//!
//! let mut ctx = EngineContext::with_preamble(device, VariantSettings::default());
//! let mut pass = ShaderPass::new("forward", VS, FS);
//!
//! let mut material = ShaderData::new(UniformGroup::Material);
//! material.enable_macro(&mut ctx.macros, "HAS_MAP");
//! material.set(&mut ctx.properties, "u_roughness", 0.5_f32)?;
//!
//! let program = pass.get_program(&mut ctx, material.macros());
//! if program.is_valid() {
//!     program.bind(&mut ctx);
//!     program.upload_group(&mut ctx, UniformGroup::Material, &material);
//!     program.upload_ungrouped_textures(&mut ctx);
//! }
//! ```

pub mod errors;
pub mod renderer;
pub mod resources;
pub mod utils;

pub use errors::{Result, VariantError};
pub use renderer::core::{EngineContext, GpuDevice};
#[cfg(feature = "glow")]
pub use renderer::core::GlowDevice;
pub use renderer::pipeline::{
    CompileRequest, CompiledStages, DefinePreamble, ProgramBinding, ProgramId, ProgramState,
    ShaderCompiler, ShaderPass, UniformSlot, VariantCache, VariantLookup,
};
pub use renderer::settings::{GraphicsApi, PlatformCaps, VariantSettings};
pub use resources::{
    ActiveAttribute, ActiveUniform, MacroIdentity, MacroRef, MacroRegistry, MacroSet, PropertyId,
    PropertyRegistry, ShaderData, TextureHandle, TextureTarget, UniformCall, UniformGroup,
    UniformKind, UniformValue,
};
