//! Shader Pass
//!
//! A [`ShaderPass`] is one vertex/fragment source pair plus the cache of every
//! variant compiled from it. Looking up a variant either returns the cached
//! [`ProgramBinding`] or builds it on the spot:
//!
//! ```rust,ignore
//! let mut pass = ShaderPass::new("forward", VS, FS);
//!
//! let mut macros = MacroSet::new();
//! macros.enable(ctx.macros.intern("HAS_NORMAL_MAP", None));
//!
//! let program = pass.get_program(&mut ctx, &macros);
//! ```
//!
//! A pass belongs to the [`EngineContext`] that built its programs; using it
//! with another context is a logic error.

use crate::renderer::core::context::EngineContext;
use crate::renderer::core::device::GpuDevice;
use crate::renderer::pipeline::program::ProgramBinding;
use crate::renderer::pipeline::variant_cache::{VariantCache, VariantLookup};
use crate::resources::macro_set::MacroSet;

pub struct ShaderPass<D: GpuDevice> {
    name: String,
    vertex_source: String,
    fragment_source: String,
    variants: VariantCache<ProgramBinding<D>>,
}

impl<D: GpuDevice> ShaderPass<D> {
    pub fn new(
        name: impl Into<String>,
        vertex_source: impl Into<String>,
        fragment_source: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            vertex_source: vertex_source.into(),
            fragment_source: fragment_source.into(),
            variants: VariantCache::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the program for `macros`, compiling it on first use.
    ///
    /// A variant that failed to compile is returned (invalid) on every later
    /// call without compiling again.
    pub fn get_program(
        &mut self,
        ctx: &mut EngineContext<D>,
        macros: &MacroSet,
    ) -> &mut ProgramBinding<D> {
        match self.variants.get(macros) {
            VariantLookup::Hit(program) => program,
            VariantLookup::Miss(pending) => {
                log::debug!("Variant cache miss for pass '{}'", self.name);
                let program = ProgramBinding::build(
                    ctx,
                    &self.name,
                    &self.vertex_source,
                    &self.fragment_source,
                    macros,
                );
                pending.cache(program)
            }
        }
    }

    /// Number of cached variants, invalid ones included.
    #[must_use]
    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    /// Deletes every compiled program of the pass.
    pub fn destroy(self, ctx: &mut EngineContext<D>) {
        let count = self.variants.len();
        self.variants.destroy(|program| {
            if ctx.active_program == Some(program.id()) {
                ctx.active_program = None;
            }
            program.release(&mut ctx.device);
        });
        log::debug!("Destroyed pass '{}' ({count} variants)", self.name);
    }
}
