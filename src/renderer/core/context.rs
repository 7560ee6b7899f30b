//! Engine Context
//!
//! The [`EngineContext`] owns everything the variant system shares across
//! passes: the GPU device, the shader compiler, the macro and property
//! registries, and the engine-wide "currently active program" pointer that
//! [`ProgramBinding::bind`](crate::renderer::pipeline::ProgramBinding::bind)
//! uses to skip redundant program switches.
//!
//! One context per GPU context; it is not meant to be shared across threads.

use crate::renderer::core::device::GpuDevice;
use crate::renderer::pipeline::compiler::{DefinePreamble, ShaderCompiler};
use crate::renderer::pipeline::program::ProgramId;
use crate::renderer::settings::VariantSettings;
use crate::resources::macro_registry::MacroRegistry;
use crate::resources::shader_property::PropertyRegistry;

pub struct EngineContext<D: GpuDevice> {
    pub(crate) device: D,
    pub(crate) compiler: Box<dyn ShaderCompiler>,
    /// Engine-wide macro identities.
    pub macros: MacroRegistry,
    /// Engine-wide shader property names and their uniform groups.
    pub properties: PropertyRegistry,
    pub(crate) settings: VariantSettings,
    pub(crate) active_program: Option<ProgramId>,
    next_program_id: u32,
}

impl<D: GpuDevice> EngineContext<D> {
    pub fn new(
        device: D,
        compiler: impl ShaderCompiler + 'static,
        settings: VariantSettings,
    ) -> Self {
        log::debug!(
            "Variant system on {:?}, platform flags {:?}",
            settings.platform.api,
            settings.platform.flags()
        );
        Self {
            device,
            compiler: Box::new(compiler),
            macros: MacroRegistry::new(),
            properties: PropertyRegistry::new(),
            settings,
            active_program: None,
            next_program_id: 0,
        }
    }

    /// Context compiling with a [`DefinePreamble`] built from `settings`.
    pub fn with_preamble(device: D, settings: VariantSettings) -> Self {
        let compiler = DefinePreamble::new(&settings);
        Self::new(device, compiler, settings)
    }

    #[inline]
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Direct device access.
    ///
    /// Call [`Self::invalidate_active_program`] after switching programs
    /// behind the context's back.
    #[inline]
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    #[inline]
    pub fn settings(&self) -> &VariantSettings {
        &self.settings
    }

    /// Program the device currently has active, as far as the context knows.
    #[inline]
    pub fn active_program(&self) -> Option<ProgramId> {
        self.active_program
    }

    /// Forgets the active program so the next bind always switches.
    pub fn invalidate_active_program(&mut self) {
        self.active_program = None;
    }

    /// Unbinds whatever program is active.
    pub fn unbind_program(&mut self) {
        self.device.use_program(None);
        self.active_program = None;
    }

    pub(crate) fn next_program_id(&mut self) -> ProgramId {
        let id = ProgramId(self.next_program_id);
        self.next_program_id += 1;
        id
    }
}
