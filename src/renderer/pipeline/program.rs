//! Program Binding
//!
//! A [`ProgramBinding`] is what the variant cache stores for one
//! (pass, macro set) pair: the linked program (if linking succeeded), its
//! uniforms sorted into [`UniformGroup`]s, the texture units owned by its
//! samplers, and the last value uploaded to every scalar / vector uniform.
//!
//! # Draw protocol
//!
//! ```rust,ignore
//! let program = pass.get_program(&mut ctx, &macros);
//! if program.is_valid() {
//!     program.bind(&mut ctx);
//!     program.upload_group(&mut ctx, UniformGroup::Scene, &scene_data);
//!     program.upload_group(&mut ctx, UniformGroup::Camera, &camera_data);
//!     program.upload_group(&mut ctx, UniformGroup::Renderer, &renderer_data);
//!     program.upload_group(&mut ctx, UniformGroup::Material, &material_data);
//!     program.upload_ungrouped_textures(&mut ctx);
//!     // draw
//! }
//! ```
//!
//! Groups are uploaded broadest first. Uniforms whose property had no group
//! when the program was built sit in `Ungrouped` and move to their group as
//! soon as the property registry learns it.
//!
//! # Upload cache
//!
//! Scalar and vector uniforms remember the value last sent to the device and
//! skip the call when the new value is equal. Matrices, arrays and textures are
//! always sent; comparing them costs about as much as the call.

use std::ops::Range;

use rustc_hash::FxHashMap;

use crate::renderer::core::context::EngineContext;
use crate::renderer::core::device::GpuDevice;
use crate::renderer::pipeline::compiler::CompileRequest;
use crate::resources::macro_set::MacroSet;
use crate::resources::shader_data::ShaderData;
use crate::resources::shader_property::{PropertyId, PropertyRegistry, UniformGroup};
use crate::resources::texture::TextureTarget;
use crate::resources::uniforms::{ActiveUniform, UniformCall, UniformKind, UniformValue};

/// Engine-unique identity of a [`ProgramBinding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub(crate) u32);

/// Lifecycle of a cached program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramState {
    /// Freshly allocated. `build` moves past it before returning.
    Uncompiled,
    /// Set while `build` compiles and links. Builds are synchronous, so a
    /// binding handed out by `build` is never observed in this state.
    Compiling,
    /// Linked and introspected; stays valid for the lifetime of its pass.
    Valid,
    /// Compilation or linking failed. Terminal, and cached like a valid program.
    Invalid,
}

// ============================================================================
// Uniform slots
// ============================================================================

/// Typed upload routine of a slot, fixed at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Uploader {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Int,
    IVec2,
    IVec3,
    IVec4,
    FloatArray,
    Vec2Array,
    Vec3Array,
    Vec4Array,
    IntArray,
    IVec2Array,
    IVec3Array,
    IVec4Array,
    Mat3,
    Mat3Array,
    Mat4,
    Mat4Array,
    Texture {
        target: TextureTarget,
        unit: u32,
    },
    TextureArray {
        target: TextureTarget,
        first_unit: u32,
        count: u32,
    },
}

impl Uploader {
    /// Uploader for an introspected uniform. Samplers take consecutive
    /// texture units starting at `next_unit`, which is advanced past them.
    fn for_uniform(uniform: &ActiveUniform, next_unit: &mut u32) -> Self {
        let is_array = uniform.is_array();
        match (uniform.kind, is_array) {
            (UniformKind::Float, false) => Uploader::Float,
            (UniformKind::Float, true) => Uploader::FloatArray,
            (UniformKind::Vec2, false) => Uploader::Vec2,
            (UniformKind::Vec2, true) => Uploader::Vec2Array,
            (UniformKind::Vec3, false) => Uploader::Vec3,
            (UniformKind::Vec3, true) => Uploader::Vec3Array,
            (UniformKind::Vec4, false) => Uploader::Vec4,
            (UniformKind::Vec4, true) => Uploader::Vec4Array,
            (UniformKind::Int, false) => Uploader::Int,
            (UniformKind::Int, true) => Uploader::IntArray,
            (UniformKind::IVec2, false) => Uploader::IVec2,
            (UniformKind::IVec2, true) => Uploader::IVec2Array,
            (UniformKind::IVec3, false) => Uploader::IVec3,
            (UniformKind::IVec3, true) => Uploader::IVec3Array,
            (UniformKind::IVec4, false) => Uploader::IVec4,
            (UniformKind::IVec4, true) => Uploader::IVec4Array,
            (UniformKind::Mat3, false) => Uploader::Mat3,
            (UniformKind::Mat3, true) => Uploader::Mat3Array,
            (UniformKind::Mat4, false) => Uploader::Mat4,
            (UniformKind::Mat4, true) => Uploader::Mat4Array,
            (UniformKind::Sampler(target), false) => {
                let unit = *next_unit;
                *next_unit += 1;
                Uploader::Texture { target, unit }
            }
            (UniformKind::Sampler(target), true) => {
                let count = uniform.size.max(1);
                let first_unit = *next_unit;
                *next_unit += count;
                Uploader::TextureArray {
                    target,
                    first_unit,
                    count,
                }
            }
        }
    }

    /// The set-call for `value`, or `None` if the value does not fit the slot.
    fn call(self, value: &UniformValue) -> Option<UniformCall<'_>> {
        let call = match (self, value) {
            (Uploader::Float, UniformValue::Float(v)) => UniformCall::Float1(*v),
            (Uploader::Vec2, UniformValue::Vec2(v)) => UniformCall::Float2(v.to_array()),
            (Uploader::Vec3, UniformValue::Vec3(v)) => UniformCall::Float3(v.to_array()),
            (Uploader::Vec4, UniformValue::Vec4(v)) => UniformCall::Float4(v.to_array()),
            (Uploader::Int, UniformValue::Int(v)) => UniformCall::Int1(*v),
            (Uploader::IVec2, UniformValue::IVec2(v)) => UniformCall::Int2(v.to_array()),
            (Uploader::IVec3, UniformValue::IVec3(v)) => UniformCall::Int3(v.to_array()),
            (Uploader::IVec4, UniformValue::IVec4(v)) => UniformCall::Int4(v.to_array()),
            (Uploader::FloatArray, UniformValue::FloatArray(v)) => UniformCall::Float1v(v),
            (Uploader::Vec2Array, UniformValue::Vec2Array(v)) => {
                UniformCall::Float2v(bytemuck::cast_slice(v))
            }
            (Uploader::Vec3Array, UniformValue::Vec3Array(v)) => {
                UniformCall::Float3v(bytemuck::cast_slice(v))
            }
            (Uploader::Vec4Array, UniformValue::Vec4Array(v)) => {
                UniformCall::Float4v(bytemuck::cast_slice(v))
            }
            (Uploader::IntArray, UniformValue::IntArray(v)) => UniformCall::Int1v(v),
            (Uploader::IVec2Array, UniformValue::IVec2Array(v)) => {
                UniformCall::Int2v(bytemuck::cast_slice(v))
            }
            (Uploader::IVec3Array, UniformValue::IVec3Array(v)) => {
                UniformCall::Int3v(bytemuck::cast_slice(v))
            }
            (Uploader::IVec4Array, UniformValue::IVec4Array(v)) => {
                UniformCall::Int4v(bytemuck::cast_slice(v))
            }
            (Uploader::Mat3, UniformValue::Mat3(m)) => {
                UniformCall::Matrix3v(bytemuck::cast_slice(std::slice::from_ref(m)))
            }
            (Uploader::Mat3Array, UniformValue::Mat3Array(v)) => {
                UniformCall::Matrix3v(bytemuck::cast_slice(v))
            }
            (Uploader::Mat4, UniformValue::Mat4(m)) => {
                UniformCall::Matrix4v(bytemuck::cast_slice(std::slice::from_ref(m)))
            }
            (Uploader::Mat4Array, UniformValue::Mat4Array(v)) => {
                UniformCall::Matrix4v(bytemuck::cast_slice(v))
            }
            _ => return None,
        };
        Some(call)
    }
}

/// One active uniform of a linked program.
#[derive(Debug)]
pub struct UniformSlot<L> {
    name: String,
    property: PropertyId,
    location: L,
    kind: UniformKind,
    group: UniformGroup,
    upload: Uploader,
    cached: Option<UniformValue>,
}

impl<L> UniformSlot<L> {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn property(&self) -> PropertyId {
        self.property
    }

    #[must_use]
    pub fn kind(&self) -> UniformKind {
        self.kind
    }

    #[must_use]
    pub fn group(&self) -> UniformGroup {
        self.group
    }

    /// Last value sent to the device, for scalar and vector slots.
    #[must_use]
    pub fn cached_value(&self) -> Option<&UniformValue> {
        self.cached.as_ref()
    }

    /// Texture units owned by a sampler slot.
    #[must_use]
    pub fn texture_units(&self) -> Option<Range<u32>> {
        match self.upload {
            Uploader::Texture { unit, .. } => Some(unit..unit + 1),
            Uploader::TextureArray {
                first_unit, count, ..
            } => Some(first_unit..first_unit + count),
            _ => None,
        }
    }

    fn upload<D>(&mut self, device: &mut D, value: &UniformValue)
    where
        D: GpuDevice<Location = L>,
    {
        match (self.upload, value) {
            (Uploader::Texture { target, unit }, UniformValue::Texture(texture)) => {
                device.bind_texture(unit, target, *texture);
            }
            (
                Uploader::TextureArray {
                    target,
                    first_unit,
                    count,
                },
                UniformValue::TextureArray(textures),
            ) => {
                for (i, unit) in (first_unit..first_unit + count).enumerate() {
                    device.bind_texture(unit, target, textures.get(i).copied().flatten());
                }
            }
            (upload, value) => {
                let cacheable = value.is_cacheable();
                if cacheable && self.cached.as_ref() == Some(value) {
                    return;
                }
                let Some(call) = upload.call(value) else {
                    log::trace!("Value for uniform '{}' does not match {:?}", self.name, self.kind);
                    return;
                };
                device.set_uniform(&self.location, call);
                if cacheable {
                    self.cached = Some(value.clone());
                }
            }
        }
    }

    /// Binds "no texture" to every unit this sampler owns.
    fn unbind_textures<D: GpuDevice>(&self, device: &mut D) {
        let (target, units) = match self.upload {
            Uploader::Texture { target, unit } => (target, unit..unit + 1),
            Uploader::TextureArray {
                target,
                first_unit,
                count,
            } => (target, first_unit..first_unit + count),
            _ => return,
        };
        for unit in units {
            device.bind_texture(unit, target, None);
        }
    }
}

// ============================================================================
// Program binding
// ============================================================================

/// A compiled (or negatively cached) variant of a shader pass.
pub struct ProgramBinding<D: GpuDevice> {
    id: ProgramId,
    state: ProgramState,
    program: Option<D::Program>,
    macros: Vec<String>,
    groups: [Vec<UniformSlot<D::Location>>; UniformGroup::COUNT],
    attributes: FxHashMap<String, u32>,
    texture_units: u32,
    grouped_at: u64,
}

impl<D: GpuDevice> ProgramBinding<D> {
    fn uncompiled(id: ProgramId) -> Self {
        Self {
            id,
            state: ProgramState::Uncompiled,
            program: None,
            macros: Vec::new(),
            groups: Default::default(),
            attributes: FxHashMap::default(),
            texture_units: 0,
            grouped_at: 0,
        }
    }

    /// Compiles, links and introspects the variant of a pass for `macros`.
    ///
    /// Never fails: a compile or link error yields an [`ProgramState::Invalid`]
    /// binding, which the caller caches like any other.
    pub fn build(
        ctx: &mut EngineContext<D>,
        pass_name: &str,
        vertex_source: &str,
        fragment_source: &str,
        macros: &MacroSet,
    ) -> Self {
        let mut binding = Self::uncompiled(ctx.next_program_id());
        binding.state = ProgramState::Compiling;
        binding.macros = ctx.macros.define_strings(macros);

        let platform_flags = ctx.settings.platform.flags();
        let request = CompileRequest {
            pass_name,
            vertex_source,
            fragment_source,
            macros: &binding.macros,
            platform_flags: &platform_flags,
        };

        let linked = ctx
            .compiler
            .compile(&request)
            .and_then(|stages| ctx.device.create_program(&stages));

        match linked {
            Ok(program) => {
                binding.introspect(ctx, &program);
                binding.program = Some(program);
                binding.state = ProgramState::Valid;
                log::debug!(
                    "Compiled pass '{pass_name}' variant {:?} [{}]",
                    binding.id,
                    binding.macros.join(", ")
                );
            }
            Err(err) => {
                binding.state = ProgramState::Invalid;
                if ctx.settings.log_failed_variants {
                    log::warn!(
                        "Pass '{pass_name}' variant [{}] is unusable: {err}",
                        binding.macros.join(", ")
                    );
                }
            }
        }
        binding
    }

    fn introspect(&mut self, ctx: &mut EngineContext<D>, program: &D::Program) {
        let mut next_unit = 0u32;
        for uniform in ctx.device.active_uniforms(program) {
            let Some(location) = ctx.device.uniform_location(program, &uniform.name) else {
                log::trace!("Uniform '{}' has no location", uniform.name);
                continue;
            };
            let upload = Uploader::for_uniform(&uniform, &mut next_unit);

            let property = ctx.properties.intern(&uniform.name);
            let group = ctx
                .properties
                .group(property)
                .unwrap_or(UniformGroup::Ungrouped);
            self.groups[group.index()].push(UniformSlot {
                name: uniform.name,
                property,
                location,
                kind: uniform.kind,
                group,
                upload,
                cached: None,
            });
        }
        self.texture_units = next_unit;
        self.grouped_at = ctx.properties.version();

        for attribute in ctx.device.active_attributes(program) {
            if let Some(location) = ctx.device.attribute_location(program, &attribute.name) {
                self.attributes.insert(attribute.name, location);
            }
        }

        if next_unit > 0 {
            // Sampler → unit assignment is written once and never changes.
            ctx.device.use_program(Some(program));
            ctx.active_program = Some(self.id);
            for slot in self.groups.iter().flatten() {
                match slot.upload {
                    Uploader::Texture { unit, .. } => {
                        ctx.device
                            .set_uniform(&slot.location, UniformCall::Int1(unit as i32));
                    }
                    Uploader::TextureArray {
                        first_unit, count, ..
                    } => {
                        let units: Vec<i32> =
                            (first_unit..first_unit + count).map(|u| u as i32).collect();
                        ctx.device.set_uniform(&slot.location, UniformCall::Int1v(&units));
                    }
                    _ => {}
                }
            }
        }
    }

    /// Moves ungrouped uniforms whose property has since acquired a group.
    fn regroup(&mut self, properties: &PropertyRegistry) {
        if self.grouped_at == properties.version() {
            return;
        }
        self.grouped_at = properties.version();

        let ungrouped = std::mem::take(&mut self.groups[UniformGroup::Ungrouped.index()]);
        for mut slot in ungrouped {
            let group = properties
                .group(slot.property)
                .unwrap_or(UniformGroup::Ungrouped);
            if group != UniformGroup::Ungrouped {
                log::debug!("Uniform '{}' of {:?} moved to {group:?}", slot.name, self.id);
            }
            slot.group = group;
            self.groups[group.index()].push(slot);
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> ProgramId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> ProgramState {
        self.state
    }

    /// Whether the variant linked. Callers skip the draw otherwise.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.state == ProgramState::Valid
    }

    /// The define list the variant was compiled with.
    #[must_use]
    pub fn macros(&self) -> &[String] {
        &self.macros
    }

    #[must_use]
    pub fn program(&self) -> Option<&D::Program> {
        self.program.as_ref()
    }

    /// Uniform slots currently in `group`.
    #[must_use]
    pub fn uniforms(&self, group: UniformGroup) -> &[UniformSlot<D::Location>] {
        &self.groups[group.index()]
    }

    #[must_use]
    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.attributes.get(name).copied()
    }

    /// Number of texture units claimed by the program's samplers.
    #[must_use]
    pub fn texture_unit_count(&self) -> u32 {
        self.texture_units
    }

    /// Makes this the active program if it is not already.
    ///
    /// Returns `true` when a switch happened. Invalid programs never bind.
    pub fn bind(&self, ctx: &mut EngineContext<D>) -> bool {
        let Some(program) = &self.program else {
            return false;
        };
        if ctx.active_program == Some(self.id) {
            return false;
        }
        ctx.device.use_program(Some(program));
        ctx.active_program = Some(self.id);
        true
    }

    /// Uploads every uniform of `group` whose property has a value in `data`.
    ///
    /// Uniforms without a value are skipped; the linker may have removed their
    /// use, or the data simply does not provide them.
    pub fn upload_group(
        &mut self,
        ctx: &mut EngineContext<D>,
        group: UniformGroup,
        data: &ShaderData,
    ) {
        if !self.is_valid() {
            return;
        }
        self.regroup(&ctx.properties);
        for slot in &mut self.groups[group.index()] {
            match data.get(slot.property) {
                Some(value) => slot.upload(&mut ctx.device, value),
                None => log::trace!("No value for uniform '{}'", slot.name),
            }
        }
    }

    /// Clears the texture units of samplers nobody supplies a value for.
    pub fn upload_ungrouped_textures(&mut self, ctx: &mut EngineContext<D>) {
        if !self.is_valid() {
            return;
        }
        self.regroup(&ctx.properties);
        for slot in &self.groups[UniformGroup::Ungrouped.index()] {
            slot.unbind_textures(&mut ctx.device);
        }
    }

    /// Deletes the GPU program.
    pub fn release(self, device: &mut D) {
        if let Some(program) = self.program {
            device.delete_program(program);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{IVec2, Mat3, Vec2};

    use super::*;

    #[test]
    fn integer_vector_and_matrix_arrays_are_uploadable() {
        let mut unit = 0;
        let offsets = ActiveUniform::new("u_offsets[0]", UniformKind::IVec2, 4);
        let normals = ActiveUniform::new("u_normals[0]", UniformKind::Mat3, 2);
        assert_eq!(Uploader::for_uniform(&offsets, &mut unit), Uploader::IVec2Array);
        assert_eq!(Uploader::for_uniform(&normals, &mut unit), Uploader::Mat3Array);
        assert_eq!(unit, 0);

        let value = UniformValue::IVec2Array(vec![IVec2::new(1, 2), IVec2::new(3, 4)]);
        assert_eq!(
            Uploader::IVec2Array.call(&value),
            Some(UniformCall::Int2v(&[1, 2, 3, 4]))
        );
    }

    #[test]
    fn samplers_take_consecutive_units() {
        let mut unit = 0;
        let albedo = ActiveUniform::new(
            "u_albedo",
            UniformKind::Sampler(TextureTarget::Texture2D),
            1,
        );
        let shadows = ActiveUniform::new(
            "u_shadows[0]",
            UniformKind::Sampler(TextureTarget::Texture2DArray),
            3,
        );
        assert!(albedo.kind.is_sampler());
        assert_eq!(
            Uploader::for_uniform(&albedo, &mut unit),
            Uploader::Texture {
                target: TextureTarget::Texture2D,
                unit: 0
            }
        );
        assert_eq!(
            Uploader::for_uniform(&shadows, &mut unit),
            Uploader::TextureArray {
                target: TextureTarget::Texture2DArray,
                first_unit: 1,
                count: 3
            }
        );
        assert_eq!(unit, 4);
    }

    #[test]
    fn calls_flatten_glam_values() {
        let vectors = UniformValue::Vec2Array(vec![Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0)]);
        assert_eq!(
            Uploader::Vec2Array.call(&vectors),
            Some(UniformCall::Float2v(&[1.0, 2.0, 3.0, 4.0]))
        );

        let matrix = UniformValue::Mat3(Mat3::IDENTITY);
        let Some(UniformCall::Matrix3v(floats)) = Uploader::Mat3.call(&matrix) else {
            panic!("expected a matrix call");
        };
        assert_eq!(floats, [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn mismatched_value_yields_no_call() {
        assert_eq!(Uploader::Vec3.call(&UniformValue::Float(1.0)), None);
    }
}
