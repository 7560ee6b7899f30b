//! OpenGL / WebGL device over `glow`.
//!
//! Textures are owned by the host; register them to obtain the
//! [`TextureHandle`] that [`UniformValue::Texture`](crate::resources::UniformValue::Texture)
//! refers to.

use glow::HasContext;
use slotmap::SlotMap;

use crate::errors::{Result, VariantError};
use crate::renderer::core::device::GpuDevice;
use crate::renderer::pipeline::compiler::CompiledStages;
use crate::resources::texture::{TextureHandle, TextureTarget};
use crate::resources::uniforms::{ActiveAttribute, ActiveUniform, UniformCall, UniformKind};

pub struct GlowDevice<T: HasContext> {
    gl: T,
    textures: SlotMap<TextureHandle, T::Texture>,
}

impl<T: HasContext> GlowDevice<T> {
    pub fn new(gl: T) -> Self {
        Self {
            gl,
            textures: SlotMap::with_key(),
        }
    }

    #[inline]
    pub fn gl(&self) -> &T {
        &self.gl
    }

    pub fn register_texture(&mut self, texture: T::Texture) -> TextureHandle {
        self.textures.insert(texture)
    }

    fn compile_stage(&self, stage: &'static str, kind: u32, source: &str) -> Result<T::Shader> {
        unsafe {
            let shader = self
                .gl
                .create_shader(kind)
                .map_err(VariantError::ProgramCreateFailed)?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(VariantError::ShaderCompileFailed { stage, log });
            }
            Ok(shader)
        }
    }
}

fn uniform_kind(gl_type: u32) -> Option<UniformKind> {
    let kind = match gl_type {
        glow::FLOAT => UniformKind::Float,
        glow::FLOAT_VEC2 => UniformKind::Vec2,
        glow::FLOAT_VEC3 => UniformKind::Vec3,
        glow::FLOAT_VEC4 => UniformKind::Vec4,
        glow::INT | glow::BOOL => UniformKind::Int,
        glow::INT_VEC2 | glow::BOOL_VEC2 => UniformKind::IVec2,
        glow::INT_VEC3 | glow::BOOL_VEC3 => UniformKind::IVec3,
        glow::INT_VEC4 | glow::BOOL_VEC4 => UniformKind::IVec4,
        glow::FLOAT_MAT3 => UniformKind::Mat3,
        glow::FLOAT_MAT4 => UniformKind::Mat4,
        glow::SAMPLER_2D | glow::SAMPLER_2D_SHADOW => {
            UniformKind::Sampler(TextureTarget::Texture2D)
        }
        glow::SAMPLER_CUBE => UniformKind::Sampler(TextureTarget::TextureCube),
        glow::SAMPLER_2D_ARRAY | glow::SAMPLER_2D_ARRAY_SHADOW => {
            UniformKind::Sampler(TextureTarget::Texture2DArray)
        }
        _ => return None,
    };
    Some(kind)
}

fn texture_target(target: TextureTarget) -> u32 {
    match target {
        TextureTarget::Texture2D => glow::TEXTURE_2D,
        TextureTarget::TextureCube => glow::TEXTURE_CUBE_MAP,
        TextureTarget::Texture2DArray => glow::TEXTURE_2D_ARRAY,
    }
}

impl<T: HasContext> GpuDevice for GlowDevice<T> {
    type Program = T::Program;
    type Location = T::UniformLocation;

    fn create_program(&mut self, stages: &CompiledStages) -> Result<Self::Program> {
        let vertex = self.compile_stage("vertex", glow::VERTEX_SHADER, &stages.vertex)?;
        let fragment = self.compile_stage("fragment", glow::FRAGMENT_SHADER, &stages.fragment);
        let fragment = match fragment {
            Ok(shader) => shader,
            Err(err) => {
                unsafe { self.gl.delete_shader(vertex) };
                return Err(err);
            }
        };

        unsafe {
            let program = match self.gl.create_program() {
                Ok(program) => program,
                Err(err) => {
                    self.gl.delete_shader(vertex);
                    self.gl.delete_shader(fragment);
                    return Err(VariantError::ProgramCreateFailed(err));
                }
            };
            self.gl.attach_shader(program, vertex);
            self.gl.attach_shader(program, fragment);
            self.gl.link_program(program);

            for shader in [vertex, fragment] {
                self.gl.detach_shader(program, shader);
                self.gl.delete_shader(shader);
            }

            if !self.gl.get_program_link_status(program) {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                return Err(VariantError::ProgramLinkFailed(log));
            }
            Ok(program)
        }
    }

    fn delete_program(&mut self, program: Self::Program) {
        unsafe { self.gl.delete_program(program) };
    }

    fn active_uniforms(&self, program: &Self::Program) -> Vec<ActiveUniform> {
        unsafe {
            let count = self.gl.get_active_uniforms(*program);
            (0..count)
                .filter_map(|index| self.gl.get_active_uniform(*program, index))
                .filter_map(|uniform| match uniform_kind(uniform.utype) {
                    Some(kind) => Some(ActiveUniform::new(
                        uniform.name,
                        kind,
                        uniform.size.max(1) as u32,
                    )),
                    None => {
                        log::warn!(
                            "{}",
                            VariantError::UnsupportedUniformType {
                                name: uniform.name,
                                gl_type: uniform.utype,
                            }
                        );
                        None
                    }
                })
                .collect()
        }
    }

    fn active_attributes(&self, program: &Self::Program) -> Vec<ActiveAttribute> {
        unsafe {
            let count = self.gl.get_active_attributes(*program);
            (0..count)
                .filter_map(|index| self.gl.get_active_attribute(*program, index))
                .map(|attribute| ActiveAttribute {
                    name: attribute.name,
                    size: attribute.size.max(1) as u32,
                })
                .collect()
        }
    }

    fn uniform_location(&self, program: &Self::Program, name: &str) -> Option<Self::Location> {
        unsafe { self.gl.get_uniform_location(*program, name) }
    }

    fn attribute_location(&self, program: &Self::Program, name: &str) -> Option<u32> {
        unsafe { self.gl.get_attrib_location(*program, name) }
    }

    fn use_program(&mut self, program: Option<&Self::Program>) {
        unsafe { self.gl.use_program(program.copied()) };
    }

    fn set_uniform(&mut self, location: &Self::Location, call: UniformCall<'_>) {
        let loc = Some(location);
        unsafe {
            match call {
                UniformCall::Float1(x) => self.gl.uniform_1_f32(loc, x),
                UniformCall::Float2([x, y]) => self.gl.uniform_2_f32(loc, x, y),
                UniformCall::Float3([x, y, z]) => self.gl.uniform_3_f32(loc, x, y, z),
                UniformCall::Float4([x, y, z, w]) => self.gl.uniform_4_f32(loc, x, y, z, w),
                UniformCall::Int1(x) => self.gl.uniform_1_i32(loc, x),
                UniformCall::Int2([x, y]) => self.gl.uniform_2_i32(loc, x, y),
                UniformCall::Int3([x, y, z]) => self.gl.uniform_3_i32(loc, x, y, z),
                UniformCall::Int4([x, y, z, w]) => self.gl.uniform_4_i32(loc, x, y, z, w),
                UniformCall::Float1v(v) => self.gl.uniform_1_f32_slice(loc, v),
                UniformCall::Float2v(v) => self.gl.uniform_2_f32_slice(loc, v),
                UniformCall::Float3v(v) => self.gl.uniform_3_f32_slice(loc, v),
                UniformCall::Float4v(v) => self.gl.uniform_4_f32_slice(loc, v),
                UniformCall::Int1v(v) => self.gl.uniform_1_i32_slice(loc, v),
                UniformCall::Int2v(v) => self.gl.uniform_2_i32_slice(loc, v),
                UniformCall::Int3v(v) => self.gl.uniform_3_i32_slice(loc, v),
                UniformCall::Int4v(v) => self.gl.uniform_4_i32_slice(loc, v),
                UniformCall::Matrix3v(v) => self.gl.uniform_matrix_3_f32_slice(loc, false, v),
                UniformCall::Matrix4v(v) => self.gl.uniform_matrix_4_f32_slice(loc, false, v),
            }
        }
    }

    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: Option<TextureHandle>) {
        let texture = texture.and_then(|handle| self.textures.get(handle).copied());
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(texture_target(target), texture);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_types_upload_as_integers() {
        assert_eq!(uniform_kind(glow::BOOL), Some(UniformKind::Int));
        assert_eq!(uniform_kind(glow::BOOL_VEC2), Some(UniformKind::IVec2));
        assert_eq!(uniform_kind(glow::BOOL_VEC3), Some(UniformKind::IVec3));
        assert_eq!(uniform_kind(glow::BOOL_VEC4), Some(UniformKind::IVec4));
    }

    #[test]
    fn shadow_samplers_share_their_plain_target() {
        assert_eq!(
            uniform_kind(glow::SAMPLER_2D_SHADOW),
            Some(UniformKind::Sampler(TextureTarget::Texture2D))
        );
        assert_eq!(
            uniform_kind(glow::SAMPLER_2D_ARRAY_SHADOW),
            Some(UniformKind::Sampler(TextureTarget::Texture2DArray))
        );
        assert_eq!(
            uniform_kind(glow::SAMPLER_CUBE),
            Some(UniformKind::Sampler(TextureTarget::TextureCube))
        );
    }

    #[test]
    fn unsupported_types_are_skipped() {
        assert_eq!(uniform_kind(glow::FLOAT_MAT2), None);
        assert_eq!(uniform_kind(glow::SAMPLER_3D), None);
        assert_eq!(texture_target(TextureTarget::TextureCube), glow::TEXTURE_CUBE_MAP);
    }
}
