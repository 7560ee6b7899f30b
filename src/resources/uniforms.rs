//! Uniform value types.
//!
//! Three views of a uniform meet here:
//!
//! - [`UniformKind`]: what the linked program declares (from introspection);
//! - [`UniformValue`]: what host code stores in a value source;
//! - [`UniformCall`]: the typed set-call issued to the device.

use glam::{IVec2, IVec3, IVec4, Mat3, Mat4, Vec2, Vec3, Vec4};

use super::texture::{TextureHandle, TextureTarget};

// ============================================================================
// Declared types
// ============================================================================

/// Uniform type as declared by the linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Int,
    IVec2,
    IVec3,
    IVec4,
    Mat3,
    Mat4,
    Sampler(TextureTarget),
}

impl UniformKind {
    #[inline]
    #[must_use]
    pub fn is_sampler(self) -> bool {
        matches!(self, UniformKind::Sampler(_))
    }
}

/// One active uniform reported by program introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveUniform {
    /// Name as reported by the driver (`foo[0]` for arrays).
    pub name: String,
    pub kind: UniformKind,
    /// Declared element count; `1` for non-arrays.
    pub size: u32,
}

impl ActiveUniform {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: UniformKind, size: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            size,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.size > 1 || self.name.ends_with("[0]")
    }
}

/// One active vertex attribute reported by program introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveAttribute {
    pub name: String,
    pub size: u32,
}

// ============================================================================
// Host values
// ============================================================================

/// A uniform value stored in a [`ShaderData`](super::shader_data::ShaderData).
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Int(i32),
    IVec2(IVec2),
    IVec3(IVec3),
    IVec4(IVec4),
    Mat3(Mat3),
    Mat4(Mat4),
    FloatArray(Vec<f32>),
    Vec2Array(Vec<Vec2>),
    Vec3Array(Vec<Vec3>),
    Vec4Array(Vec<Vec4>),
    IntArray(Vec<i32>),
    IVec2Array(Vec<IVec2>),
    IVec3Array(Vec<IVec3>),
    IVec4Array(Vec<IVec4>),
    Mat3Array(Vec<Mat3>),
    Mat4Array(Vec<Mat4>),
    Texture(Option<TextureHandle>),
    TextureArray(Vec<Option<TextureHandle>>),
}

impl UniformValue {
    /// Scalar and vector values are small enough to compare on every upload.
    #[must_use]
    pub fn is_cacheable(&self) -> bool {
        matches!(
            self,
            UniformValue::Float(_)
                | UniformValue::Vec2(_)
                | UniformValue::Vec3(_)
                | UniformValue::Vec4(_)
                | UniformValue::Int(_)
                | UniformValue::IVec2(_)
                | UniformValue::IVec3(_)
                | UniformValue::IVec4(_)
        )
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for UniformValue {
                fn from(value: $ty) -> Self {
                    UniformValue::$variant(value)
                }
            }
        )*
    };
}

impl_from_value! {
    f32 => Float,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    i32 => Int,
    IVec2 => IVec2,
    IVec3 => IVec3,
    IVec4 => IVec4,
    Mat3 => Mat3,
    Mat4 => Mat4,
    Vec<f32> => FloatArray,
    Vec<Vec2> => Vec2Array,
    Vec<Vec3> => Vec3Array,
    Vec<Vec4> => Vec4Array,
    Vec<i32> => IntArray,
    Vec<IVec2> => IVec2Array,
    Vec<IVec3> => IVec3Array,
    Vec<IVec4> => IVec4Array,
    Vec<Mat3> => Mat3Array,
    Vec<Mat4> => Mat4Array,
}

impl From<TextureHandle> for UniformValue {
    fn from(texture: TextureHandle) -> Self {
        UniformValue::Texture(Some(texture))
    }
}

// ============================================================================
// Device calls
// ============================================================================

/// A typed uniform set-call, one per GL `glUniform*` entry point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformCall<'a> {
    Float1(f32),
    Float2([f32; 2]),
    Float3([f32; 3]),
    Float4([f32; 4]),
    Int1(i32),
    Int2([i32; 2]),
    Int3([i32; 3]),
    Int4([i32; 4]),
    Float1v(&'a [f32]),
    Float2v(&'a [f32]),
    Float3v(&'a [f32]),
    Float4v(&'a [f32]),
    Int1v(&'a [i32]),
    Int2v(&'a [i32]),
    Int3v(&'a [i32]),
    Int4v(&'a [i32]),
    Matrix3v(&'a [f32]),
    Matrix4v(&'a [f32]),
}
