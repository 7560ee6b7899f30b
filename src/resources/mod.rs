//! Core resource definitions, independent of any GPU implementation:
//! - Macro registry and macro sets
//! - Shader properties and uniform groups
//! - Shader data (group-tagged value sources)
//! - Uniform value types and texture handles

pub mod macro_registry;
pub mod macro_set;
pub mod shader_data;
pub mod shader_property;
pub mod texture;
pub mod uniforms;

pub use macro_registry::{MacroIdentity, MacroRef, MacroRegistry};
pub use macro_set::MacroSet;
pub use shader_data::ShaderData;
pub use shader_property::{PropertyId, PropertyRegistry, UniformGroup};
pub use texture::{TextureHandle, TextureTarget};
pub use uniforms::{ActiveAttribute, ActiveUniform, UniformCall, UniformKind, UniformValue};
