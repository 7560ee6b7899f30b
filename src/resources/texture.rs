//! Texture references carried by uniform values.
//!
//! The variant system never owns textures. Host code registers its native
//! texture objects with the device and passes the returned [`TextureHandle`]
//! around as a uniform value.

use serde::{Deserialize, Serialize};

slotmap::new_key_type! {
    /// Device-issued handle of a texture object.
    pub struct TextureHandle;
}

/// Binding point a sampler uniform reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureTarget {
    Texture2D,
    TextureCube,
    Texture2DArray,
}
