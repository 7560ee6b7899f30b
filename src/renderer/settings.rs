//! Variant System Settings & Platform Capabilities
//!
//! Configuration handed to [`EngineContext::new`](super::core::context::EngineContext::new).
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use myth_variants::renderer::{GraphicsApi, PlatformCaps, VariantSettings};
//!
//! // Default: WebGL2 / GLSL ES 3.00 with no optional extensions
//! let settings = VariantSettings::default();
//!
//! // WebGL1 device exposing derivatives and explicit LOD sampling
//! let settings = VariantSettings {
//!     platform: PlatformCaps {
//!         api: GraphicsApi::WebGl1,
//!         extensions: vec![
//!             "OES_standard_derivatives".into(),
//!             "EXT_shader_texture_lod".into(),
//!         ],
//!     },
//!     ..Default::default()
//! };
//! ```

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GraphicsApi
// ---------------------------------------------------------------------------

/// Shading-language generation the device accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GraphicsApi {
    /// OpenGL ES 2.0 / WebGL1, GLSL ES 1.00.
    WebGl1,
    /// OpenGL ES 3.0 / WebGL2, GLSL ES 3.00.
    #[default]
    WebGl2,
    /// Desktop OpenGL 3.3 core, GLSL 3.30.
    Gl33,
}

impl GraphicsApi {
    /// `#version` directive for this API.
    #[must_use]
    pub fn glsl_version(self) -> &'static str {
        match self {
            GraphicsApi::WebGl1 => "#version 100",
            GraphicsApi::WebGl2 => "#version 300 es",
            GraphicsApi::Gl33 => "#version 330 core",
        }
    }

    /// Features that are core in GL ES 3.0 and later.
    #[inline]
    #[must_use]
    pub fn is_es3_class(self) -> bool {
        !matches!(self, GraphicsApi::WebGl1)
    }
}

// ---------------------------------------------------------------------------
// PlatformCaps
// ---------------------------------------------------------------------------

/// Capabilities of the device the programs are compiled for.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlatformCaps {
    pub api: GraphicsApi,
    /// Extension names as reported by the driver (with or without `GL_` prefix).
    pub extensions: Vec<String>,
}

impl PlatformCaps {
    #[must_use]
    pub fn has_extension(&self, name: &str) -> bool {
        let bare = name.strip_prefix("GL_").unwrap_or(name);
        self.extensions
            .iter()
            .any(|e| e.strip_prefix("GL_").unwrap_or(e) == bare)
    }

    /// Platform flags handed to the compiler alongside the macro list.
    ///
    /// Features that ES3-class APIs provide natively are reported without
    /// needing the extension.
    #[must_use]
    pub fn flags(&self) -> Vec<String> {
        let mut flags = Vec::with_capacity(4);
        flags.push(
            match self.api {
                GraphicsApi::WebGl1 => "GRAPHICS_API_WEBGL1",
                GraphicsApi::WebGl2 => "GRAPHICS_API_WEBGL2",
                GraphicsApi::Gl33 => "GRAPHICS_API_GL33",
            }
            .to_string(),
        );

        let es3 = self.api.is_es3_class();
        if es3 || self.has_extension("OES_standard_derivatives") {
            flags.push("HAS_DERIVATIVES".to_string());
        }
        if es3 || self.has_extension("EXT_shader_texture_lod") {
            flags.push("HAS_TEX_LOD".to_string());
        }
        if es3 || self.has_extension("EXT_draw_buffers") {
            flags.push("HAS_DRAW_BUFFERS".to_string());
        }
        flags
    }

    /// `#extension` directives the shaders need on this platform.
    #[must_use]
    pub fn extension_directives(&self) -> Vec<String> {
        if self.api.is_es3_class() {
            return Vec::new();
        }
        ["OES_standard_derivatives", "EXT_shader_texture_lod", "EXT_draw_buffers"]
            .into_iter()
            .filter(|ext| self.has_extension(ext))
            .map(|ext| format!("#extension GL_{ext} : enable"))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// VariantSettings
// ---------------------------------------------------------------------------

/// Configuration of the variant system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantSettings {
    pub platform: PlatformCaps,
    /// Emits a `warn!` with the define list when a variant fails to compile.
    pub log_failed_variants: bool,
    /// Default float precision written by the preamble for ES targets.
    pub float_precision: String,
}

impl Default for VariantSettings {
    fn default() -> Self {
        Self {
            platform: PlatformCaps::default(),
            log_failed_variants: true,
            float_precision: "highp".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webgl1_flags_depend_on_extensions() {
        let caps = PlatformCaps {
            api: GraphicsApi::WebGl1,
            extensions: vec!["GL_OES_standard_derivatives".into()],
        };
        assert_eq!(caps.flags(), vec!["GRAPHICS_API_WEBGL1", "HAS_DERIVATIVES"]);
        assert_eq!(
            caps.extension_directives(),
            vec!["#extension GL_OES_standard_derivatives : enable"]
        );
    }

    #[test]
    fn webgl2_has_core_features() {
        let caps = PlatformCaps::default();
        assert_eq!(
            caps.flags(),
            vec![
                "GRAPHICS_API_WEBGL2",
                "HAS_DERIVATIVES",
                "HAS_TEX_LOD",
                "HAS_DRAW_BUFFERS"
            ]
        );
        assert!(caps.extension_directives().is_empty());
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: VariantSettings =
            serde_json::from_str(r#"{ "platform": { "api": "WebGl1", "extensions": [] } }"#)
                .unwrap();
        assert_eq!(settings.platform.api, GraphicsApi::WebGl1);
        assert!(settings.log_failed_variants);
        assert_eq!(settings.float_precision, "highp");
    }
}
