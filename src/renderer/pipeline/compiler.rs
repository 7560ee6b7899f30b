//! Shader compiler collaborator.
//!
//! Turns a pass's source pair plus the decoded macro list into the final stage
//! sources the device links. [`DefinePreamble`] is the default: it prefixes a
//! `#version` line, extension directives, platform flags and one `#define` per
//! macro. Engines with a real preprocessor or transpiler implement
//! [`ShaderCompiler`] themselves.

use crate::errors::Result;
use crate::renderer::settings::{GraphicsApi, VariantSettings};

/// Input of one variant compilation.
#[derive(Debug, Clone, Copy)]
pub struct CompileRequest<'a> {
    pub pass_name: &'a str,
    pub vertex_source: &'a str,
    pub fragment_source: &'a str,
    /// Enabled macros in canonical order, as `"NAME"` or `"NAME value"`.
    pub macros: &'a [String],
    /// Platform capability flags, as produced by `PlatformCaps::flags`.
    pub platform_flags: &'a [String],
}

/// Final per-stage sources (or binaries) ready for linking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledStages {
    pub vertex: String,
    pub fragment: String,
}

pub trait ShaderCompiler {
    fn compile(&mut self, request: &CompileRequest<'_>) -> Result<CompiledStages>;
}

/// Prepends a GLSL preamble to both stages.
#[derive(Debug, Clone)]
pub struct DefinePreamble {
    api: GraphicsApi,
    extensions: Vec<String>,
    precision: String,
}

impl DefinePreamble {
    #[must_use]
    pub fn new(settings: &VariantSettings) -> Self {
        Self {
            api: settings.platform.api,
            extensions: settings.platform.extension_directives(),
            precision: settings.float_precision.clone(),
        }
    }

    fn preamble(&self, request: &CompileRequest<'_>, fragment: bool) -> String {
        let mut out = String::with_capacity(256);
        out.push_str(self.api.glsl_version());
        out.push('\n');
        if fragment {
            for ext in &self.extensions {
                out.push_str(ext);
                out.push('\n');
            }
        }
        if self.api != GraphicsApi::Gl33 {
            out.push_str("precision ");
            out.push_str(&self.precision);
            out.push_str(" float;\n");
        }
        for define in request.platform_flags.iter().chain(request.macros) {
            out.push_str("#define ");
            out.push_str(define);
            out.push('\n');
        }
        out
    }
}

impl ShaderCompiler for DefinePreamble {
    fn compile(&mut self, request: &CompileRequest<'_>) -> Result<CompiledStages> {
        Ok(CompiledStages {
            vertex: self.preamble(request, false) + request.vertex_source,
            fragment: self.preamble(request, true) + request.fragment_source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::settings::PlatformCaps;

    fn compile_empty(settings: &VariantSettings) -> CompiledStages {
        let flags = settings.platform.flags();
        DefinePreamble::new(settings)
            .compile(&CompileRequest {
                pass_name: "forward",
                vertex_source: "",
                fragment_source: "",
                macros: &[],
                platform_flags: &flags,
            })
            .unwrap()
    }

    #[test]
    fn preamble_lists_flags_then_macros() {
        let mut compiler = DefinePreamble::new(&VariantSettings::default());
        let macros = vec!["HAS_UV".to_string(), "MAX_LIGHTS 4".to_string()];
        let flags = vec!["GRAPHICS_API_WEBGL2".to_string()];
        let stages = compiler
            .compile(&CompileRequest {
                pass_name: "forward",
                vertex_source: "void main() {}",
                fragment_source: "void main() {}",
                macros: &macros,
                platform_flags: &flags,
            })
            .unwrap();

        assert_eq!(
            stages.vertex,
            "#version 300 es\nprecision highp float;\n#define GRAPHICS_API_WEBGL2\n\
             #define HAS_UV\n#define MAX_LIGHTS 4\nvoid main() {}"
        );
        assert!(stages.fragment.starts_with("#version 300 es\n"));
    }

    #[test]
    fn webgl1_extensions_go_to_fragment_stage_only() {
        let settings = VariantSettings {
            platform: PlatformCaps {
                api: GraphicsApi::WebGl1,
                extensions: vec!["OES_standard_derivatives".into()],
            },
            ..VariantSettings::default()
        };
        let stages = compile_empty(&settings);

        assert_eq!(
            stages.fragment,
            "#version 100\n#extension GL_OES_standard_derivatives : enable\n\
             precision highp float;\n#define GRAPHICS_API_WEBGL1\n#define HAS_DERIVATIVES\n"
        );
        assert!(!stages.vertex.contains("#extension"));
        assert!(stages.vertex.starts_with("#version 100\nprecision highp float;\n"));
    }

    #[test]
    fn desktop_gl_omits_precision() {
        let settings = VariantSettings {
            platform: PlatformCaps {
                api: GraphicsApi::Gl33,
                extensions: Vec::new(),
            },
            ..VariantSettings::default()
        };
        let stages = compile_empty(&settings);

        assert!(stages.vertex.starts_with("#version 330 core\n#define GRAPHICS_API_GL33\n"));
        assert!(!stages.vertex.contains("precision"));
        assert!(!stages.fragment.contains("precision"));
    }
}
