//! Renderer-side half of the variant system.

pub mod core;
pub mod pipeline;
pub mod settings;

pub use self::core::{EngineContext, GpuDevice};
pub use pipeline::{ProgramBinding, ProgramState, ShaderPass};
pub use settings::{GraphicsApi, PlatformCaps, VariantSettings};
