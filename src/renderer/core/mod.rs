//! GPU-facing core
//!
//! - [`EngineContext`]: device, compiler, registries and the active program
//! - [`GpuDevice`]: the device entry points the variant system calls
//! - `GlowDevice`: OpenGL / WebGL implementation (feature `glow`)

pub mod context;
pub mod device;
#[cfg(feature = "glow")]
pub mod glow_device;

pub use context::EngineContext;
pub use device::GpuDevice;
#[cfg(feature = "glow")]
pub use glow_device::GlowDevice;
