//! Error Types
//!
//! This module defines the error types used throughout the variant system.
//!
//! # Overview
//!
//! The main error type [`VariantError`] covers the recoverable failure modes:
//! - Shader stage compilation and program link failures
//! - GPU program object creation failures
//! - Uniform property group conflicts
//!
//! Programming errors (registry exhaustion, broken cache invariants) are not
//! represented here; they panic.
//!
//! # Usage
//!
//! All fallible APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, VariantError>`.
//!
//! ```rust,ignore
//! use myth_variants::errors::{VariantError, Result};
//!
//! fn compile() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::resources::shader_property::UniformGroup;

/// The main error type for the variant system.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VariantError {
    // ========================================================================
    // Compilation Errors
    // ========================================================================
    /// A shader stage failed to compile.
    #[error("Failed to compile {stage} shader: {log}")]
    ShaderCompileFailed {
        /// Stage that failed (`vertex` / `fragment`)
        stage: &'static str,
        /// Info log reported by the compiler
        log: String,
    },

    /// The compiled stages failed to link into a program.
    #[error("Failed to link program: {0}")]
    ProgramLinkFailed(String),

    /// The device could not allocate a program or shader object.
    #[error("Failed to create GPU program object: {0}")]
    ProgramCreateFailed(String),

    // ========================================================================
    // Uniform Errors
    // ========================================================================
    /// A property was written into a value source of another group than the
    /// one it is already bound to.
    #[error("Shader property '{name}' is in the {existing:?} group, not {requested:?}")]
    PropertyGroupConflict {
        /// Property name
        name: String,
        /// Group the property was first assigned to
        existing: UniformGroup,
        /// Group of the value source that tried to write it
        requested: UniformGroup,
    },

    /// The device reported a uniform type this crate cannot upload.
    #[error("Unsupported uniform type for '{name}': {gl_type:#x}")]
    UnsupportedUniformType {
        /// Uniform name as reported by introspection
        name: String,
        /// Raw type enum reported by the driver
        gl_type: u32,
    },
}

/// Alias for `Result<T, VariantError>`.
pub type Result<T> = std::result::Result<T, VariantError>;
