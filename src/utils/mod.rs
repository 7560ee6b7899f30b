//! Utility Module
//!
//! - [`interner`]: string interning for macro and property names
//!
//! Interned strings ([`Symbol`]s) compare in O(1) and are only meaningful
//! for the [`Interner`] that produced them.

pub mod interner;

pub use interner::{Interner, Symbol};
