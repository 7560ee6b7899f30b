//! String Interner
//!
//! Thin wrapper over a single-threaded [`lasso::Rodeo`]. Each registry owns its
//! own interner instead of sharing a process-wide table, so a fresh registry
//! can be built per engine (or per test) without cross-talk.

use lasso::{Key, Rodeo, Spur};

/// Symbol type alias
///
/// A compact integer identifier that compares and hashes as an integer.
pub type Symbol = Spur;

/// Owned string table mapping strings to [`Symbol`]s and back.
#[derive(Debug, Default)]
pub struct Interner {
    rodeo: Rodeo,
}

impl Interner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a string, returning the existing symbol if already present.
    #[inline]
    pub fn intern(&mut self, s: &str) -> Symbol {
        self.rodeo.get_or_intern(s)
    }

    /// Looks up a string without interning it.
    #[inline]
    #[must_use]
    pub fn get(&self, s: &str) -> Option<Symbol> {
        self.rodeo.get(s)
    }

    /// Resolves a symbol produced by this interner.
    ///
    /// # Panics
    /// If the symbol was produced by a different interner and is out of range.
    #[inline]
    #[must_use]
    pub fn resolve(&self, sym: Symbol) -> &str {
        self.rodeo.resolve(&sym)
    }

    /// Number of distinct strings interned so far.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

/// Dense index of a symbol, suitable for indexing side tables.
#[inline]
#[must_use]
pub fn symbol_index(sym: Symbol) -> usize {
    sym.into_usize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_and_resolve() {
        let mut interner = Interner::new();
        let s1 = interner.intern("hello");
        let s2 = interner.intern("hello");
        let s3 = interner.intern("world");

        assert_eq!(s1, s2);
        assert_ne!(s1, s3);

        assert_eq!(interner.resolve(s1), "hello");
        assert_eq!(interner.resolve(s3), "world");
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn test_get() {
        let mut interner = Interner::new();
        let _ = interner.intern("existing");

        assert!(interner.get("existing").is_some());
        assert!(interner.get("non_existing").is_none());
    }

    #[test]
    fn test_symbol_index_is_dense() {
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        assert_eq!(symbol_index(a), 0);
        assert_eq!(symbol_index(b), 1);
    }
}
