//! Shader Macro Registry
//!
//! Interns `(name, value)` pairs into permanent [`MacroIdentity`] records.
//! Every identity owns exactly one bit of a global bit namespace: identity
//! number `c` lives in word `c / 32` under mask `1 << (c % 32)`. The registry
//! never removes identities, so a bit, once assigned, means the same macro for
//! the registry's whole lifetime.
//!
//! A value-carrying macro (`"FOO bar"`) is a distinct identity from `"FOO baz"`
//! and from the bare `"FOO"`. Keeping such variants mutually exclusive is the
//! caller's job.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut registry = MacroRegistry::new();
//! let normal_map = registry.intern("HAS_NORMAL_MAP", None);
//! let lights = registry.intern("MAX_LIGHTS", Some("4"));
//!
//! let mut set = MacroSet::new();
//! set.enable(normal_map);
//! set.enable(lights);
//!
//! assert_eq!(registry.define_strings(&set), ["HAS_NORMAL_MAP", "MAX_LIGHTS 4"]);
//! ```

use rustc_hash::FxHashMap;

use super::macro_set::MacroSet;
use crate::utils::interner::{Interner, Symbol};

/// Number of macro bits stored per [`MacroSet`] word.
pub const MACRO_WORD_BITS: u32 = u32::BITS;

/// Immutable identity of one interned macro.
///
/// Cheap to copy. The `name` / `value` strings are resolved through the
/// owning [`MacroRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacroIdentity {
    name: Symbol,
    value: Option<Symbol>,
    name_id: u32,
    word_index: u32,
    bit_mask: u32,
}

impl MacroIdentity {
    /// Word of a [`MacroSet`] holding this macro's bit.
    #[inline]
    #[must_use]
    pub fn word_index(&self) -> usize {
        self.word_index as usize
    }

    /// Single-bit mask inside [`Self::word_index`].
    #[inline]
    #[must_use]
    pub fn bit_mask(&self) -> u32 {
        self.bit_mask
    }

    /// Identifier shared by every identity with the same name, whatever its value.
    #[inline]
    #[must_use]
    pub fn name_id(&self) -> u32 {
        self.name_id
    }

    /// Global slot number (`word_index * 32 + bit`).
    #[inline]
    #[must_use]
    pub fn slot(&self) -> usize {
        self.word_index as usize * MACRO_WORD_BITS as usize
            + self.bit_mask.trailing_zeros() as usize
    }

    #[inline]
    #[must_use]
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }
}

/// A macro reference accepted at API boundaries.
///
/// Resolved once into a canonical [`MacroIdentity`] by
/// [`MacroRegistry::resolve`]; nothing past that point deals with names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroRef<'a> {
    /// A macro looked up (and interned if new) by name and optional value.
    ByName {
        name: &'a str,
        value: Option<&'a str>,
    },
    /// An already interned identity.
    ByIdentity(MacroIdentity),
}

impl<'a> From<&'a str> for MacroRef<'a> {
    fn from(name: &'a str) -> Self {
        MacroRef::ByName { name, value: None }
    }
}

impl<'a> From<(&'a str, &'a str)> for MacroRef<'a> {
    fn from((name, value): (&'a str, &'a str)) -> Self {
        MacroRef::ByName {
            name,
            value: Some(value),
        }
    }
}

impl From<MacroIdentity> for MacroRef<'_> {
    fn from(id: MacroIdentity) -> Self {
        MacroRef::ByIdentity(id)
    }
}

/// Owner of every [`MacroIdentity`] of an engine.
#[derive(Debug, Default)]
pub struct MacroRegistry {
    strings: Interner,
    /// Lookup key (`"NAME"` or `"NAME value"`) → identity.
    by_key: FxHashMap<Symbol, MacroIdentity>,
    /// Name symbol → name id.
    name_ids: FxHashMap<Symbol, u32>,
    /// Reverse table indexed by slot (`word * 32 + bit`).
    by_slot: Vec<MacroIdentity>,
}

impl MacroRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `(name, value)` and returns its identity.
    ///
    /// Idempotent: the same pair always yields the same identity.
    ///
    /// # Panics
    /// If more than `u32::MAX` identities are requested.
    pub fn intern(&mut self, name: &str, value: Option<&str>) -> MacroIdentity {
        let key = match value {
            Some(value) => self.strings.intern(&format!("{name} {value}")),
            None => self.strings.intern(name),
        };
        if let Some(id) = self.by_key.get(&key) {
            return *id;
        }

        let counter = u32::try_from(self.by_slot.len())
            .ok()
            .filter(|c| *c < u32::MAX)
            .unwrap_or_else(|| panic!("macro registry exhausted while interning '{name}'"));

        let name_sym = self.strings.intern(name);
        let value_sym = value.map(|v| self.strings.intern(v));
        let next_name_id = self.name_ids.len() as u32;
        let name_id = *self.name_ids.entry(name_sym).or_insert(next_name_id);

        let id = MacroIdentity {
            name: name_sym,
            value: value_sym,
            name_id,
            word_index: counter / MACRO_WORD_BITS,
            bit_mask: 1 << (counter % MACRO_WORD_BITS),
        };
        self.by_key.insert(key, id);
        self.by_slot.push(id);

        log::trace!(
            "Interned shader macro '{}' as word {} mask {:#010x}",
            self.define_string(id),
            id.word_index,
            id.bit_mask
        );
        id
    }

    /// Looks up an identity without interning it.
    #[must_use]
    pub fn get(&self, name: &str, value: Option<&str>) -> Option<MacroIdentity> {
        let key = match value {
            Some(value) => self.strings.get(&format!("{name} {value}"))?,
            None => self.strings.get(name)?,
        };
        self.by_key.get(&key).copied()
    }

    /// Resolves a boundary [`MacroRef`] into its canonical identity.
    pub fn resolve(&mut self, macro_ref: MacroRef<'_>) -> MacroIdentity {
        match macro_ref {
            MacroRef::ByName { name, value } => self.intern(name, value),
            MacroRef::ByIdentity(id) => id,
        }
    }

    /// Identity stored at global slot `slot`.
    #[must_use]
    pub fn by_slot(&self, slot: usize) -> Option<MacroIdentity> {
        self.by_slot.get(slot).copied()
    }

    #[must_use]
    pub fn name(&self, id: MacroIdentity) -> &str {
        self.strings.resolve(id.name)
    }

    #[must_use]
    pub fn value(&self, id: MacroIdentity) -> Option<&str> {
        id.value.map(|v| self.strings.resolve(v))
    }

    /// `"NAME"` or `"NAME value"`, the form handed to the compiler.
    #[must_use]
    pub fn define_string(&self, id: MacroIdentity) -> String {
        match self.value(id) {
            Some(value) => format!("{} {value}", self.name(id)),
            None => self.name(id).to_string(),
        }
    }

    /// Lists the identities enabled in `set`, word-major then ascending bit.
    ///
    /// This order is canonical: it is the order macros reach the compiler.
    #[must_use]
    pub fn decode(&self, set: &MacroSet) -> Vec<MacroIdentity> {
        let mut out = Vec::new();
        for (word_index, &word) in set.words().iter().enumerate() {
            let mut bits = word;
            while bits != 0 {
                let bit = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                let slot = word_index * MACRO_WORD_BITS as usize + bit;
                out.extend(self.by_slot(slot));
            }
        }
        out
    }

    /// [`Self::decode`] followed by [`Self::define_string`] on each identity.
    #[must_use]
    pub fn define_strings(&self, set: &MacroSet) -> Vec<String> {
        self.decode(set)
            .into_iter()
            .map(|id| self.define_string(id))
            .collect()
    }

    /// Number of identities interned so far.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_slot.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_slot.is_empty()
    }

    /// Number of distinct macro names (ignoring values).
    #[must_use]
    pub fn name_count(&self) -> usize {
        self.name_ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_idempotent() {
        let mut registry = MacroRegistry::new();
        let a = registry.intern("USE_MAP", None);
        let b = registry.intern("USE_MAP", None);
        assert_eq!(a, b);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn first_identities_fill_word_zero() {
        let mut registry = MacroRegistry::new();
        let a = registry.intern("A", None);
        let b = registry.intern("B", None);
        assert_eq!((a.word_index(), a.bit_mask()), (0, 1));
        assert_eq!((b.word_index(), b.bit_mask()), (0, 2));
    }

    #[test]
    fn slots_map_back_to_identities() {
        let mut registry = MacroRegistry::new();
        let plain = registry.intern("USE_FOG", None);
        let valued = registry.intern("MAX_LIGHTS", Some("4"));

        assert!(!plain.has_value());
        assert!(valued.has_value());
        assert_eq!(registry.by_slot(plain.slot()), Some(plain));
        assert_eq!(registry.by_slot(valued.slot()), Some(valued));
        assert_eq!(registry.by_slot(2), None);
    }

    #[test]
    fn thirty_third_identity_opens_second_word() {
        let mut registry = MacroRegistry::new();
        let ids: Vec<_> = (0..33)
            .map(|i| registry.intern(&format!("MACRO_{i}"), None))
            .collect();

        assert_eq!(ids[31].word_index(), 0);
        assert_eq!(ids[31].bit_mask(), 1 << 31);
        assert_eq!(ids[32].word_index(), 1);
        assert_eq!(ids[32].bit_mask(), 1);
        assert_eq!(ids[32].slot(), 32);
    }

    #[test]
    fn valued_macros_are_distinct_but_share_name_id() {
        let mut registry = MacroRegistry::new();
        let bar = registry.intern("FOO", Some("bar"));
        let baz = registry.intern("FOO", Some("baz"));
        let bare = registry.intern("FOO", None);

        assert_ne!(bar, baz);
        assert_ne!(bar, bare);
        assert_eq!(bar.name_id(), baz.name_id());
        assert_eq!(bar.name_id(), bare.name_id());
        assert_eq!(registry.name_count(), 1);

        assert_eq!(registry.name(bar), "FOO");
        assert_eq!(registry.value(baz), Some("baz"));
        assert_eq!(registry.value(bare), None);
        assert_eq!(registry.define_string(bar), "FOO bar");
    }

    #[test]
    fn get_does_not_intern() {
        let mut registry = MacroRegistry::new();
        assert!(registry.get("MISSING", None).is_none());
        assert!(registry.is_empty());

        let id = registry.intern("PRESENT", Some("1"));
        assert_eq!(registry.get("PRESENT", Some("1")), Some(id));
        assert!(registry.get("PRESENT", None).is_none());
    }

    #[test]
    fn resolve_by_name_and_identity_agree() {
        let mut registry = MacroRegistry::new();
        let by_name = registry.resolve("HAS_UV".into());
        let by_identity = registry.resolve(MacroRef::ByIdentity(by_name));
        let valued = registry.resolve(("ALPHA_MODE", "MASK").into());

        assert_eq!(by_name, by_identity);
        assert_eq!(registry.define_string(valued), "ALPHA_MODE MASK");
    }

    #[test]
    fn decode_is_word_major_bit_minor() {
        let mut registry = MacroRegistry::new();
        let ids: Vec<_> = (0..40)
            .map(|i| registry.intern(&format!("M{i}"), None))
            .collect();

        let mut set = MacroSet::new();
        for i in [35, 3, 33, 0, 31] {
            set.enable(ids[i]);
        }

        let decoded: Vec<_> = registry.decode(&set).iter().map(MacroIdentity::slot).collect();
        assert_eq!(decoded, vec![0, 3, 31, 33, 35]);
        assert_eq!(
            registry.define_strings(&set),
            vec!["M0", "M3", "M31", "M33", "M35"]
        );
    }
}
