//! Shader Macro Set
//!
//! A growable multi-word bitset over [`MacroIdentity`] bits. One set exists per
//! scope that toggles macros (scene, camera, renderer, material, and the
//! per-draw scratch set the renderer unions them into).
//!
//! # Length semantics
//!
//! Only the first [`MacroSet::len`] words belong to the set. Words past the
//! length may hold stale bits from earlier use; they are ignored everywhere.
//! [`MacroSet::disable`] shrinks the length by a single step when the topmost
//! word empties, so the length is an upper bound on the meaningful words, not
//! always a tight one. All comparisons therefore pad with zeros instead of
//! comparing the raw word arrays.

use std::hash::{Hash, Hasher};

use smallvec::SmallVec;

use super::macro_registry::MacroIdentity;

/// Growable bitset of enabled shader macros.
#[derive(Debug, Clone, Default)]
pub struct MacroSet {
    words: SmallVec<[u32; 4]>,
    length: usize,
}

impl MacroSet {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables `id`.
    pub fn enable(&mut self, id: MacroIdentity) {
        let index = id.word_index();
        if index + 1 > self.length {
            if self.words.len() <= index {
                self.words.resize(index + 1, 0);
            }
            for word in &mut self.words[self.length..index] {
                *word = 0;
            }
            self.words[index] = id.bit_mask();
            self.length = index + 1;
        } else {
            self.words[index] |= id.bit_mask();
        }
    }

    /// Disables `id`. Shrinks the length by one if the top word empties.
    pub fn disable(&mut self, id: MacroIdentity) {
        let index = id.word_index();
        if index >= self.length {
            return;
        }
        let word = self.words[index] & !id.bit_mask();
        self.words[index] = word;
        if word == 0 && index + 1 == self.length {
            self.length -= 1;
        }
    }

    #[inline]
    #[must_use]
    pub fn is_enabled(&self, id: MacroIdentity) -> bool {
        let index = id.word_index();
        index < self.length && self.words[index] & id.bit_mask() != 0
    }

    /// Adds every macro of `other`.
    pub fn union_with(&mut self, other: &MacroSet) {
        let length = self.length.max(other.length);
        if self.words.len() < length {
            self.words.resize(length, 0);
        }
        for i in 0..length {
            self.words[i] = self.word_or_zero(i) | other.word_or_zero(i);
        }
        self.length = length;
    }

    /// Keeps only the macros also present in `other`.
    pub fn intersect_with(&mut self, other: &MacroSet) {
        let length = self.length.min(other.length);
        for i in (0..length).rev() {
            self.words[i] &= other.words[i];
        }
        self.length = length;
        while self.length > 0 && self.words[self.length - 1] == 0 {
            self.length -= 1;
        }
    }

    /// Removes every macro present in `other`.
    pub fn complement_with(&mut self, other: &MacroSet) {
        let shared = self.length.min(other.length);
        for i in (0..shared).rev() {
            let word = self.words[i] & !other.words[i];
            self.words[i] = word;
            if word == 0 && i + 1 == self.length {
                self.length -= 1;
            }
        }
    }

    /// Writes `left ∪ right` into `out`, reusing `out`'s buffer.
    pub fn union_into(left: &MacroSet, right: &MacroSet, out: &mut MacroSet) {
        let length = left.length.max(right.length);
        if out.words.len() < length {
            out.words.resize(length, 0);
        }
        for i in 0..length {
            out.words[i] = left.word_or_zero(i) | right.word_or_zero(i);
        }
        out.length = length;
    }

    /// Empties the set. The word buffer is kept for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.length = 0;
    }

    /// Number of words logically in the set, not the number of macros.
    ///
    /// Disabling a macro can leave trailing zero words behind, so a set may
    /// report a non-zero length and still be [`is_empty`](Self::is_empty).
    #[inline]
    #[must_use]
    pub fn word_len(&self) -> usize {
        self.length
    }

    /// `true` when no macro is enabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words().iter().all(|w| *w == 0)
    }

    /// The words logically in the set.
    #[inline]
    #[must_use]
    pub fn words(&self) -> &[u32] {
        &self.words[..self.length]
    }

    /// Word `index`, or `0` past the logical length.
    #[inline]
    #[must_use]
    pub fn word_or_zero(&self, index: usize) -> u32 {
        if index < self.length {
            self.words[index]
        } else {
            0
        }
    }

    /// Length with trailing zero words removed.
    fn tight_len(&self) -> usize {
        self.words()
            .iter()
            .rposition(|w| *w != 0)
            .map_or(0, |i| i + 1)
    }
}

impl PartialEq for MacroSet {
    fn eq(&self, other: &Self) -> bool {
        let length = self.length.max(other.length);
        (0..length).all(|i| self.word_or_zero(i) == other.word_or_zero(i))
    }
}

impl Eq for MacroSet {}

impl Hash for MacroSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.words[..self.tight_len()].hash(state);
    }
}

impl FromIterator<MacroIdentity> for MacroSet {
    fn from_iter<I: IntoIterator<Item = MacroIdentity>>(iter: I) -> Self {
        let mut set = MacroSet::new();
        for id in iter {
            set.enable(id);
        }
        set
    }
}
