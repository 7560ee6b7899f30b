//! Variant Cache
//!
//! Maps a [`MacroSet`] to the program compiled for it, one cache per shader
//! pass. The cache is a tree of `FxHashMap`s whose depth equals the longest
//! macro set seen so far: level `i` is keyed by word `i` of the set (or `0`
//! past the set's length) and the last level holds the programs.
//!
//! # Growth
//!
//! When a longer set arrives the tree deepens. Every cached program moves down
//! under a chain of `0` keys, which is exactly the path a set whose extra
//! words are all zero takes, so earlier entries stay reachable.
//!
//! # Two-phase miss
//!
//! [`VariantCache::get`] returns either the cached program or a
//! [`PendingVariant`] pointing at the empty slot. The pending token borrows the
//! cache mutably until [`PendingVariant::cache`] consumes it, so only one miss
//! can be outstanding and nothing can be cached without a prior miss.
//!
//! Failed compilations are cached like successful ones (negative caching);
//! the cache never looks inside the stored value.

use std::collections::hash_map::{Entry, VacantEntry};

use rustc_hash::FxHashMap;

use crate::resources::macro_set::MacroSet;

enum Level<P> {
    Branch(FxHashMap<u32, Level<P>>),
    Leaves(FxHashMap<u32, P>),
}

impl<P> Level<P> {
    fn empty(leaf: bool) -> Self {
        if leaf {
            Level::Leaves(FxHashMap::default())
        } else {
            Level::Branch(FxHashMap::default())
        }
    }

    /// Pushes every leaf `extra` levels down under `0` keys.
    fn deepen(self, extra: usize) -> Self {
        match self {
            Level::Branch(children) => Level::Branch(
                children
                    .into_iter()
                    .map(|(key, child)| (key, child.deepen(extra)))
                    .collect(),
            ),
            Level::Leaves(leaves) => Level::Branch(
                leaves
                    .into_iter()
                    .map(|(key, program)| (key, Self::zero_chain(program, extra)))
                    .collect(),
            ),
        }
    }

    fn zero_chain(program: P, levels: usize) -> Self {
        if levels == 1 {
            Level::Leaves(std::iter::once((0, program)).collect())
        } else {
            Level::Branch(std::iter::once((0, Self::zero_chain(program, levels - 1))).collect())
        }
    }

    fn drain_into(self, release: &mut impl FnMut(P)) {
        match self {
            Level::Branch(children) => {
                for child in children.into_values() {
                    child.drain_into(release);
                }
            }
            Level::Leaves(leaves) => leaves.into_values().for_each(&mut *release),
        }
    }

    fn count(&self) -> usize {
        match self {
            Level::Branch(children) => children.values().map(Level::count).sum(),
            Level::Leaves(leaves) => leaves.len(),
        }
    }
}

/// Result of [`VariantCache::get`].
pub enum VariantLookup<'a, P> {
    /// The program cached for this set (valid or not).
    Hit(&'a mut P),
    /// No program yet; resolve with [`PendingVariant::cache`].
    Miss(PendingVariant<'a, P>),
}

/// Slot remembered by a cache miss.
pub struct PendingVariant<'a, P> {
    slot: VacantEntry<'a, u32, P>,
}

impl<'a, P> PendingVariant<'a, P> {
    /// Stores `program` for the set that missed and returns it.
    pub fn cache(self, program: P) -> &'a mut P {
        self.slot.insert(program)
    }
}

/// Per-pass cache of compiled programs keyed by macro set.
pub struct VariantCache<P> {
    root: Level<P>,
    depth: usize,
}

impl<P> Default for VariantCache<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> VariantCache<P> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Level::empty(true),
            depth: 1,
        }
    }

    /// Number of words the tree is keyed on.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of cached programs, invalid ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up the program for `set`.
    pub fn get(&mut self, set: &MacroSet) -> VariantLookup<'_, P> {
        if set.word_len() > self.depth {
            self.grow(set.word_len());
        }

        let last = self.depth - 1;
        let mut level = &mut self.root;
        for i in 0..last {
            let Level::Branch(children) = level else {
                unreachable!("variant cache level {i} must be a branch");
            };
            level = children
                .entry(set.word_or_zero(i))
                .or_insert_with(|| Level::empty(i + 1 == last));
        }

        let Level::Leaves(leaves) = level else {
            unreachable!("variant cache level {last} must hold leaves");
        };
        match leaves.entry(set.word_or_zero(last)) {
            Entry::Occupied(entry) => VariantLookup::Hit(entry.into_mut()),
            Entry::Vacant(slot) => VariantLookup::Miss(PendingVariant { slot }),
        }
    }

    fn grow(&mut self, depth: usize) {
        log::debug!("Variant cache deepening from {} to {depth} words", self.depth);
        let root = std::mem::replace(&mut self.root, Level::empty(true));
        self.root = root.deepen(depth - self.depth);
        self.depth = depth;
    }

    /// Hands every cached program to `release` and empties the cache.
    pub fn destroy(self, mut release: impl FnMut(P)) {
        self.root.drain_into(&mut release);
    }
}
