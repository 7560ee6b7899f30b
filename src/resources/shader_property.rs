//! Shader Properties
//!
//! Uniform names are interned into [`PropertyId`]s once, and every property
//! remembers which [`UniformGroup`] supplies its value. The group is learned
//! the first time a value for the property is written into a group-tagged
//! [`ShaderData`](super::shader_data::ShaderData); programs compiled before that
//! moment hold the uniform as ungrouped and move it later (see
//! [`PropertyRegistry::version`]).

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VariantError};
use crate::utils::interner::{Interner, Symbol, symbol_index};

/// Update scope of a uniform.
///
/// Ordered broadest first; uploads within a draw follow this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UniformGroup {
    Scene,
    Camera,
    Renderer,
    Material,
    /// Uniforms whose property has no known group yet.
    Ungrouped,
}

impl UniformGroup {
    /// Number of groups, `Ungrouped` included.
    pub const COUNT: usize = 5;

    /// All groups in upload order.
    pub const ALL: [UniformGroup; Self::COUNT] = [
        UniformGroup::Scene,
        UniformGroup::Camera,
        UniformGroup::Renderer,
        UniformGroup::Material,
        UniformGroup::Ungrouped,
    ];

    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Interned uniform property name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId(Symbol);

impl PropertyId {
    /// Dense index, usable for side tables.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        symbol_index(self.0)
    }
}

/// Strips the `[0]` suffix drivers append to array uniform names.
#[must_use]
pub fn normalize_uniform_name(name: &str) -> &str {
    name.strip_suffix("[0]").unwrap_or(name)
}

/// Property name table plus the property → group assignment.
#[derive(Debug, Default)]
pub struct PropertyRegistry {
    names: Interner,
    groups: Vec<Option<UniformGroup>>,
    version: u64,
}

impl PropertyRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a uniform name. Array names (`foo[0]`) map to `foo`.
    pub fn intern(&mut self, name: &str) -> PropertyId {
        let id = PropertyId(self.names.intern(normalize_uniform_name(name)));
        if self.groups.len() <= id.index() {
            self.groups.resize(id.index() + 1, None);
        }
        id
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<PropertyId> {
        self.names
            .get(normalize_uniform_name(name))
            .map(PropertyId)
    }

    #[must_use]
    pub fn name(&self, id: PropertyId) -> &str {
        self.names.resolve(id.0)
    }

    #[must_use]
    pub fn group(&self, id: PropertyId) -> Option<UniformGroup> {
        self.groups.get(id.index()).copied().flatten()
    }

    /// Binds `id` to `group`.
    ///
    /// The first assignment wins. Re-assigning the same group is a no-op;
    /// a different group is a [`VariantError::PropertyGroupConflict`].
    /// `Ungrouped` never binds anything.
    pub fn assign_group(&mut self, id: PropertyId, group: UniformGroup) -> Result<()> {
        if group == UniformGroup::Ungrouped {
            return Ok(());
        }
        match self.group(id) {
            None => {
                self.groups[id.index()] = Some(group);
                self.version = self.version.wrapping_add(1);
                log::debug!("Shader property '{}' bound to {group:?}", self.name(id));
                Ok(())
            }
            Some(existing) if existing == group => Ok(()),
            Some(existing) => Err(VariantError::PropertyGroupConflict {
                name: self.name(id).to_string(),
                existing,
                requested: group,
            }),
        }
    }

    /// Incremented each time a property acquires a group.
    ///
    /// Programs compare it against the value they last regrouped at.
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
