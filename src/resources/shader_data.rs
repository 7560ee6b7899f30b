//! Shader Data
//!
//! A group-tagged value source: uniform values keyed by [`PropertyId`] plus the
//! macros this scope turns on. The renderer keeps one per scene, camera,
//! renderer and material, and uploads each into programs through
//! [`ProgramBinding::upload_group`](crate::renderer::pipeline::ProgramBinding::upload_group).

use rustc_hash::FxHashMap;

use super::macro_registry::{MacroRef, MacroRegistry};
use super::macro_set::MacroSet;
use super::shader_property::{PropertyId, PropertyRegistry, UniformGroup};
use super::uniforms::UniformValue;
use crate::errors::Result;

/// Uniform values and enabled macros of one update scope.
#[derive(Debug, Clone)]
pub struct ShaderData {
    group: UniformGroup,
    values: FxHashMap<PropertyId, UniformValue>,
    macros: MacroSet,
}

impl ShaderData {
    #[must_use]
    pub fn new(group: UniformGroup) -> Self {
        Self {
            group,
            values: FxHashMap::default(),
            macros: MacroSet::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn group(&self) -> UniformGroup {
        self.group
    }

    /// Stores `value` under the property called `name`.
    ///
    /// The first write of a property into any group-tagged data binds the
    /// property to that group.
    pub fn set(
        &mut self,
        properties: &mut PropertyRegistry,
        name: &str,
        value: impl Into<UniformValue>,
    ) -> Result<PropertyId> {
        let id = properties.intern(name);
        self.set_by_id(properties, id, value)?;
        Ok(id)
    }

    /// [`Self::set`] for an already interned property.
    pub fn set_by_id(
        &mut self,
        properties: &mut PropertyRegistry,
        id: PropertyId,
        value: impl Into<UniformValue>,
    ) -> Result<()> {
        properties.assign_group(id, self.group)?;
        self.values.insert(id, value.into());
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: PropertyId) -> Option<&UniformValue> {
        self.values.get(&id)
    }

    pub fn remove(&mut self, id: PropertyId) -> Option<UniformValue> {
        self.values.remove(&id)
    }

    #[inline]
    #[must_use]
    pub fn macros(&self) -> &MacroSet {
        &self.macros
    }

    #[inline]
    pub fn macros_mut(&mut self) -> &mut MacroSet {
        &mut self.macros
    }

    /// Enables a macro given by name or identity.
    pub fn enable_macro<'a>(
        &mut self,
        registry: &mut MacroRegistry,
        macro_ref: impl Into<MacroRef<'a>>,
    ) {
        let id = registry.resolve(macro_ref.into());
        self.macros.enable(id);
    }

    /// Disables a macro given by name or identity.
    pub fn disable_macro<'a>(
        &mut self,
        registry: &mut MacroRegistry,
        macro_ref: impl Into<MacroRef<'a>>,
    ) {
        let id = registry.resolve(macro_ref.into());
        self.macros.disable(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::VariantError;

    #[test]
    fn set_binds_property_group() {
        let mut props = PropertyRegistry::new();
        let mut camera = ShaderData::new(UniformGroup::Camera);

        let id = camera.set(&mut props, "u_cameraPos", glam::Vec3::ONE).unwrap();
        assert_eq!(props.group(id), Some(UniformGroup::Camera));
        assert_eq!(camera.get(id), Some(&UniformValue::Vec3(glam::Vec3::ONE)));
    }

    #[test]
    fn conflicting_group_is_rejected() {
        let mut props = PropertyRegistry::new();
        let mut camera = ShaderData::new(UniformGroup::Camera);
        let mut material = ShaderData::new(UniformGroup::Material);

        camera.set(&mut props, "u_exposure", 1.0_f32).unwrap();
        let err = material.set(&mut props, "u_exposure", 2.0_f32).unwrap_err();
        assert!(matches!(err, VariantError::PropertyGroupConflict { .. }));
        let id = props.get("u_exposure").unwrap();
        assert!(material.get(id).is_none());
    }

    #[test]
    fn macros_by_name_and_identity() {
        let mut registry = MacroRegistry::new();
        let mut material = ShaderData::new(UniformGroup::Material);

        material.enable_macro(&mut registry, "HAS_BASE_TEXTURE");
        material.enable_macro(&mut registry, ("ALPHA_MODE", "MASK"));
        let id = registry.get("HAS_BASE_TEXTURE", None).unwrap();
        assert!(material.macros().is_enabled(id));

        material.disable_macro(&mut registry, id);
        assert!(!material.macros().is_enabled(id));
        assert_eq!(registry.define_strings(material.macros()), vec!["ALPHA_MODE MASK"]);
    }
}
