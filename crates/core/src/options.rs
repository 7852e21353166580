//! Build options for the object introspector
//!
//! Deserializable from a `[build]`-style TOML table; every key is optional.
//!
//! ```toml
//! exclude_field_names = ["debugNotes"]
//! allow_nested_objects = true
//! default_float_max = 10.0
//! max_depth = 8
//! ```

use bevy::ecs::entity::Entity;
use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::collections::HashSet;

/// Default nesting limit for nested object groups
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Controls which fields the introspector exposes and the ranges it assigns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Raw field names never exposed (unless explicitly marked inspectable)
    pub exclude_field_names: HashSet<String>,
    /// Declared field types never exposed (unless explicitly marked inspectable).
    /// Type identities are process-local, so this set is not serialized.
    #[serde(skip, default = "default_exclude_types")]
    pub exclude_types: HashSet<TypeId>,
    /// Recurse into nested objects; when false they are skipped entirely
    pub allow_nested_objects: bool,
    pub default_float_min: f32,
    pub default_float_max: f32,
    pub default_int_min: i32,
    pub default_int_max: i32,
    /// Nested groups deeper than this fail to build (cyclic object graphs)
    pub max_depth: usize,
}

fn default_exclude_types() -> HashSet<TypeId> {
    HashSet::from([TypeId::of::<Entity>()])
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            exclude_field_names: HashSet::new(),
            exclude_types: default_exclude_types(),
            allow_nested_objects: true,
            default_float_min: 0.0,
            default_float_max: 1.0,
            default_int_min: 0,
            default_int_max: 100,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl BuildOptions {
    pub fn exclude_field(mut self, name: impl Into<String>) -> Self {
        self.exclude_field_names.insert(name.into());
        self
    }

    pub fn exclude_type<T: 'static>(mut self) -> Self {
        self.exclude_types.insert(TypeId::of::<T>());
        self
    }

    pub fn with_nested_objects(mut self, allow: bool) -> Self {
        self.allow_nested_objects = allow;
        self
    }

    pub fn with_float_range(mut self, min: f32, max: f32) -> Self {
        self.default_float_min = min;
        self.default_float_max = max;
        self
    }

    pub fn with_int_range(mut self, min: i32, max: i32) -> Self {
        self.default_int_min = min;
        self.default_int_max = max;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn is_field_excluded(&self, name: &str) -> bool {
        self.exclude_field_names.contains(name)
    }

    pub fn is_type_excluded(&self, type_id: TypeId) -> bool {
        self.exclude_types.contains(&type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = BuildOptions::default();
        assert!(options.allow_nested_objects);
        assert_eq!((options.default_float_min, options.default_float_max), (0.0, 1.0));
        assert_eq!((options.default_int_min, options.default_int_max), (0, 100));
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
        assert!(options.is_type_excluded(TypeId::of::<Entity>()));
        assert!(!options.is_type_excluded(TypeId::of::<f32>()));
    }

    #[test]
    fn test_builder_setters() {
        let options = BuildOptions::default()
            .exclude_field("secret")
            .exclude_type::<String>()
            .with_nested_objects(false)
            .with_float_range(-1.0, 1.0)
            .with_max_depth(2);

        assert!(options.is_field_excluded("secret"));
        assert!(!options.is_field_excluded("Secret"));
        assert!(options.is_type_excluded(TypeId::of::<String>()));
        assert!(!options.allow_nested_objects);
        assert_eq!(options.default_float_min, -1.0);
        assert_eq!(options.max_depth, 2);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let options: BuildOptions = toml::from_str(
            r#"
            exclude_field_names = ["debugNotes"]
            default_int_max = 10
            "#,
        )
        .unwrap();

        assert!(options.is_field_excluded("debugNotes"));
        assert_eq!(options.default_int_max, 10);
        assert_eq!(options.default_float_max, 1.0);
        assert!(options.allow_nested_objects);
        assert!(options.is_type_excluded(TypeId::of::<Entity>()));
    }
}
