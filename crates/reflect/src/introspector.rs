//! Property trees over reflected structs

use crate::error::Result;
use crate::schema::reflect_schema;
use bevy::reflect::{Reflect, Typed};
use proptree_core::{BuildOptions, Introspector, Place, PropertyTree, Schema, Shared};
use std::sync::Arc;

/// [`Introspector`] that derives the schema from Bevy reflection instead of [`proptree_core::Inspect`]
#[derive(Debug, Clone, Default)]
pub struct ReflectIntrospector {
    inner: Introspector,
}

impl ReflectIntrospector {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            inner: Introspector::new(options),
        }
    }

    pub fn options(&self) -> &BuildOptions {
        self.inner.options()
    }

    /// Schema for the current state of `target`
    pub fn schema_for<T: Reflect + Typed>(&self, target: &T) -> Result<Schema<T>> {
        reflect_schema(target, self.inner.options().max_depth)
    }

    /// Build a tree named `name` over a reflected struct
    pub fn build<T: Reflect + Typed>(&self, target: &Shared<T>, name: &str) -> Result<PropertyTree> {
        let schema = {
            let guard = target.read();
            self.schema_for(&*guard)?
        };

        let place: Arc<dyn Place<T>> = target.clone();
        let tree = self.inner.build_with_schema(place, &schema, name)?;
        Ok(tree)
    }
}
