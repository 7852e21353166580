//! Schema generation from Bevy reflection data
//!
//! Fields are classified from the static [`TypeInfo`] of the target type, so
//! optional structs that are currently `None` still get a schema. Each leaf
//! accessor reads and writes through a reflection path such as
//! `stats.speed` or `companion.0.speed`; when the live value is available the
//! path is probed once up front.
//!
//! ## Table of Contents
//! 1. Entry point
//! 2. Struct walking
//! 3. Field classification
//! 4. Path accessors

use crate::attributes::field_meta;
use crate::error::{ReflectAdapterError, Result};
use bevy::color::Color;
use bevy::math::{Vec2, Vec3};
use bevy::reflect::{
    DynamicEnum, DynamicVariant, EnumInfo, GetPath, NamedField, PartialReflect, Reflect,
    ReflectRef, StructInfo, TypeInfo, Typed, VariantInfo,
};
use proptree_core::{Accessor, EnumAccessor, Field, FieldKind, InlineGroup, Present, Schema};
use std::any::TypeId;
use std::sync::Arc;

// ============================================================================
// 1. Entry point
// ============================================================================

/// Derive a [`Schema`] for `T` from its reflection data.
///
/// `target` is the live value used to probe generated paths. Fields that
/// cannot be mapped are logged and left out; only a non-struct `T` fails.
pub fn reflect_schema<T: Reflect + Typed>(target: &T, max_depth: usize) -> Result<Schema<T>> {
    let TypeInfo::Struct(info) = T::type_info() else {
        return Err(ReflectAdapterError::NotAStruct(std::any::type_name::<T>()));
    };

    let walker = Walker { max_depth };
    Ok(walker.struct_schema(info, Some(target), "", 0))
}

// ============================================================================
// 2. Struct walking
// ============================================================================

struct Walker {
    max_depth: usize,
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

impl Walker {
    /// Schema over the fields of the struct at `prefix`. `live` is the root
    /// value while that struct is known to be present.
    fn struct_schema<T: Reflect>(
        &self,
        info: &'static StructInfo,
        live: Option<&T>,
        prefix: &str,
        depth: usize,
    ) -> Schema<T> {
        let mut schema = Schema::new();

        for named in info.iter() {
            let path = join_path(prefix, named.name());
            match self.field(named, live, &path, depth) {
                Ok(field) => schema = schema.field(field),
                Err(e) => {
                    tracing::warn!("Failed to map reflected field {}: {}", path, e);
                }
            }
        }

        schema
    }

    // ========================================================================
    // 3. Field classification
    // ========================================================================

    fn field<T: Reflect>(
        &self,
        named: &'static NamedField,
        live: Option<&T>,
        path: &str,
        depth: usize,
    ) -> Result<Field<T>> {
        let type_id = named.type_id();

        let kind = if type_id == TypeId::of::<f32>() {
            FieldKind::Float(leaf::<T, f32>(live, path)?)
        } else if type_id == TypeId::of::<i32>() {
            FieldKind::Int(leaf::<T, i32>(live, path)?)
        } else if type_id == TypeId::of::<bool>() {
            FieldKind::Bool(leaf::<T, bool>(live, path)?)
        } else if type_id == TypeId::of::<String>() {
            FieldKind::Text(leaf::<T, String>(live, path)?)
        } else if type_id == TypeId::of::<Vec2>() {
            FieldKind::Vec2(leaf::<T, Vec2>(live, path)?)
        } else if type_id == TypeId::of::<Vec3>() {
            FieldKind::Vec3(leaf::<T, Vec3>(live, path)?)
        } else if type_id == TypeId::of::<Color>() {
            FieldKind::Color(leaf::<T, Color>(live, path)?)
        } else {
            match named.type_info() {
                Some(TypeInfo::Enum(info)) => self.enum_field(named, info, live, path, depth)?,
                Some(TypeInfo::Struct(info)) => {
                    self.check_depth(named, depth)?;
                    let schema = self.struct_schema(info, live, path, depth + 1);
                    FieldKind::Inline(InlineGroup::new(schema, None))
                }
                _ => FieldKind::Opaque,
            }
        };

        Ok(Field::new(named.name(), type_id, named.type_path(), kind).with_meta(field_meta(named)))
    }

    fn enum_field<T: Reflect>(
        &self,
        named: &'static NamedField,
        info: &'static EnumInfo,
        live: Option<&T>,
        path: &str,
        depth: usize,
    ) -> Result<FieldKind<T>> {
        if let Some(inner) = optional_struct(info) {
            self.check_depth(named, depth)?;
            let some_path = format!("{}.0", path);
            let probe_path = some_path.clone();
            let present: Present<T> =
                Arc::new(move |target: &T| target.reflect_path(probe_path.as_str()).is_ok());
            let live = live.filter(|&target| present(target));
            let schema = self.struct_schema(inner, live, &some_path, depth + 1);
            return Ok(FieldKind::Inline(InlineGroup::new(schema, Some(present))));
        }

        if !info.iter().all(|variant| matches!(variant, VariantInfo::Unit(_))) {
            return Err(ReflectAdapterError::UnsupportedEnum {
                field: named.name().to_string(),
                type_path: named.type_path(),
            });
        }

        if let Some(target) = live {
            probe_enum(target, path)?;
        }

        let variants: Vec<String> = info.variant_names().iter().map(|name| name.to_string()).collect();
        let ordinal = enum_accessor::<T>(path, variants.clone());
        Ok(FieldKind::Enum(EnumAccessor::new(
            variants,
            Some(named.type_id()),
            named.type_path(),
            ordinal,
        )))
    }

    fn check_depth(&self, named: &NamedField, depth: usize) -> Result<()> {
        if depth >= self.max_depth {
            return Err(ReflectAdapterError::DepthLimit {
                field: named.name().to_string(),
                limit: self.max_depth,
            });
        }
        Ok(())
    }
}

/// `Option<S>` where `S` is a named-field struct
fn optional_struct(info: &'static EnumInfo) -> Option<&'static StructInfo> {
    if info.variant_len() != 2 || !matches!(info.variant("None"), Some(VariantInfo::Unit(_))) {
        return None;
    }
    let Some(VariantInfo::Tuple(some)) = info.variant("Some") else {
        return None;
    };
    if some.field_len() != 1 {
        return None;
    }
    match some.field_at(0)?.type_info()? {
        TypeInfo::Struct(inner) => Some(inner),
        _ => None,
    }
}

// ============================================================================
// 4. Path accessors
// ============================================================================

fn path_error(path: &str, reason: impl ToString) -> ReflectAdapterError {
    ReflectAdapterError::Path {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

/// Probe `path` on the live value (when present) and build its accessor pair
fn leaf<T: Reflect, V: Reflect + Clone + Default>(live: Option<&T>, path: &str) -> Result<Accessor<T, V>> {
    if let Some(target) = live {
        target.path::<V>(path).map_err(|e| path_error(path, e))?;
    }

    let read = path.to_string();
    let write = path.to_string();
    Ok(Accessor::new(
        move |target: &T| target.path::<V>(read.as_str()).cloned().unwrap_or_default(),
        move |target: &mut T, value: V| match target.path_mut::<V>(write.as_str()) {
            Ok(slot) => *slot = value,
            Err(e) => tracing::warn!("Failed to write reflected path {}: {}", write, e),
        },
    ))
}

fn probe_enum<T: Reflect>(target: &T, path: &str) -> Result<()> {
    let value = target.reflect_path(path).map_err(|e| path_error(path, e))?;
    match value.reflect_ref() {
        ReflectRef::Enum(_) => Ok(()),
        _ => Err(path_error(path, "value is not an enum")),
    }
}

fn variant_index(value: &dyn PartialReflect) -> usize {
    match value.reflect_ref() {
        ReflectRef::Enum(e) => e.variant_index(),
        _ => 0,
    }
}

/// Ordinal accessor for a unit-only enum; writes apply a dynamic unit variant
fn enum_accessor<T: Reflect>(path: &str, variants: Vec<String>) -> Accessor<T, usize> {
    let read = path.to_string();
    let write = path.to_string();
    Accessor::new(
        move |target: &T| {
            target
                .reflect_path(read.as_str())
                .map(variant_index)
                .unwrap_or_default()
        },
        move |target: &mut T, ordinal: usize| {
            let Some(variant) = variants.get(ordinal) else {
                return;
            };
            let patch = DynamicEnum::new(variant.clone(), DynamicVariant::Unit);
            match target.reflect_path_mut(write.as_str()) {
                Ok(value) => {
                    if let Err(e) = value.try_apply(&patch) {
                        tracing::warn!("Failed to set {} to {}: {}", write, variant, e);
                    }
                }
                Err(e) => tracing::warn!("Failed to write reflected path {}: {}", write, e),
            }
        },
    )
}
