//! Field descriptor tables
//!
//! A [`Schema`] lists the inspectable fields of a type: name, declared type,
//! accessor pair and [`FieldMeta`]. Types opt in by implementing [`Inspect`];
//! adapters (e.g. reflection) can also assemble a schema at runtime.
//!
//! ## Table of Contents
//! 1. FieldMeta / Visibility
//! 2. Accessors and FieldKind
//! 3. Field
//! 4. Schema builder
//! 5. Inspect trait and nested objects

use crate::binding::{Place, PlaceExt, Projection};
use crate::error::Result;
use crate::introspector::Introspector;
use crate::property::PropertyEnum;
use crate::tree::PropertyTree;
use bevy::color::Color;
use bevy::math::{Vec2, Vec3};
use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

// ============================================================================
// 1. FieldMeta / Visibility
// ============================================================================

/// Whether a field is accessible from outside its type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// Per-field metadata, resolved once when the schema is assembled
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMeta {
    /// Advisory numeric range for float and int leaves; overrides the build defaults
    pub range: Option<(f64, f64)>,
    pub header: Option<String>,
    pub tooltip: Option<String>,
    /// Explicitly marked for inspection; bypasses the exclusion lists
    pub inspectable: bool,
    pub visibility: Visibility,
}

impl FieldMeta {
    /// Header, else tooltip, else the raw field name
    pub fn display_name<'a>(&'a self, field_name: &'a str) -> &'a str {
        self.header
            .as_deref()
            .or(self.tooltip.as_deref())
            .unwrap_or(field_name)
    }
}

// ============================================================================
// 2. Accessors and FieldKind
// ============================================================================

pub(crate) type Get<T, V> = Arc<dyn Fn(&T) -> V + Send + Sync>;
pub(crate) type Set<T, V> = Arc<dyn Fn(&mut T, V) + Send + Sync>;
/// Presence predicate of an inline group
pub type Present<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Getter/setter pair for a field of type `V` inside `T`
pub struct Accessor<T: ?Sized, V> {
    pub(crate) get: Get<T, V>,
    pub(crate) set: Set<T, V>,
}

impl<T: ?Sized, V> Accessor<T, V> {
    pub fn new(
        get: impl Fn(&T) -> V + Send + Sync + 'static,
        set: impl Fn(&mut T, V) + Send + Sync + 'static,
    ) -> Self {
        Self {
            get: Arc::new(get),
            set: Arc::new(set),
        }
    }

    pub fn get(&self, target: &T) -> V {
        (self.get)(target)
    }

    pub fn set(&self, target: &mut T, value: V) {
        (self.set)(target, value)
    }
}

impl<T: ?Sized, V> Clone for Accessor<T, V> {
    fn clone(&self) -> Self {
        Self {
            get: self.get.clone(),
            set: self.set.clone(),
        }
    }
}

/// Enum field seen as an ordinal into a closed variant table
pub struct EnumAccessor<T: ?Sized> {
    pub(crate) variants: Vec<String>,
    pub(crate) enum_type: Option<TypeId>,
    pub(crate) type_name: &'static str,
    pub(crate) ordinal: Accessor<T, usize>,
}

impl<T: ?Sized> EnumAccessor<T> {
    pub fn new(
        variants: Vec<String>,
        enum_type: Option<TypeId>,
        type_name: &'static str,
        ordinal: Accessor<T, usize>,
    ) -> Self {
        Self {
            variants,
            enum_type,
            type_name,
            ordinal,
        }
    }
}

/// Fields of the same target shown as their own group, optionally only while
/// `present` holds (used for optional values reached by path)
pub struct InlineGroup<T> {
    pub(crate) schema: Schema<T>,
    pub(crate) present: Option<Present<T>>,
}

impl<T> InlineGroup<T> {
    pub fn new(schema: Schema<T>, present: Option<Present<T>>) -> Self {
        Self { schema, present }
    }
}

/// How a field maps onto tree nodes
pub enum FieldKind<T> {
    Float(Accessor<T, f32>),
    Int(Accessor<T, i32>),
    Bool(Accessor<T, bool>),
    Text(Accessor<T, String>),
    Vec2(Accessor<T, Vec2>),
    Vec3(Accessor<T, Vec3>),
    Color(Accessor<T, Color>),
    Enum(EnumAccessor<T>),
    Nested(Box<dyn NestedField<T>>),
    Inline(InlineGroup<T>),
    /// Collections and unrecognized types; never produces a node
    Opaque,
}

impl<T> FieldKind<T> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldKind::Float(_) => "float",
            FieldKind::Int(_) => "int",
            FieldKind::Bool(_) => "bool",
            FieldKind::Text(_) => "string",
            FieldKind::Vec2(_) => "vec2",
            FieldKind::Vec3(_) => "vec3",
            FieldKind::Color(_) => "color",
            FieldKind::Enum(_) => "enum",
            FieldKind::Nested(_) => "nested",
            FieldKind::Inline(_) => "inline",
            FieldKind::Opaque => "opaque",
        }
    }
}

// ============================================================================
// 3. Field
// ============================================================================

/// One schema entry
pub struct Field<T> {
    pub(crate) name: String,
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) kind: FieldKind<T>,
    pub(crate) meta: FieldMeta,
}

impl<T> Field<T> {
    /// Field with an explicit declared type; prefer the typed [`Schema`] helpers
    pub fn new(name: impl Into<String>, type_id: TypeId, type_name: &'static str, kind: FieldKind<T>) -> Self {
        Self {
            name: name.into(),
            type_id,
            type_name,
            kind,
            meta: FieldMeta::default(),
        }
    }

    fn of<V: 'static>(name: impl Into<String>, kind: FieldKind<T>) -> Self {
        Self::new(name, TypeId::of::<V>(), std::any::type_name::<V>(), kind)
    }

    pub fn with_meta(mut self, meta: FieldMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn kind(&self) -> &FieldKind<T> {
        &self.kind
    }

    pub fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    pub fn display_name(&self) -> &str {
        self.meta.display_name(&self.name)
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("kind", &self.kind.kind_name())
            .field("meta", &self.meta)
            .finish()
    }
}

// ============================================================================
// 4. Schema builder
// ============================================================================

/// Ordered field descriptor table for `T`.
///
/// Metadata helpers (`range`, `header`, ...) apply to the most recently added field.
///
/// ```ignore
/// Schema::new()
///     .float("speed", |p: &Player| p.speed, |p, v| p.speed = v)
///     .range(0.0, 10.0)
///     .vec3("position", |p: &Player| p.position, |p, v| p.position = v)
/// ```
pub struct Schema<T> {
    fields: Vec<Field<T>>,
}

impl<T> Default for Schema<T> {
    fn default() -> Self {
        Self { fields: Vec::new() }
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.fields).finish()
    }
}

impl<T: 'static> Schema<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[Field<T>] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Append a prepared field
    pub fn field(mut self, field: Field<T>) -> Self {
        self.fields.push(field);
        self
    }

    pub fn float(
        self,
        name: impl Into<String>,
        get: impl Fn(&T) -> f32 + Send + Sync + 'static,
        set: impl Fn(&mut T, f32) + Send + Sync + 'static,
    ) -> Self {
        self.field(Field::of::<f32>(name, FieldKind::Float(Accessor::new(get, set))))
    }

    pub fn int(
        self,
        name: impl Into<String>,
        get: impl Fn(&T) -> i32 + Send + Sync + 'static,
        set: impl Fn(&mut T, i32) + Send + Sync + 'static,
    ) -> Self {
        self.field(Field::of::<i32>(name, FieldKind::Int(Accessor::new(get, set))))
    }

    pub fn boolean(
        self,
        name: impl Into<String>,
        get: impl Fn(&T) -> bool + Send + Sync + 'static,
        set: impl Fn(&mut T, bool) + Send + Sync + 'static,
    ) -> Self {
        self.field(Field::of::<bool>(name, FieldKind::Bool(Accessor::new(get, set))))
    }

    pub fn string(
        self,
        name: impl Into<String>,
        get: impl Fn(&T) -> String + Send + Sync + 'static,
        set: impl Fn(&mut T, String) + Send + Sync + 'static,
    ) -> Self {
        self.field(Field::of::<String>(name, FieldKind::Text(Accessor::new(get, set))))
    }

    pub fn vec2(
        self,
        name: impl Into<String>,
        get: impl Fn(&T) -> Vec2 + Send + Sync + 'static,
        set: impl Fn(&mut T, Vec2) + Send + Sync + 'static,
    ) -> Self {
        self.field(Field::of::<Vec2>(name, FieldKind::Vec2(Accessor::new(get, set))))
    }

    pub fn vec3(
        self,
        name: impl Into<String>,
        get: impl Fn(&T) -> Vec3 + Send + Sync + 'static,
        set: impl Fn(&mut T, Vec3) + Send + Sync + 'static,
    ) -> Self {
        self.field(Field::of::<Vec3>(name, FieldKind::Vec3(Accessor::new(get, set))))
    }

    pub fn color(
        self,
        name: impl Into<String>,
        get: impl Fn(&T) -> Color + Send + Sync + 'static,
        set: impl Fn(&mut T, Color) + Send + Sync + 'static,
    ) -> Self {
        self.field(Field::of::<Color>(name, FieldKind::Color(Accessor::new(get, set))))
    }

    /// Field of a [`PropertyEnum`] type
    pub fn enumeration<E: PropertyEnum>(
        self,
        name: impl Into<String>,
        get: impl Fn(&T) -> E + Send + Sync + 'static,
        set: impl Fn(&mut T, E) + Send + Sync + 'static,
    ) -> Self {
        let ordinal = Accessor::new(
            move |target: &T| get(target).ordinal(),
            move |target: &mut T, ordinal: usize| {
                if let Some(variant) = E::from_ordinal(ordinal) {
                    set(target, variant);
                }
            },
        );
        self.field(Field::of::<E>(
            name,
            FieldKind::Enum(EnumAccessor {
                variants: E::variant_names(),
                enum_type: Some(TypeId::of::<E>()),
                type_name: std::any::type_name::<E>(),
                ordinal,
            }),
        ))
    }

    /// Enum field whose variant table is only known at runtime
    pub fn enum_table(
        self,
        name: impl Into<String>,
        variants: Vec<String>,
        enum_type: TypeId,
        type_name: &'static str,
        ordinal: Accessor<T, usize>,
    ) -> Self {
        self.field(Field::new(
            name,
            enum_type,
            type_name,
            FieldKind::Enum(EnumAccessor::new(variants, Some(enum_type), type_name, ordinal)),
        ))
    }

    /// Nested object reached through `get`/`get_mut`; `None` means the value
    /// is absent and the field is skipped at build time
    pub fn nested<N: Inspect>(
        self,
        name: impl Into<String>,
        get: impl Fn(&T) -> Option<&N> + Send + Sync + 'static,
        get_mut: impl Fn(&mut T) -> Option<&mut N> + Send + Sync + 'static,
    ) -> Self {
        let nested = NestedObject::<T, N> {
            get: Arc::new(get),
            get_mut: Arc::new(get_mut),
            _marker: PhantomData,
        };
        self.field(Field::of::<N>(name, FieldKind::Nested(Box::new(nested))))
    }

    /// Group of fields over the same target, declared with the type it stands for
    pub fn inline(
        self,
        name: impl Into<String>,
        type_id: TypeId,
        type_name: &'static str,
        schema: Schema<T>,
        present: Option<Present<T>>,
    ) -> Self {
        self.field(Field::new(
            name,
            type_id,
            type_name,
            FieldKind::Inline(InlineGroup::new(schema, present)),
        ))
    }

    /// Field of a type with no property mapping (collections, handles, ...)
    pub fn opaque<V: 'static>(self, name: impl Into<String>) -> Self {
        self.field(Field::of::<V>(name, FieldKind::Opaque))
    }

    // ------------------------------------------------------------------------
    // Metadata for the last field
    // ------------------------------------------------------------------------

    fn with_last(mut self, f: impl FnOnce(&mut FieldMeta)) -> Self {
        if let Some(field) = self.fields.last_mut() {
            f(&mut field.meta);
        }
        self
    }

    pub fn range(self, min: f64, max: f64) -> Self {
        self.with_last(|meta| meta.range = Some((min, max)))
    }

    pub fn header(self, header: impl Into<String>) -> Self {
        let header = header.into();
        self.with_last(|meta| meta.header = Some(header))
    }

    pub fn tooltip(self, tooltip: impl Into<String>) -> Self {
        let tooltip = tooltip.into();
        self.with_last(|meta| meta.tooltip = Some(tooltip))
    }

    /// Explicitly mark the field for inspection
    pub fn inspectable(self) -> Self {
        self.with_last(|meta| meta.inspectable = true)
    }

    pub fn private(self) -> Self {
        self.with_last(|meta| meta.visibility = Visibility::Private)
    }
}

// ============================================================================
// 5. Inspect trait and nested objects
// ============================================================================

/// Types that publish a field descriptor table
pub trait Inspect: Sized + Send + Sync + 'static {
    fn schema() -> Schema<Self>;
}

/// Type-erased nested object field of `T`
pub trait NestedField<T>: Send + Sync {
    /// Build the nested group below `place`, or `Ok(None)` when the value is absent
    fn build(
        &self,
        introspector: &Introspector,
        place: Arc<dyn Place<T>>,
        name: &str,
        depth: usize,
    ) -> Result<Option<PropertyTree>>;
}

type ProjectRef<T, N> = Arc<dyn Fn(&T) -> Option<&N> + Send + Sync>;
type ProjectMut<T, N> = Arc<dyn Fn(&mut T) -> Option<&mut N> + Send + Sync>;

struct NestedObject<T, N> {
    get: ProjectRef<T, N>,
    get_mut: ProjectMut<T, N>,
    _marker: PhantomData<fn() -> N>,
}

impl<T: 'static, N: Inspect> NestedField<T> for NestedObject<T, N> {
    fn build(
        &self,
        introspector: &Introspector,
        place: Arc<dyn Place<T>>,
        name: &str,
        depth: usize,
    ) -> Result<Option<PropertyTree>> {
        let child: Arc<dyn Place<N>> =
            Arc::new(Projection::new(place, self.get.clone(), self.get_mut.clone()));
        if !child.is_present() {
            return Ok(None);
        }
        introspector
            .build_group(child, &N::schema(), name, depth)
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Player {
        speed: f32,
        tags: Vec<String>,
    }

    #[test]
    fn test_display_name_precedence() {
        let mut meta = FieldMeta::default();
        assert_eq!(meta.display_name("speed"), "speed");
        meta.tooltip = Some("Movement speed".into());
        assert_eq!(meta.display_name("speed"), "Movement speed");
        meta.header = Some("Speed".into());
        assert_eq!(meta.display_name("speed"), "Speed");
    }

    #[test]
    fn test_metadata_applies_to_last_field() {
        let schema = Schema::<Player>::new()
            .float("speed", |p: &Player| p.speed, |p: &mut Player, v| p.speed = v)
            .range(0.0, 10.0)
            .header("Speed")
            .opaque::<Vec<String>>("tags")
            .private()
            .inspectable();

        let fields = schema.fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].meta().range, Some((0.0, 10.0)));
        assert_eq!(fields[0].display_name(), "Speed");
        assert_eq!(fields[0].type_id(), TypeId::of::<f32>());
        assert_eq!(fields[1].meta().visibility, Visibility::Private);
        assert!(fields[1].meta().inspectable);
        assert_eq!(fields[1].kind().kind_name(), "opaque");
    }

    #[test]
    fn test_metadata_on_empty_schema_is_ignored() {
        let schema = Schema::<Player>::new().range(0.0, 1.0).header("Nothing");
        assert!(schema.is_empty());
    }

    #[test]
    fn test_accessor_reads_and_writes() {
        let accessor = Accessor::new(|p: &Player| p.speed, |p: &mut Player, v| p.speed = v);
        let mut player = Player { speed: 1.0, tags: Vec::new() };
        accessor.set(&mut player, 3.0);
        assert_eq!(accessor.get(&player), 3.0);
        assert!(player.tags.is_empty());
    }
}
