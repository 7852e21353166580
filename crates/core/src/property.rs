//! Leaf properties
//!
//! ## Table of Contents
//! 1. Numeric leaves (float, int) with advisory ranges
//! 2. Bool and string leaves
//! 3. Enum leaves and the PropertyEnum variant table
//! 4. Action leaves
//! 5. Property sum type and Leaf narrowing

use crate::binding::Binding;
use crate::error::{PropertyError, Result};
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// 1. Numeric leaves
// ============================================================================

/// Float leaf. `min`/`max` are inclusive UI hints and are not enforced on `set`.
#[derive(Debug)]
pub struct FloatProperty {
    min: f32,
    max: f32,
    value: Binding<f32>,
}

impl FloatProperty {
    /// Float leaf owning its value
    pub fn new(min: f32, max: f32, initial: f32) -> Self {
        Self {
            min,
            max,
            value: Binding::owned(initial),
        }
    }

    /// Float leaf adapting external storage
    pub fn bound(
        min: f32,
        max: f32,
        get: impl Fn() -> f32 + Send + Sync + 'static,
        set: impl Fn(f32) + Send + Sync + 'static,
    ) -> Self {
        Self {
            min,
            max,
            value: Binding::bound(get, set),
        }
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn get(&self) -> f32 {
        self.value.get()
    }

    pub fn set(&mut self, value: f32) {
        self.value.set(value);
    }

    pub fn is_owned(&self) -> bool {
        self.value.is_owned()
    }
}

/// Integer leaf. Same advisory range semantics as [`FloatProperty`].
#[derive(Debug)]
pub struct IntProperty {
    min: i32,
    max: i32,
    value: Binding<i32>,
}

impl IntProperty {
    pub fn new(min: i32, max: i32, initial: i32) -> Self {
        Self {
            min,
            max,
            value: Binding::owned(initial),
        }
    }

    pub fn bound(
        min: i32,
        max: i32,
        get: impl Fn() -> i32 + Send + Sync + 'static,
        set: impl Fn(i32) + Send + Sync + 'static,
    ) -> Self {
        Self {
            min,
            max,
            value: Binding::bound(get, set),
        }
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn get(&self) -> i32 {
        self.value.get()
    }

    pub fn set(&mut self, value: i32) {
        self.value.set(value);
    }

    pub fn is_owned(&self) -> bool {
        self.value.is_owned()
    }
}

// ============================================================================
// 2. Bool and string leaves
// ============================================================================

/// Boolean leaf; `BoolProperty::default()` owns a `false`
#[derive(Debug, Default)]
pub struct BoolProperty {
    value: Binding<bool>,
}

impl BoolProperty {
    pub fn new(initial: bool) -> Self {
        Self {
            value: Binding::owned(initial),
        }
    }

    pub fn bound(
        get: impl Fn() -> bool + Send + Sync + 'static,
        set: impl Fn(bool) + Send + Sync + 'static,
    ) -> Self {
        Self {
            value: Binding::bound(get, set),
        }
    }

    pub fn get(&self) -> bool {
        self.value.get()
    }

    pub fn set(&mut self, value: bool) {
        self.value.set(value);
    }

    /// Flip the value and return the new state
    pub fn toggle(&mut self) -> bool {
        let next = !self.get();
        self.set(next);
        next
    }

    pub fn is_owned(&self) -> bool {
        self.value.is_owned()
    }
}

/// String leaf
#[derive(Debug, Default)]
pub struct StringProperty {
    value: Binding<String>,
}

impl StringProperty {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            value: Binding::owned(initial.into()),
        }
    }

    pub fn bound(
        get: impl Fn() -> String + Send + Sync + 'static,
        set: impl Fn(String) + Send + Sync + 'static,
    ) -> Self {
        Self {
            value: Binding::bound(get, set),
        }
    }

    pub fn get(&self) -> String {
        self.value.get()
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value.set(value.into());
    }

    pub fn is_owned(&self) -> bool {
        self.value.is_owned()
    }
}

// ============================================================================
// 3. Enum leaves
// ============================================================================

/// A fieldless enum that can back an [`EnumProperty`].
///
/// `VARIANTS` is the closed conversion table; ordinals are positions in it.
/// Use [`property_enum!`](crate::property_enum) to implement it.
pub trait PropertyEnum: Copy + PartialEq + Send + Sync + 'static {
    const VARIANTS: &'static [Self];

    fn variant_name(self) -> &'static str;

    fn ordinal(self) -> usize {
        Self::VARIANTS.iter().position(|v| *v == self).unwrap_or(0)
    }

    fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::VARIANTS.get(ordinal).copied()
    }

    fn from_variant_name(name: &str) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|v| v.variant_name() == name)
    }

    fn variant_names() -> Vec<String> {
        Self::VARIANTS.iter().map(|v| v.variant_name().to_string()).collect()
    }
}

/// Implement [`PropertyEnum`] for a fieldless enum, listing every variant in order.
///
/// ```ignore
/// property_enum!(WeaponType { Sword, Bow, Staff, Dagger });
/// ```
#[macro_export]
macro_rules! property_enum {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::PropertyEnum for $ty {
            const VARIANTS: &'static [Self] = &[$(Self::$variant),+];

            fn variant_name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                }
            }
        }
    };
}

/// Current value of an enum leaf: ordinal plus name from the variant table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumValue<'a> {
    pub ordinal: usize,
    pub name: &'a str,
}

/// Enum leaf: a tagged ordinal over a closed table of variant names
pub struct EnumProperty {
    variants: Arc<[String]>,
    enum_type: Option<TypeId>,
    type_name: &'static str,
    value: Binding<usize>,
}

impl EnumProperty {
    /// Enum leaf owning a typed value
    pub fn new<E: PropertyEnum>(initial: E) -> Self {
        Self {
            variants: E::variant_names().into(),
            enum_type: Some(TypeId::of::<E>()),
            type_name: std::any::type_name::<E>(),
            value: Binding::owned(initial.ordinal()),
        }
    }

    /// Enum leaf adapting external storage of type `E`
    pub fn bound<E: PropertyEnum>(
        get: impl Fn() -> E + Send + Sync + 'static,
        set: impl Fn(E) + Send + Sync + 'static,
    ) -> Self {
        Self {
            variants: E::variant_names().into(),
            enum_type: Some(TypeId::of::<E>()),
            type_name: std::any::type_name::<E>(),
            value: Binding::bound(
                move || get().ordinal(),
                move |ordinal| {
                    if let Some(variant) = E::from_ordinal(ordinal) {
                        set(variant);
                    }
                },
            ),
        }
    }

    /// Enum leaf over a variant table known only at runtime.
    ///
    /// `get` returns an ordinal into `variants`; `set` receives one.
    pub fn from_table(
        variants: Vec<String>,
        enum_type: Option<TypeId>,
        type_name: &'static str,
        get: impl Fn() -> usize + Send + Sync + 'static,
        set: impl Fn(usize) + Send + Sync + 'static,
    ) -> Self {
        Self {
            variants: variants.into(),
            enum_type,
            type_name,
            value: Binding::bound(get, set),
        }
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Type id of the backing enum, when known
    pub fn enum_type(&self) -> Option<TypeId> {
        self.enum_type
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn ordinal(&self) -> usize {
        self.value.get()
    }

    /// Current value, `None` if the backing storage holds an ordinal outside the table
    pub fn get(&self) -> Option<EnumValue<'_>> {
        let ordinal = self.ordinal();
        self.variants.get(ordinal).map(|name| EnumValue {
            ordinal,
            name: name.as_str(),
        })
    }

    /// Current value converted back to `E`, matched by variant name
    pub fn get_as<E: PropertyEnum>(&self) -> Option<E> {
        if self.enum_type.is_some_and(|t| t != TypeId::of::<E>()) {
            return None;
        }
        self.get().and_then(|value| E::from_variant_name(value.name))
    }

    pub fn set_ordinal(&mut self, ordinal: usize) -> Result<()> {
        if ordinal >= self.variants.len() {
            return Err(PropertyError::IndexOutOfRange {
                index: ordinal,
                len: self.variants.len(),
            });
        }
        self.value.set(ordinal);
        Ok(())
    }

    pub fn set_variant(&mut self, name: &str) -> Result<()> {
        let ordinal = self
            .variants
            .iter()
            .position(|v| v == name)
            .ok_or_else(|| PropertyError::UnknownVariant(name.to_string()))?;
        self.value.set(ordinal);
        Ok(())
    }

    pub fn set_typed<E: PropertyEnum>(&mut self, value: E) -> Result<()> {
        if self.enum_type.is_some_and(|t| t != TypeId::of::<E>()) {
            return Err(PropertyError::InvalidArgument(format!(
                "enum leaf holds {}, not {}",
                self.type_name,
                std::any::type_name::<E>()
            )));
        }
        self.set_variant(value.variant_name())
    }

    pub fn is_owned(&self) -> bool {
        self.value.is_owned()
    }
}

impl fmt::Debug for EnumProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumProperty")
            .field("type_name", &self.type_name)
            .field("variants", &self.variants)
            .field("value", &self.value)
            .finish()
    }
}

// ============================================================================
// 4. Action leaves
// ============================================================================

/// Zero-argument side-effecting command
pub struct ActionProperty {
    action: Box<dyn Fn() + Send + Sync>,
}

impl ActionProperty {
    pub fn new(action: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            action: Box::new(action),
        }
    }

    pub fn execute(&self) {
        (self.action)();
    }
}

impl fmt::Debug for ActionProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ActionProperty")
    }
}

// ============================================================================
// 5. Property sum type
// ============================================================================

/// Every kind of leaf a tree can hold
#[derive(Debug)]
pub enum Property {
    Float(FloatProperty),
    Int(IntProperty),
    Bool(BoolProperty),
    Text(StringProperty),
    Enum(EnumProperty),
    Action(ActionProperty),
}

impl Property {
    /// Stable tag for renderer dispatch and error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Property::Float(_) => FloatProperty::KIND,
            Property::Int(_) => IntProperty::KIND,
            Property::Bool(_) => BoolProperty::KIND,
            Property::Text(_) => StringProperty::KIND,
            Property::Enum(_) => EnumProperty::KIND,
            Property::Action(_) => ActionProperty::KIND,
        }
    }
}

/// Narrowing from [`Property`] to one concrete leaf type, used by `at::<T>()`
pub trait Leaf: Sized {
    const KIND: &'static str;

    fn narrow(property: &Property) -> Option<&Self>;
    fn narrow_mut(property: &mut Property) -> Option<&mut Self>;
}

macro_rules! impl_leaf {
    ($leaf:ident, $variant:ident, $kind:literal) => {
        impl Leaf for $leaf {
            const KIND: &'static str = $kind;

            fn narrow(property: &Property) -> Option<&Self> {
                match property {
                    Property::$variant(leaf) => Some(leaf),
                    _ => None,
                }
            }

            fn narrow_mut(property: &mut Property) -> Option<&mut Self> {
                match property {
                    Property::$variant(leaf) => Some(leaf),
                    _ => None,
                }
            }
        }

        impl From<$leaf> for Property {
            fn from(leaf: $leaf) -> Self {
                Property::$variant(leaf)
            }
        }
    };
}

impl_leaf!(FloatProperty, Float, "float");
impl_leaf!(IntProperty, Int, "int");
impl_leaf!(BoolProperty, Bool, "bool");
impl_leaf!(StringProperty, Text, "string");
impl_leaf!(EnumProperty, Enum, "enum");
impl_leaf!(ActionProperty, Action, "action");

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum WeaponType {
        Sword,
        Bow,
        Staff,
    }

    property_enum!(WeaponType { Sword, Bow, Staff });

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum PlayerState {
        Idle,
        Walking,
    }

    property_enum!(PlayerState { Idle, Walking });

    #[test]
    fn test_range_is_advisory() {
        let mut speed = FloatProperty::new(0.0, 10.0, 5.0);
        speed.set(42.0);
        assert_eq!(speed.get(), 42.0);
        assert_eq!((speed.min(), speed.max()), (0.0, 10.0));
    }

    #[test]
    fn test_bool_toggle() {
        let mut jump = BoolProperty::default();
        assert!(!jump.get());
        assert!(jump.toggle());
        assert!(jump.get());
    }

    #[test]
    fn test_enum_table() {
        assert_eq!(WeaponType::Staff.ordinal(), 2);
        assert_eq!(WeaponType::from_ordinal(1), Some(WeaponType::Bow));
        assert_eq!(WeaponType::from_variant_name("Sword"), Some(WeaponType::Sword));
        assert_eq!(WeaponType::from_variant_name("Axe"), None);
    }

    #[test]
    fn test_enum_property_set_by_name_and_ordinal() {
        let mut weapon = EnumProperty::new(WeaponType::Sword);
        assert_eq!(weapon.get(), Some(EnumValue { ordinal: 0, name: "Sword" }));

        weapon.set_variant("Staff").unwrap();
        assert_eq!(weapon.get_as::<WeaponType>(), Some(WeaponType::Staff));

        weapon.set_ordinal(1).unwrap();
        assert_eq!(weapon.get_as::<WeaponType>(), Some(WeaponType::Bow));

        assert_eq!(
            weapon.set_ordinal(3),
            Err(PropertyError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(
            weapon.set_variant("Axe"),
            Err(PropertyError::UnknownVariant("Axe".to_string()))
        );
    }

    #[test]
    fn test_enum_property_rejects_other_enum_type() {
        let mut weapon = EnumProperty::new(WeaponType::Bow);
        assert!(weapon.set_typed(PlayerState::Walking).is_err());
        assert_eq!(weapon.get_as::<PlayerState>(), None);
        assert_eq!(weapon.get_as::<WeaponType>(), Some(WeaponType::Bow));
    }

    #[test]
    fn test_action_executes() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let run = ActionProperty::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        run.execute();
        run.execute();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_narrowing() {
        let mut property: Property = FloatProperty::new(0.0, 1.0, 0.5).into();
        assert_eq!(property.kind_name(), "float");
        assert!(FloatProperty::narrow(&property).is_some());
        assert!(BoolProperty::narrow(&property).is_none());
        FloatProperty::narrow_mut(&mut property).unwrap().set(0.25);
        assert_eq!(FloatProperty::narrow(&property).unwrap().get(), 0.25);
    }
}
