//! Custom field attributes understood by the reflection adapter
//!
//! Attach them with Bevy's custom attribute syntax:
//!
//! ```ignore
//! #[derive(Reflect)]
//! struct Player {
//!     #[reflect(@Range { min: 0.0, max: 10.0 })]
//!     #[reflect(@Header("Speed"))]
//!     speed: f32,
//!     #[reflect(@Private)]
//!     #[reflect(@Inspectable)]
//!     notes: String,
//! }
//! ```

use bevy::reflect::{NamedField, Reflect};
use proptree_core::{FieldMeta, Visibility};

/// Inclusive numeric range for float and int leaves
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

/// Display name shown instead of the field name
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct Header(pub &'static str);

/// Display name used when there is no [`Header`]
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct Tooltip(pub &'static str);

/// Always expose the field, even when private or excluded
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct Inspectable;

/// Reflection cannot see Rust visibility; this marks a field as private
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct Private;

/// Collect the adapter attributes of one field
pub fn field_meta(field: &NamedField) -> FieldMeta {
    FieldMeta {
        range: field.get_attribute::<Range>().map(|range| (range.min, range.max)),
        header: field.get_attribute::<Header>().map(|header| header.0.to_string()),
        tooltip: field.get_attribute::<Tooltip>().map(|tooltip| tooltip.0.to_string()),
        inspectable: field.has_attribute::<Inspectable>(),
        visibility: if field.has_attribute::<Private>() {
            Visibility::Private
        } else {
            Visibility::Public
        },
    }
}
