//! # proptree-core
//!
//! Hierarchical property trees over live object state, for editor-style
//! inspectors and search bars.
//!
//! ## Features
//! - `PropertyTree`: arena of named groups and typed leaves with parent links
//! - Leaf family: float, int, bool, string, enum and action leaves, each either
//!   owning its value or bound to external storage
//! - `PathResolver`: exact, prefix and `*`-wildcard lookup over dotted paths
//! - `Introspector`: builds a tree over a live object from its `Schema`
//!
//! ## Table of Contents
//! 1. Error types (`error`)
//! 2. Value storage (`binding`)
//! 3. Leaf properties (`property`)
//! 4. Tree (`tree`)
//! 5. Path lookup (`resolver`)
//! 6. Field schemas (`schema`)
//! 7. Build options (`options`)
//! 8. Introspector (`introspector`)

mod binding;
mod error;
mod introspector;
mod options;
mod property;
mod resolver;
mod schema;
mod tree;

pub use binding::*;
pub use error::*;
pub use introspector::*;
pub use options::*;
pub use property::*;
pub use resolver::*;
pub use schema::*;
pub use tree::*;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::binding::{shared, Place, PlaceExt, Shared};
    pub use crate::error::{PropertyError, Result};
    pub use crate::introspector::{Introspector, DEFAULT_ROOT_NAME};
    pub use crate::options::BuildOptions;
    pub use crate::property::{
        ActionProperty, BoolProperty, EnumProperty, FloatProperty, IntProperty, Property,
        PropertyEnum, StringProperty,
    };
    pub use crate::property_enum;
    pub use crate::resolver::{PathResolver, SearchQuery};
    pub use crate::schema::{Inspect, Schema};
    pub use crate::tree::{NodeId, PropertyTree};
}
