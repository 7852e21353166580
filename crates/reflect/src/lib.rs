//! # proptree-reflect
//!
//! Bevy Reflect adapter for proptree: derives a `proptree_core::Schema` from
//! `#[derive(Reflect)]` structs so no hand-written `Inspect` impl is needed.
//!
//! ## Table of Contents
//! 1. Error types (`error`)
//! 2. Field attributes (`attributes`)
//! 3. Schema generation (`schema`)
//! 4. Introspector (`introspector`)

mod attributes;
mod error;
mod introspector;
mod schema;

pub use attributes::*;
pub use error::*;
pub use introspector::*;
pub use schema::*;
