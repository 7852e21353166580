//! Error types for proptree-reflect
//!
//! ## Table of Contents
//! 1. ReflectAdapterError - Main error enum
//! 2. Result type alias

use proptree_core::PropertyError;
use thiserror::Error;

/// Result type alias for reflection adapter operations
pub type Result<T> = std::result::Result<T, ReflectAdapterError>;

/// Errors raised while deriving a schema from reflection data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReflectAdapterError {
    /// Only named-field structs can be introspected
    #[error("Type {0} does not reflect as a struct")]
    NotAStruct(&'static str),

    /// A generated reflection path does not resolve on the live value
    #[error("Reflection path '{path}' failed: {reason}")]
    Path { path: String, reason: String },

    /// Enums must be unit-only (or `Option` of a struct)
    #[error("Field {field} has unsupported enum type {type_path}")]
    UnsupportedEnum {
        field: String,
        type_path: &'static str,
    },

    /// Nested structs deeper than the configured limit
    #[error("Field {field} nests deeper than {limit} levels")]
    DepthLimit { field: String, limit: usize },

    /// Error from the core tree builder
    #[error(transparent)]
    Core(#[from] PropertyError),
}
