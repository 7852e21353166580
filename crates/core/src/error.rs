//! Error types for proptree-core
//!
//! ## Table of Contents
//! 1. PropertyError - Main error enum
//! 2. Result type alias

use crate::tree::NodeId;
use thiserror::Error;

/// Result type alias for property tree operations
pub type Result<T> = std::result::Result<T, PropertyError>;

/// Errors that can occur while building, navigating or mutating a property tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropertyError {
    /// A precondition on an argument was violated (e.g. absent build target)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The node at `index` is not of the requested kind
    #[error("Type mismatch at index {index}: expected {expected}, found {actual}")]
    TypeMismatch {
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },

    /// Index outside of `0..len`
    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Children can only be added to group nodes
    #[error("Node {0} is not a group")]
    NotAGroup(NodeId),

    /// The handle was not issued by this tree
    #[error("Unknown node {0}")]
    UnknownNode(NodeId),

    /// Enum variant name not present in the leaf's variant table
    #[error("Unknown enum variant '{0}'")]
    UnknownVariant(String),

    /// A single field could not be turned into a node; recoverable during builds
    #[error("Failed to create property for field {field}: {reason}")]
    FieldBuild { field: String, reason: String },
}

impl PropertyError {
    /// Shorthand for a per-field build failure
    pub fn field_build(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PropertyError::FieldBuild {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
