//! Error types for node operations.
//!
//! This module defines structured error types for the nested container,
//! covering missing keys, lock violations, malformed paths, and attachments
//! that would corrupt the tree shape.

use thiserror::Error;

/// Structured error types for node operations.
///
/// Every failure raises immediately at the point of violation; there are no
/// retries and no recovery attempts. Multi-level operations are not
/// transactional: levels auto-created before a failure stay in place.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum NodeError {
    /// Lookup of a missing key on an effectively locked node
    #[error("missing key '{key}' on locked node")]
    KeyNotFound { key: String },

    /// Mutation attempted on an effectively locked node
    #[error("node at '{address}' is locked")]
    Locked { address: String },

    /// An empty path was supplied to a path-aware operation
    #[error("empty path")]
    EmptyPath,

    /// A path segment resolved to a leaf value that cannot be traversed
    #[error("key '{key}' holds a value of type {actual}, not a nested node")]
    NotANode { key: String, actual: String },

    /// A value could not be converted to the requested type
    #[error("type mismatch: expected {expected}, found {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Attaching the node would make it an ancestor of itself
    #[error("cannot attach node under '{key}': the node would contain itself")]
    Cycle { key: String },
}

impl NodeError {
    /// Check if this error is a missing-key lookup failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, NodeError::KeyNotFound { .. })
    }

    /// Check if this error is a lock violation
    pub fn is_locked(&self) -> bool {
        matches!(self, NodeError::Locked { .. })
    }

    /// Check if this error was caused by an empty path
    pub fn is_empty_path(&self) -> bool {
        matches!(self, NodeError::EmptyPath)
    }

    /// Check if this error is type-related (untraversable segment or failed conversion)
    pub fn is_type_mismatch(&self) -> bool {
        matches!(
            self,
            NodeError::NotANode { .. } | NodeError::TypeMismatch { .. }
        )
    }

    /// Check if this error is a rejected cyclic attachment
    pub fn is_cycle(&self) -> bool {
        matches!(self, NodeError::Cycle { .. })
    }

    /// Get the key if this is a key-related error
    pub fn key(&self) -> Option<&str> {
        match self {
            NodeError::KeyNotFound { key }
            | NodeError::NotANode { key, .. }
            | NodeError::Cycle { key } => Some(key),
            _ => None,
        }
    }
}

// Conversion from NodeError to the main Error type
impl From<NodeError> for crate::Error {
    fn from(err: NodeError) -> Self {
        crate::Error::Node(err)
    }
}
