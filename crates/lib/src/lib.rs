//!
//! Deepmap: nested key-value trees addressed by single keys or key paths.
//! This library provides one container type that serves flat mappings and
//! arbitrarily deep hierarchies at the same time.
//!
//! ## Core Concepts
//!
//! * **Nodes (`node::Node`)**: The container itself. An ordered key-value
//!   mapping whose values may be nested nodes, with every node tracking its
//!   parent, the key it is stored under, and the root of its tree.
//! * **Auto-vivification**: Looking up a missing key creates an empty child
//!   node on demand, so deep layouts can be built without declaring the
//!   intermediate levels first.
//! * **Addresses (`address::Address`)**: A sequence of keys leading from a
//!   root to a node or leaf. Path operations such as `get_path` and
//!   `set_path` resolve one level per segment.
//! * **Locking (`node::LockState`)**: A tri-state flag switching a subtree
//!   between vivifying and strict mapping behavior. Children inherit the
//!   nearest explicit ancestor state and may override it either way.
//! * **Values (`value::Value`)**: The tagged leaf-or-node type stored in
//!   entries, with conversions from primitives and JSON.
//! * **Traversal (`iter`)**: Lazy, non-recursive iterators over direct
//!   entries, every leaf with its address, or every nested node.
//!
//! ## Example
//!
//! ```
//! use deepmap::Node;
//!
//! let config = Node::new();
//! config.set_path(["server", "host"], "localhost")?;
//! config.set_path(["server", "port"], 8080)?;
//! config.set("debug", true)?;
//!
//! assert_eq!(config.get_path(["server", "host"])?, "localhost");
//!
//! let server = config.get_node("server")?;
//! assert_eq!(server.address().to_string(), "server");
//! assert_eq!(server.depth(), 1);
//! # Ok::<(), deepmap::Error>(())
//! ```

pub mod address;
mod de;
pub mod errors;
pub mod iter;
pub mod node;
mod ser;
pub mod value;

pub use address::Address;
pub use errors::NodeError;
pub use node::{LockState, Node};
pub use value::Value;

/// Result type used throughout the Deepmap library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Deepmap library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured node errors from lookups, mutations, locking, and linkage
    #[error(transparent)]
    Node(NodeError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Node(_) => "node",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a missing key on a locked node.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Node(node_err) => node_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates a mutation rejected by an effective lock.
    pub fn is_locked(&self) -> bool {
        match self {
            Error::Node(node_err) => node_err.is_locked(),
            _ => false,
        }
    }

    /// Check if this error indicates an empty key path.
    pub fn is_empty_path(&self) -> bool {
        match self {
            Error::Node(node_err) => node_err.is_empty_path(),
            _ => false,
        }
    }

    /// Check if this error is type-related.
    pub fn is_type_error(&self) -> bool {
        match self {
            Error::Node(node_err) => node_err.is_type_mismatch(),
            _ => false,
        }
    }

    /// Check if this error indicates a rejected self-containing attachment.
    pub fn is_cycle(&self) -> bool {
        match self {
            Error::Node(node_err) => node_err.is_cycle(),
            _ => false,
        }
    }

    /// Check if this error is a JSON serialization failure.
    pub fn is_serialization_error(&self) -> bool {
        matches!(self, Error::Serialize(_))
    }
}
