//! Path resolution over nested nodes.
//!
//! Multi-segment operations reuse the scalar operations one level at a time:
//! a path walks from the starting node through one child per segment, and the
//! final segment is handled by the matching scalar call on the node it landed
//! on. Read-style descent creates missing intermediates exactly like a scalar
//! lookup would; removal and membership never create anything.

use crate::{Result, Value, errors::NodeError};

use super::Node;

impl Node {
    /// Gets the value at a key path, creating missing levels on the way.
    ///
    /// Present segments resolve without a lock check; a missing segment is
    /// created only if the node it would be created on is effectively
    /// unlocked, failing with `KeyNotFound` otherwise. A leaf value in a
    /// non-final position fails with a type error. The empty path is
    /// rejected.
    ///
    /// ```
    /// # use deepmap::Node;
    /// let tree = Node::new();
    /// tree.set_path(["a", "b", "c"], 1)?;
    ///
    /// assert_eq!(tree.get_path(["a", "b", "c"])?, 1);
    /// // Single-segment paths behave exactly like scalar access
    /// assert_eq!(tree.get_path(["a"])?, tree.get("a")?);
    /// # Ok::<(), deepmap::Error>(())
    /// ```
    pub fn get_path<S: AsRef<str>>(&self, path: impl IntoIterator<Item = S>) -> Result<Value> {
        let segments: Vec<S> = path.into_iter().collect();
        let Some((last, prefix)) = segments.split_last() else {
            return Err(NodeError::EmptyPath.into());
        };
        let parent = self.descend_or_create(prefix.iter().map(AsRef::as_ref))?;
        parent.get(last.as_ref())
    }

    /// Sets a value at a key path, creating missing levels on the way.
    ///
    /// Every node the path traverses must be effectively unlocked, including
    /// the starting node; the first locked one fails the call with `Locked`
    /// and nothing past it is created. Returns the replaced value if any.
    ///
    /// ```
    /// # use deepmap::Node;
    /// let tree = Node::new();
    /// tree.set_path(["servers", "alpha", "port"], 8080)?;
    ///
    /// let alpha = tree.get_node("servers")?.get_node("alpha")?;
    /// assert_eq!(alpha.get("port")?, 8080);
    /// # Ok::<(), deepmap::Error>(())
    /// ```
    pub fn set_path<S: AsRef<str>>(
        &self,
        path: impl IntoIterator<Item = S>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>> {
        let segments: Vec<S> = path.into_iter().collect();
        let Some((last, prefix)) = segments.split_last() else {
            return Err(NodeError::EmptyPath.into());
        };
        let parent = self.descend_for_update(prefix.iter().map(AsRef::as_ref))?;
        parent.set(last.as_ref(), value)
    }

    /// Removes the entry at a key path, detaching a node occupant.
    ///
    /// Never creates intermediates: a missing segment anywhere along the path
    /// is `Ok(None)`. The starting node and the node holding the final
    /// segment must both be effectively unlocked.
    pub fn remove_path<S: AsRef<str>>(
        &self,
        path: impl IntoIterator<Item = S>,
    ) -> Result<Option<Value>> {
        let segments: Vec<S> = path.into_iter().collect();
        let Some((last, prefix)) = segments.split_last() else {
            return Err(NodeError::EmptyPath.into());
        };
        if self.locked() {
            return Err(NodeError::Locked {
                address: self.address().to_string(),
            }
            .into());
        }
        match self.descend_strict(prefix.iter().map(AsRef::as_ref))? {
            Some(parent) => parent.remove(last.as_ref()),
            None => Ok(None),
        }
    }

    /// Returns true if a value exists at the key path. Never vivifies.
    ///
    /// A missing segment yields `Ok(false)`; a leaf value in a non-final
    /// position is still a type error, since the path shape itself is wrong.
    ///
    /// ```
    /// # use deepmap::Node;
    /// let tree = Node::new();
    /// tree.set_path(["a", "b"], 1)?;
    ///
    /// assert!(tree.contains_path(["a", "b"])?);
    /// assert!(!tree.contains_path(["a", "x"])?);
    /// assert!(!tree.contains_path(["x", "b"])?);
    /// assert!(tree.contains_path(["a", "b", "c"]).is_err());
    /// # Ok::<(), deepmap::Error>(())
    /// ```
    pub fn contains_path<S: AsRef<str>>(&self, path: impl IntoIterator<Item = S>) -> Result<bool> {
        let segments: Vec<S> = path.into_iter().collect();
        let Some((last, prefix)) = segments.split_last() else {
            return Err(NodeError::EmptyPath.into());
        };
        match self.descend_strict(prefix.iter().map(AsRef::as_ref))? {
            Some(parent) => Ok(parent.contains_key(last.as_ref())),
            None => Ok(false),
        }
    }

    /// Walks one child per segment, creating missing ones.
    fn descend_or_create<'a>(&self, segments: impl Iterator<Item = &'a str>) -> Result<Node> {
        let mut current = self.clone();
        for segment in segments {
            current = current.step_or_create(segment)?;
        }
        Ok(current)
    }

    /// Walks one child per segment for a mutation, requiring every traversed
    /// node to be effectively unlocked.
    fn descend_for_update<'a>(&self, segments: impl Iterator<Item = &'a str>) -> Result<Node> {
        let mut current = self.clone();
        for segment in segments {
            if current.locked() {
                return Err(NodeError::Locked {
                    address: current.address().to_string(),
                }
                .into());
            }
            current = current.step_or_create(segment)?;
        }
        Ok(current)
    }

    /// Walks one child per segment without creating anything.
    fn descend_strict<'a>(&self, segments: impl Iterator<Item = &'a str>) -> Result<Option<Node>> {
        let mut current = self.clone();
        for segment in segments {
            match current.try_get(segment) {
                Some(Value::Node(next)) => current = next,
                Some(other) => {
                    return Err(NodeError::NotANode {
                        key: segment.to_string(),
                        actual: other.type_name().to_string(),
                    }
                    .into());
                }
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Resolves a single path step through an existing or new child node.
    fn step_or_create(&self, segment: &str) -> Result<Node> {
        match self.try_get(segment) {
            Some(Value::Node(next)) => Ok(next),
            Some(other) => Err(NodeError::NotANode {
                key: segment.to_string(),
                actual: other.type_name().to_string(),
            }
            .into()),
            None => self.vivify(segment),
        }
    }
}
