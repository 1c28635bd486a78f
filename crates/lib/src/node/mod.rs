//! The nested node type and its core operations.
//!
//! This module provides [`Node`], the mapping-plus-tree entity the crate is
//! built around. A node behaves like an ordinary key-value mapping, but any
//! entry may itself be a node, and every node knows its parent, the key it is
//! stored under, and the root of its tree. Lookups on missing keys create the
//! child on demand unless the node is effectively locked.
//!
//! # Design
//!
//! - A `Node` is a cheap handle (`Rc<RefCell<_>>`). Cloning it yields another
//!   handle to the same node, so trees can be navigated and mutated without
//!   threading `&mut` through every caller. Content comparison is
//!   `PartialEq`; identity comparison is [`Node::ptr_eq`].
//! - The parent's entry map is the only owning edge. Children hold weak
//!   back-references, cleared whenever a node leaves its parent, so detached
//!   subtrees become free-standing trees and nothing leaks.
//! - Every operation that has to walk the tree (lock resolution, address and
//!   root queries, teardown) does so iteratively, so tree depth is bounded by
//!   memory rather than the call stack.
//!
//! # Usage
//!
//! ```
//! use deepmap::Node;
//!
//! let tree = Node::new();
//! tree.set("name", "Alice")?;
//! tree.set_path(["user", "profile", "bio"], "Software developer")?;
//!
//! assert_eq!(tree.get_path(["user", "profile", "bio"])?, "Software developer");
//!
//! // Intermediate levels were created on demand
//! let profile = tree.get_node("user")?.get_node("profile")?;
//! assert_eq!(profile.address().to_string(), "user.profile");
//! # Ok::<(), deepmap::Error>(())
//! ```

use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

use indexmap::IndexMap;
use tracing::{trace, warn};

use crate::{Result, Value, errors::NodeError, value::json_type_name};

mod resolve;

/// Tri-state lock flag controlling auto-vivification and mutation.
///
/// The effective lock of a node is its own state unless that state is
/// `Inherit`, in which case the parent chain is consulted; a root with
/// `Inherit` is unlocked. Locking is a semantic switch between vivifying and
/// strict mapping behavior, not a concurrency primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockState {
    /// Defer to the parent chain (unlocked at the root)
    #[default]
    Inherit,
    /// Explicitly locked, regardless of ancestors
    Locked,
    /// Explicitly unlocked, regardless of ancestors
    Unlocked,
}

/// Shared node state behind the handle.
struct Inner {
    /// Direct entries in insertion order; the sole owning edge to children
    entries: IndexMap<String, Value>,
    /// Non-owning back-reference to the enclosing node
    parent: Option<Weak<RefCell<Inner>>>,
    /// Lazily filled cache of the tree root, dropped whenever the node moves
    root: Option<Weak<RefCell<Inner>>>,
    /// Key this node is stored under in its parent
    key: Option<String>,
    lock: LockState,
}

/// A nested associative container addressed by keys or key paths.
///
/// `Node` is a flat mapping that transparently supports deep layouts: a
/// missing key resolves to a freshly created child node unless the node is
/// effectively locked, and multi-segment paths navigate (and create) one
/// level per segment. Entries keep insertion order.
///
/// # Core Operations
///
/// - Scalar access: [`get`](Node::get), [`try_get`](Node::try_get),
///   [`set`](Node::set), [`remove`](Node::remove),
///   [`contains_key`](Node::contains_key)
/// - Path access: [`get_path`](Node::get_path), [`set_path`](Node::set_path),
///   [`remove_path`](Node::remove_path),
///   [`contains_path`](Node::contains_path)
/// - Tree position: [`parent`](Node::parent), [`key`](Node::key),
///   [`root`](Node::root), [`address`](Node::address), [`depth`](Node::depth)
/// - Locking: [`locked`](Node::locked), [`lock`](Node::lock),
///   [`unlock`](Node::unlock)
/// - Traversal: [`iter`](Node::iter), [`walk`](Node::walk),
///   [`containers`](Node::containers)
///
/// # Examples
///
/// ## Auto-vivification
///
/// ```
/// # use deepmap::Node;
/// let tree = Node::new();
/// let child = tree.get_node("missing")?;
///
/// // The same node is returned on every subsequent lookup
/// assert!(Node::ptr_eq(&child, &tree.get_node("missing")?));
/// # Ok::<(), deepmap::Error>(())
/// ```
///
/// ## Locking
///
/// ```
/// # use deepmap::Node;
/// let tree = Node::new();
/// tree.set("present", 1)?;
/// tree.lock();
///
/// assert_eq!(tree.get("present")?, 1);
/// assert!(tree.get("absent").is_err());
/// assert!(tree.set("other", 2).is_err());
/// # Ok::<(), deepmap::Error>(())
/// ```
#[derive(Clone)]
pub struct Node {
    inner: Rc<RefCell<Inner>>,
}

impl Node {
    /// Creates a new empty root node.
    pub fn new() -> Self {
        Node {
            inner: Rc::new(RefCell::new(Inner {
                entries: IndexMap::new(),
                parent: None,
                root: None,
                key: None,
                lock: LockState::Inherit,
            })),
        }
    }

    /// Returns true if both handles refer to the same node.
    pub fn ptr_eq(a: &Node, b: &Node) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    /// Returns the number of direct entries.
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Returns true if this node has no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    /// Returns true if the node contains the given key. Never vivifies.
    pub fn contains_key(&self, key: impl AsRef<str>) -> bool {
        self.inner.borrow().entries.contains_key(key.as_ref())
    }

    /// Returns the stored value, or `None` if the key is absent.
    ///
    /// Unlike [`get`](Node::get) this never creates a child and never fails.
    pub fn try_get(&self, key: impl AsRef<str>) -> Option<Value> {
        self.inner.borrow().entries.get(key.as_ref()).cloned()
    }

    /// Gets the value stored under `key`, creating an empty child node if the
    /// key is missing.
    ///
    /// For a stored node this returns a handle to the identical node, not a
    /// copy. A missing key on an effectively locked node fails with
    /// `KeyNotFound` and leaves the node unmodified.
    pub fn get(&self, key: impl AsRef<str>) -> Result<Value> {
        let key = key.as_ref();
        if let Some(value) = self.try_get(key) {
            return Ok(value);
        }
        self.vivify(key).map(Value::Node)
    }

    /// Gets the node stored under `key`, creating it if the key is missing.
    ///
    /// Fails with a type error if the key holds a leaf value.
    pub fn get_node(&self, key: impl AsRef<str>) -> Result<Node> {
        let key = key.as_ref();
        match self.get(key)? {
            Value::Node(node) => Ok(node),
            other => Err(NodeError::NotANode {
                key: key.to_string(),
                actual: other.type_name().to_string(),
            }
            .into()),
        }
    }

    /// Gets a value by key with automatic type conversion.
    ///
    /// Returns `None` if the key is absent or the stored value cannot be
    /// converted. Never vivifies.
    ///
    /// ```
    /// # use deepmap::Node;
    /// let node = Node::new().with("age", 30);
    /// assert_eq!(node.get_as::<i64>("age"), Some(30));
    /// assert_eq!(node.get_as::<String>("age"), None);
    /// assert_eq!(node.get_as::<i64>("missing"), None);
    /// ```
    pub fn get_as<T>(&self, key: impl AsRef<str>) -> Option<T>
    where
        T: TryFrom<Value, Error = NodeError>,
    {
        let value = self.try_get(key)?;
        T::try_from(value).ok()
    }

    /// Sets a value under `key`, returning the replaced value if any.
    ///
    /// Fails with `Locked` if this node is effectively locked. Storing
    /// [`Value::Deleted`] removes the key instead (a no-op when absent). A
    /// node value is re-parented here: it leaves its previous parent, and an
    /// old node occupant of the key is detached with its subtree intact.
    /// Attaching a node under its own descendant fails with `Cycle`.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<Option<Value>> {
        let key = key.into();
        let value = value.into();
        if self.locked() {
            return Err(NodeError::Locked {
                address: self.address().to_string(),
            }
            .into());
        }
        if value.is_deleted() {
            return Ok(self.take_entry(&key));
        }
        self.insert_entry(key, value)
    }

    /// Removes and returns the entry under `key`, detaching a node occupant.
    ///
    /// Fails with `Locked` if this node is effectively locked; an absent key
    /// is `Ok(None)`.
    pub fn remove(&self, key: impl AsRef<str>) -> Result<Option<Value>> {
        let key = key.as_ref();
        if self.locked() {
            return Err(NodeError::Locked {
                address: self.address().to_string(),
            }
            .into());
        }
        Ok(self.take_entry(key))
    }

    /// Removes all entries, detaching node occupants.
    ///
    /// Fails with `Locked` if this node is effectively locked.
    pub fn clear(&self) -> Result<()> {
        if self.locked() {
            return Err(NodeError::Locked {
                address: self.address().to_string(),
            }
            .into());
        }
        let removed: Vec<Value> = {
            let mut inner = self.inner.borrow_mut();
            inner.entries.drain(..).map(|(_, value)| value).collect()
        };
        for value in &removed {
            if let Value::Node(child) = value {
                child.leave_parent();
            }
        }
        Ok(())
    }

    /// Returns the effective lock of this node.
    ///
    /// A node with an explicit state uses it; `Inherit` defers to the parent
    /// chain, and a root with `Inherit` is unlocked.
    pub fn locked(&self) -> bool {
        let mut current = self.clone();
        loop {
            match current.lock_state() {
                LockState::Locked => return true,
                LockState::Unlocked => return false,
                LockState::Inherit => match current.parent() {
                    Some(parent) => current = parent,
                    None => return false,
                },
            }
        }
    }

    /// Locks this node explicitly. Descendants without their own explicit
    /// state inherit the lock.
    pub fn lock(&self) {
        self.inner.borrow_mut().lock = LockState::Locked;
    }

    /// Unlocks this node explicitly, overriding any locked ancestor.
    pub fn unlock(&self) {
        self.inner.borrow_mut().lock = LockState::Unlocked;
    }

    /// Returns this node's own tri-state lock flag (not the effective lock).
    pub fn lock_state(&self) -> LockState {
        self.inner.borrow().lock
    }

    /// Sets this node's lock flag directly.
    ///
    /// `LockState::Inherit` clears an explicit lock or unlock, so the node
    /// follows its ancestors again.
    pub fn set_lock_state(&self, state: LockState) {
        self.inner.borrow_mut().lock = state;
    }

    /// Returns the parent node, or `None` for a root or detached node.
    pub fn parent(&self) -> Option<Node> {
        let inner = self.inner.borrow();
        let parent = inner.parent.as_ref()?.upgrade()?;
        Some(Node { inner: parent })
    }

    /// Returns the key this node is stored under, or `None` for a root.
    pub fn key(&self) -> Option<String> {
        self.inner.borrow().key.clone()
    }

    /// Returns true if this node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// Returns true if no direct entry is a nested node.
    pub fn is_leaf(&self) -> bool {
        !self
            .inner
            .borrow()
            .entries
            .values()
            .any(|value| matches!(value, Value::Node(_)))
    }

    /// Returns the root of the tree this node belongs to.
    ///
    /// The result is cached on every node along the walked chain; caches are
    /// dropped whenever a subtree moves.
    pub fn root(&self) -> Node {
        {
            let inner = self.inner.borrow();
            if let Some(cached) = inner.root.as_ref().and_then(Weak::upgrade) {
                return Node { inner: cached };
            }
        }
        let mut chain = Vec::new();
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            chain.push(current);
            current = parent;
        }
        let root = current;
        let weak = Rc::downgrade(&root.inner);
        for node in &chain {
            node.inner.borrow_mut().root = Some(weak.clone());
        }
        root
    }

    /// Returns the keys leading from the root to this node; empty for roots.
    pub fn address(&self) -> crate::Address {
        let mut segments = Vec::new();
        let mut current = self.clone();
        while let Some((parent, key)) = current.linked_parent() {
            segments.push(key);
            current = parent;
        }
        segments.reverse();
        segments.into_iter().collect()
    }

    /// Returns the number of levels between this node and its root.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Converts this subtree to a JSON value using the shallow-items form.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Converts this subtree to a JSON string using the shallow-items form.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Builds a node tree mirroring an arbitrary nested JSON object.
    ///
    /// Every JSON object becomes a node (empty objects included), scalars map
    /// to the matching leaf variants, and arrays are kept as opaque
    /// [`Value::Json`] leaves. Fails with a type error when `source` is not
    /// an object.
    ///
    /// ```
    /// # use deepmap::Node;
    /// let source = serde_json::json!({"a": {"aa": 1}, "b": 2});
    /// let tree = Node::wrap(&source)?;
    /// assert_eq!(tree.get_path(["a", "aa"])?, 1);
    /// # Ok::<(), deepmap::Error>(())
    /// ```
    pub fn wrap(source: &serde_json::Value) -> Result<Node> {
        match source {
            serde_json::Value::Object(entries) => Ok(Node::from_json_map(entries)),
            other => Err(NodeError::TypeMismatch {
                expected: "object".to_string(),
                actual: json_type_name(other).to_string(),
            }
            .into()),
        }
    }

    /// Builds a fresh tree from a JSON object map with a depth-first walk.
    pub(crate) fn from_json_map(entries: &serde_json::Map<String, serde_json::Value>) -> Node {
        let root = Node::new();
        let mut stack: Vec<(Node, serde_json::map::Iter)> = vec![(root.clone(), entries.iter())];
        while !stack.is_empty() {
            let top = stack.len() - 1;
            match stack[top].1.next() {
                None => {
                    stack.pop();
                }
                Some((key, serde_json::Value::Object(map))) => {
                    let child = Node::new();
                    stack[top]
                        .0
                        .store_entry(key.clone(), Value::Node(child.clone()));
                    stack.push((child, map.iter()));
                }
                Some((key, leaf)) => {
                    stack[top].0.store_entry(key.clone(), Value::from(leaf));
                }
            }
        }
        root
    }

    /// Builder method to seed an entry and return self.
    ///
    /// Seeding runs the usual attach hooks but not the lock check, matching
    /// construction-time initialization. An entry that cannot be attached
    /// (it would contain itself) is discarded with a warning.
    pub fn with(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Err(error) = self.insert_entry(key.into(), value.into()) {
            warn!(error = %error, "Discarding builder entry");
        }
        self
    }

    /// Builder method to set the lock flag and return self.
    pub fn with_lock_state(self, state: LockState) -> Self {
        self.set_lock_state(state);
        self
    }

    /// Creates an empty child, stores it under `key`, and attaches it.
    ///
    /// Fails with `KeyNotFound` when this node is effectively locked.
    fn vivify(&self, key: &str) -> Result<Node> {
        if self.locked() {
            return Err(NodeError::KeyNotFound {
                key: key.to_string(),
            }
            .into());
        }
        trace!(key = %key, "Auto-creating child for missing key");
        let child = Node::new();
        {
            self.inner
                .borrow_mut()
                .entries
                .insert(key.to_string(), Value::Node(child.clone()));
        }
        child.join_parent(self, key);
        Ok(child)
    }

    /// Inserts an entry with full attach/detach hooks but no lock check.
    pub(crate) fn insert_entry(&self, key: String, value: Value) -> Result<Option<Value>> {
        if let Value::Node(child) = &value {
            self.ensure_no_cycle(&key, child)?;
        }
        Ok(self.store_entry(key, value))
    }

    /// The raw storage step shared by every insertion.
    ///
    /// Keeps the linkage invariants: the incoming node leaves its previous
    /// slot, a replaced node occupant is detached, and the incoming node is
    /// attached under `key`. Callers are responsible for lock and cycle
    /// checks.
    fn store_entry(&self, key: String, value: Value) -> Option<Value> {
        let incoming = value.as_node();
        if let Some(child) = &incoming {
            child.release_previous_slot(self, &key);
        }
        let old = {
            self.inner.borrow_mut().entries.insert(key.clone(), value)
        };
        if let Some(Value::Node(previous)) = &old {
            let same = incoming
                .as_ref()
                .is_some_and(|child| Node::ptr_eq(child, previous));
            if !same {
                previous.leave_parent();
            }
        }
        if let Some(child) = &incoming {
            child.join_parent(self, &key);
        }
        old
    }

    /// Removes an entry without a lock check, detaching a node occupant.
    fn take_entry(&self, key: &str) -> Option<Value> {
        let old = { self.inner.borrow_mut().entries.shift_remove(key) };
        if let Some(Value::Node(child)) = &old {
            child.leave_parent();
        }
        old
    }

    /// Records this node as a child of `parent` under `key`.
    fn join_parent(&self, parent: &Node, key: &str) {
        let root = parent.root();
        self.invalidate_root_caches();
        {
            let mut inner = self.inner.borrow_mut();
            inner.parent = Some(Rc::downgrade(&parent.inner));
            inner.key = Some(key.to_string());
            inner.root = Some(Rc::downgrade(&root.inner));
        }
        trace!(key = %key, "Joined parent node");
    }

    /// Clears this node's linkage, leaving its subtree intact.
    fn leave_parent(&self) {
        self.invalidate_root_caches();
        let key = {
            let mut inner = self.inner.borrow_mut();
            inner.parent = None;
            inner.root = None;
            inner.key.take()
        };
        if let Some(key) = key {
            trace!(key = %key, "Left parent node");
        }
    }

    /// Removes this node from its current parent's entries, unless that slot
    /// is exactly the one about to be overwritten.
    fn release_previous_slot(&self, target: &Node, target_key: &str) {
        if let Some((old_parent, old_key)) = self.linked_parent() {
            if Node::ptr_eq(&old_parent, target) && old_key == target_key {
                return;
            }
            let _removed = { old_parent.inner.borrow_mut().entries.shift_remove(&old_key) };
        }
    }

    /// Rejects attaching `candidate` under this node when the result would
    /// contain itself.
    fn ensure_no_cycle(&self, key: &str, candidate: &Node) -> Result<()> {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            if Node::ptr_eq(&node, candidate) {
                return Err(NodeError::Cycle {
                    key: key.to_string(),
                }
                .into());
            }
            current = node.parent();
        }
        Ok(())
    }

    /// Drops the cached root on this node and every descendant.
    fn invalidate_root_caches(&self) {
        let mut stack = vec![self.clone()];
        while let Some(node) = stack.pop() {
            let mut inner = node.inner.borrow_mut();
            inner.root = None;
            for value in inner.entries.values() {
                if let Value::Node(child) = value {
                    stack.push(child.clone());
                }
            }
        }
    }

    /// Returns the parent and key together, or `None` when either is unset.
    fn linked_parent(&self) -> Option<(Node, String)> {
        let inner = self.inner.borrow();
        let parent = inner.parent.as_ref()?.upgrade()?;
        let key = inner.key.clone()?;
        Some((Node { inner: parent }, key))
    }

    /// Returns a clone of the entry at `index` in insertion order.
    pub(crate) fn entry_at(&self, index: usize) -> Option<(String, Value)> {
        self.inner
            .borrow()
            .entries
            .get_index(index)
            .map(|(key, value)| (key.clone(), value.clone()))
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        // Dismantle the subtree with a worklist so teardown never recurses
        // through arbitrarily deep child chains.
        if self.entries.is_empty() {
            return;
        }
        let mut worklist: Vec<Value> = self
            .entries
            .drain(..)
            .map(|(_, value)| value)
            .filter(Value::is_node)
            .collect();
        while let Some(value) = worklist.pop() {
            if let Value::Node(node) = value {
                let Node { inner } = node;
                if let Ok(cell) = Rc::try_unwrap(inner) {
                    let mut child = cell.into_inner();
                    worklist.extend(
                        child
                            .entries
                            .drain(..)
                            .map(|(_, value)| value)
                            .filter(Value::is_node),
                    );
                }
            }
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for (key, value) in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{key}: {value}")?;
            first = false;
        }
        write!(f, "}}")
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({self})")
    }
}

impl PartialEq for Node {
    /// Content equality over shallow items, descending through child nodes.
    /// Key order does not matter; use [`Node::ptr_eq`] for identity.
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self.clone(), other.clone())];
        while let Some((left, right)) = pending.pop() {
            if Node::ptr_eq(&left, &right) {
                continue;
            }
            if left.len() != right.len() {
                return false;
            }
            let mut index = 0;
            while let Some((key, left_value)) = left.entry_at(index) {
                index += 1;
                let Some(right_value) = right.try_get(&key) else {
                    return false;
                };
                match (&left_value, &right_value) {
                    (Value::Node(a), Value::Node(b)) => pending.push((a.clone(), b.clone())),
                    _ => {
                        if left_value != right_value {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }
}

impl FromIterator<(String, Value)> for Node {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let node = Node::new();
        for (key, value) in iter {
            if let Err(error) = node.insert_entry(key, value) {
                warn!(error = %error, "Discarding entry while collecting node");
            }
        }
        node
    }
}

impl Extend<(String, Value)> for Node {
    /// Seeds entries directly, bypassing the lock the way construction does.
    fn extend<T: IntoIterator<Item = (String, Value)>>(&mut self, iter: T) {
        for (key, value) in iter {
            if let Err(error) = self.insert_entry(key, value) {
                warn!(error = %error, "Discarding entry while extending node");
            }
        }
    }
}
