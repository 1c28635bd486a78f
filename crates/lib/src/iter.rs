//! Lazy iterators over node trees.
//!
//! Shallow iteration ([`Node::iter`], [`Node::keys`], [`Node::values`])
//! visits direct entries in insertion order. Deep iteration ([`Node::walk`]
//! and the `deep_*` views) yields every leaf in the tree depth-first, and
//! [`Node::containers`] yields the nested nodes instead. All of them hold a
//! node handle and walk with an explicit frame stack, so arbitrarily deep
//! trees iterate without recursion and nothing is produced before it is
//! asked for.
//!
//! The iterators observe mutations made between `next` calls; entries are
//! visited by position within each node.

use crate::{Address, Node, Value};

impl Node {
    /// Iterates over direct `(key, value)` entries in insertion order.
    pub fn iter(&self) -> Iter {
        Iter {
            node: self.clone(),
            index: 0,
        }
    }

    /// Iterates over direct keys in insertion order.
    pub fn keys(&self) -> Keys {
        Keys { inner: self.iter() }
    }

    /// Iterates over direct values in insertion order.
    pub fn values(&self) -> Values {
        Values { inner: self.iter() }
    }

    /// Iterates depth-first over every leaf, yielding its full address and
    /// value.
    ///
    /// Nested nodes are traversed, not yielded; an empty node contributes
    /// nothing. Addresses are relative to this node.
    ///
    /// ```
    /// # use deepmap::Node;
    /// let source = serde_json::json!({"a": {"aa": {"aaa": 0}}, "b": 1, "c": {"cc": 2}});
    /// let tree = Node::wrap(&source)?;
    ///
    /// let addresses: Vec<String> = tree.walk().map(|(addr, _)| addr.to_string()).collect();
    /// assert_eq!(addresses, ["a.aa.aaa", "b", "c.cc"]);
    /// # Ok::<(), deepmap::Error>(())
    /// ```
    pub fn walk(&self) -> Walk {
        Walk {
            stack: vec![(self.clone(), 0)],
            prefix: Vec::new(),
        }
    }

    /// Iterates depth-first over every leaf, yielding its local key and
    /// value.
    pub fn deep_items(&self) -> DeepItems {
        DeepItems { walk: self.walk() }
    }

    /// Iterates depth-first over the full address of every leaf.
    pub fn deep_keys(&self) -> DeepKeys {
        DeepKeys { walk: self.walk() }
    }

    /// Iterates depth-first over every leaf value.
    ///
    /// ```
    /// # use deepmap::Node;
    /// let source = serde_json::json!({"a": {"aa": {"aaa": 0}}, "b": 1, "c": {"cc": 2}});
    /// let tree = Node::wrap(&source)?;
    ///
    /// let values: Vec<i64> = tree.deep_values().filter_map(|v| v.as_int()).collect();
    /// assert_eq!(values, [0, 1, 2]);
    /// # Ok::<(), deepmap::Error>(())
    /// ```
    pub fn deep_values(&self) -> DeepValues {
        DeepValues { walk: self.walk() }
    }

    /// Iterates over the nested nodes of this tree in depth-first preorder.
    ///
    /// By default every node-valued descendant is yielded and the starting
    /// node is not; [`Containers::inclusive`] prepends the starting node and
    /// [`Containers::shallow`] restricts the walk to direct children.
    ///
    /// ```
    /// # use deepmap::Node;
    /// let tree = Node::new();
    /// tree.set_path(["a", "b", "c"], 1)?;
    ///
    /// let keys: Vec<_> = tree.containers().map(|n| n.key()).collect();
    /// assert_eq!(keys, [Some("a".to_string()), Some("b".to_string())]);
    ///
    /// let shallow: Vec<_> = tree.containers().inclusive().shallow().map(|n| n.key()).collect();
    /// assert_eq!(shallow, [None, Some("a".to_string())]);
    /// # Ok::<(), deepmap::Error>(())
    /// ```
    pub fn containers(&self) -> Containers {
        Containers {
            start: self.clone(),
            include_start: false,
            stack: vec![(self.clone(), 0)],
            deep: true,
        }
    }
}

/// Shallow iterator over `(key, value)` entries.
pub struct Iter {
    node: Node,
    index: usize,
}

impl Iterator for Iter {
    type Item = (String, Value);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.node.entry_at(self.index)?;
        self.index += 1;
        Some(entry)
    }
}

/// Shallow iterator over keys.
pub struct Keys {
    inner: Iter,
}

impl Iterator for Keys {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }
}

/// Shallow iterator over values.
pub struct Values {
    inner: Iter,
}

impl Iterator for Values {
    type Item = Value;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }
}

/// Depth-first leaf iterator yielding `(Address, Value)` pairs.
///
/// Keeps one frame per open node plus the key prefix leading to it, advancing
/// a single entry per step.
pub struct Walk {
    stack: Vec<(Node, usize)>,
    prefix: Vec<String>,
}

impl Iterator for Walk {
    type Item = (Address, Value);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (node, index) = self.stack.last().cloned()?;
            match node.entry_at(index) {
                None => {
                    self.stack.pop();
                    // The starting frame has no prefix segment of its own
                    if !self.stack.is_empty() {
                        self.prefix.pop();
                    }
                }
                Some((key, Value::Node(child))) => {
                    if let Some(top) = self.stack.last_mut() {
                        top.1 += 1;
                    }
                    self.stack.push((child, 0));
                    self.prefix.push(key);
                }
                Some((key, leaf)) => {
                    if let Some(top) = self.stack.last_mut() {
                        top.1 += 1;
                    }
                    let mut segments = self.prefix.clone();
                    segments.push(key);
                    return Some((segments.into_iter().collect(), leaf));
                }
            }
        }
    }
}

/// Depth-first leaf iterator yielding `(key, value)` with the local key.
pub struct DeepItems {
    walk: Walk,
}

impl Iterator for DeepItems {
    type Item = (String, Value);

    fn next(&mut self) -> Option<Self::Item> {
        let (address, value) = self.walk.next()?;
        let key = address.last().map(str::to_string).unwrap_or_default();
        Some((key, value))
    }
}

/// Depth-first iterator over full leaf addresses.
pub struct DeepKeys {
    walk: Walk,
}

impl Iterator for DeepKeys {
    type Item = Address;

    fn next(&mut self) -> Option<Self::Item> {
        self.walk.next().map(|(address, _)| address)
    }
}

/// Depth-first iterator over leaf values.
pub struct DeepValues {
    walk: Walk,
}

impl Iterator for DeepValues {
    type Item = Value;

    fn next(&mut self) -> Option<Self::Item> {
        self.walk.next().map(|(_, value)| value)
    }
}

/// Preorder iterator over the nested nodes of a tree.
pub struct Containers {
    start: Node,
    include_start: bool,
    stack: Vec<(Node, usize)>,
    deep: bool,
}

impl Containers {
    /// Also yields the node [`Node::containers`] was called on, before
    /// everything else.
    pub fn inclusive(mut self) -> Self {
        self.include_start = true;
        self
    }

    /// Restricts the walk to direct children of the starting node.
    pub fn shallow(mut self) -> Self {
        self.deep = false;
        self
    }
}

impl Iterator for Containers {
    type Item = Node;

    fn next(&mut self) -> Option<Self::Item> {
        if self.include_start {
            self.include_start = false;
            return Some(self.start.clone());
        }
        loop {
            let (node, index) = self.stack.last().cloned()?;
            match node.entry_at(index) {
                None => {
                    self.stack.pop();
                }
                Some((_, Value::Node(child))) => {
                    if let Some(top) = self.stack.last_mut() {
                        top.1 += 1;
                    }
                    if self.deep {
                        self.stack.push((child.clone(), 0));
                    }
                    return Some(child);
                }
                Some(_) => {
                    if let Some(top) = self.stack.last_mut() {
                        top.1 += 1;
                    }
                }
            }
        }
    }
}
