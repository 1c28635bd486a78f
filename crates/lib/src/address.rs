//! Address types for hierarchical node access.
//!
//! This module provides the owned key sequence used to address values and
//! nodes across levels of a tree. An address is an ordered list of segments;
//! segments are plain strings and may contain any character, so addresses are
//! stored as a segment vector rather than a delimited string.
//!
//! # Usage
//!
//! ```
//! use deepmap::{Address, address};
//!
//! // Build incrementally
//! let mut addr = Address::new();
//! addr.push("user");
//! addr.push("profile");
//!
//! // Or with the macro
//! let addr = address!["user", "profile"];
//! assert_eq!(addr.to_string(), "user.profile");
//!
//! // Collect from any iterator of key-like values
//! let addr: Address = ["user", "profile"].into_iter().collect();
//! assert_eq!(addr.len(), 2);
//! ```

use std::{fmt, ops::Index, slice};

/// An owned sequence of keys addressing a value relative to some node.
///
/// An empty address denotes the node itself; node-level operations reject it
/// because there is no key to act on. Every path-taking operation accepts
/// anything iterable over key-like values, so an `Address` is convenient but
/// never required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Address {
    segments: Vec<String>,
}

impl Address {
    /// Creates a new empty address.
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Appends a segment to the end of this address.
    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    /// Removes and returns the last segment, or `None` if empty.
    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    /// Returns a copy of this address with `segment` appended.
    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut joined = self.clone();
        joined.push(segment);
        joined
    }

    /// Returns the address of the enclosing level, or `None` if empty.
    pub fn parent(&self) -> Option<Address> {
        if self.segments.is_empty() {
            None
        } else {
            Some(Address {
                segments: self.segments[..self.segments.len() - 1].to_vec(),
            })
        }
    }

    /// Returns the first segment, or `None` if empty.
    pub fn first(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// Returns the last segment, or `None` if empty.
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Returns an iterator over the segments as string slices.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if the address has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the segments as a slice.
    pub fn as_slice(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "(root)")
        } else {
            write!(f, "{}", self.segments.join("."))
        }
    }
}

impl Index<usize> for Address {
    type Output = str;

    fn index(&self, index: usize) -> &Self::Output {
        &self.segments[index]
    }
}

impl From<Vec<String>> for Address {
    fn from(segments: Vec<String>) -> Self {
        Address { segments }
    }
}

impl<S: Into<String>> FromIterator<S> for Address {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Address {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for Address {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        self.segments.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for Address {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.into_iter()
    }
}

impl<'a> IntoIterator for &'a Address {
    type Item = &'a String;
    type IntoIter = slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

/// Constructs an [`Address`] from a list of segments.
///
/// # Syntax
///
/// - `address![]` - empty address
/// - `address!["user", "profile"]` - one segment per argument
/// - `address![base_key, "profile"]` - arguments may be runtime values
///
/// # Examples
///
/// ```
/// use deepmap::address;
///
/// let addr = address!["user", "profile", "name"];
/// assert_eq!(addr.len(), 3);
/// assert_eq!(addr.to_string(), "user.profile.name");
///
/// let empty = address![];
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! address {
    () => {
        $crate::Address::new()
    };
    ($($segment:expr),+ $(,)?) => {{
        let mut address = $crate::Address::new();
        $(address.push($segment);)+
        address
    }};
}
