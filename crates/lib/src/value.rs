//! Value types for nested node trees.
//!
//! This module provides the Value enum that represents everything that can be
//! stored under a key. Values are either leaf values (primitives and opaque
//! structured data) or a nested [`Node`].

use std::fmt;

use crate::{Node, errors::NodeError};

/// Values that can be stored in a node.
///
/// `Value` is a tagged variant covering every storable entry. All variants
/// except [`Value::Node`] are leaves: traversal never descends into them and
/// they cannot contain live nodes.
///
/// # Value Types
///
/// ## Leaf Values
/// - [`Value::Null`] - an ordinary storable null
/// - [`Value::Bool`] - boolean values
/// - [`Value::Int`] - 64-bit signed integers
/// - [`Value::Float`] - 64-bit floating point numbers
/// - [`Value::Text`] - UTF-8 text strings
/// - [`Value::Json`] - opaque structured data (arrays and anything else the
///   tree does not model); carried as-is, never traversed
///
/// ## Branch Values
/// - [`Value::Node`] - a nested node (a handle, not a copy)
///
/// ## Sentinel
/// - [`Value::Deleted`] - the delete marker; storing it removes the key.
///   It is never kept in a tree and never returned from a lookup.
///
/// # Direct Comparisons
///
/// `Value` implements `PartialEq` with primitive types for ergonomic
/// comparisons:
///
/// ```
/// # use deepmap::Value;
/// let text = Value::Text("hello".to_string());
/// let number = Value::Int(42);
///
/// assert!(text == "hello");
/// assert!(number == 42);
/// assert!("hello" == text);
///
/// // Type mismatches return false
/// assert!(!(text == 42));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    // Leaf values
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Text string value
    Text(String),
    /// Opaque structured data, stored verbatim
    Json(serde_json::Value),

    // Branch values
    /// Nested node holding further entries
    Node(Node),

    // Sentinel
    /// Delete marker; assigning it removes the key
    Deleted,
}

impl Value {
    /// Returns true if this is a leaf value (anything but a nested node)
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Value::Node(_))
    }

    /// Returns true if this is a nested node
    pub fn is_node(&self) -> bool {
        matches!(self, Value::Node(_))
    }

    /// Returns true if this is the delete marker
    pub fn is_deleted(&self) -> bool {
        matches!(self, Value::Deleted)
    }

    /// Returns true if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Json(_) => "json",
            Value::Node(_) => "node",
            Value::Deleted => "deleted",
        }
    }

    /// Attempts to convert to a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to convert to an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to convert to a float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to convert to a string slice
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to view the opaque structured payload
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Attempts to convert to a node handle
    pub fn as_node(&self) -> Option<Node> {
        match self {
            Value::Node(node) => Some(node.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Json(v) => write!(f, "{v}"),
            Value::Node(node) => write!(f, "{node}"),
            Value::Deleted => write!(f, "<deleted>"),
        }
    }
}

/// Names a JSON value's type for error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

// Convenient From implementations for common types
impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(Value::Int)
            .unwrap_or(Value::Float(value as f64))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<Node> for Value {
    fn from(value: Node) -> Self {
        Value::Node(value)
    }
}

impl From<&serde_json::Value> for Value {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    Value::Json(value.clone())
                }
            }
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Array(_) => Value::Json(value.clone()),
            serde_json::Value::Object(map) => Value::Node(Node::from_json_map(map)),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(_) => Value::Json(value),
            other => Value::from(&other),
        }
    }
}

// TryFrom implementations for typed extraction
impl TryFrom<Value> for String {
    type Error = NodeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(NodeError::TypeMismatch {
                expected: "text".to_string(),
                actual: other.type_name().to_string(),
            }),
        }
    }
}

impl TryFrom<Value> for i64 {
    type Error = NodeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Int(n) => Ok(n),
            other => Err(NodeError::TypeMismatch {
                expected: "int".to_string(),
                actual: other.type_name().to_string(),
            }),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = NodeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Float(n) => Ok(n),
            other => Err(NodeError::TypeMismatch {
                expected: "float".to_string(),
                actual: other.type_name().to_string(),
            }),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = NodeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(NodeError::TypeMismatch {
                expected: "bool".to_string(),
                actual: other.type_name().to_string(),
            }),
        }
    }
}

impl TryFrom<Value> for Node {
    type Error = NodeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Node(node) => Ok(node),
            other => Err(NodeError::TypeMismatch {
                expected: "node".to_string(),
                actual: other.type_name().to_string(),
            }),
        }
    }
}

// PartialEq implementations for comparing Value with other types
impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        match self {
            Value::Text(s) => s == other,
            _ => false,
        }
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl PartialEq<String> for Value {
    fn eq(&self, other: &String) -> bool {
        match self {
            Value::Text(s) => s == other,
            _ => false,
        }
    }
}

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        match self {
            Value::Int(n) => n == other,
            _ => false,
        }
    }
}

impl PartialEq<i32> for Value {
    fn eq(&self, other: &i32) -> bool {
        match self {
            Value::Int(n) => *n == *other as i64,
            _ => false,
        }
    }
}

impl PartialEq<f64> for Value {
    fn eq(&self, other: &f64) -> bool {
        match self {
            Value::Float(n) => n == other,
            _ => false,
        }
    }
}

impl PartialEq<bool> for Value {
    fn eq(&self, other: &bool) -> bool {
        match self {
            Value::Bool(b) => b == other,
            _ => false,
        }
    }
}

// Reverse implementations for symmetry
impl PartialEq<Value> for str {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}

impl PartialEq<Value> for &str {
    fn eq(&self, other: &Value) -> bool {
        other == *self
    }
}

impl PartialEq<Value> for String {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}

impl PartialEq<Value> for i64 {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}

impl PartialEq<Value> for i32 {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}

impl PartialEq<Value> for f64 {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}

impl PartialEq<Value> for bool {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}
