//! Shared helpers for the integration test suite.

use deepmap::{Node, Value};

/// Create the small reference tree used across the suite:
/// `{"a": {"aa": {"aaa": 0}}, "b": 1, "c": {"cc": 2}}`
pub fn setup_sample_tree() -> Node {
    Node::wrap(&serde_json::json!({
        "a": {"aa": {"aaa": 0}},
        "b": 1,
        "c": {"cc": 2},
    }))
    .unwrap()
}

/// Create a linear chain of the given keys and return the tree root.
pub fn setup_chain(keys: &[&str]) -> Node {
    let root = Node::new();
    let mut current = root.clone();
    for key in keys {
        current = current.get_node(*key).unwrap();
    }
    root
}

/// Assert that a node contains the expected text entries.
pub fn assert_text_entries(node: &Node, expected: &[(&str, &str)]) {
    for (key, expected_value) in expected {
        match node.try_get(key) {
            Some(Value::Text(actual)) => {
                assert_eq!(&actual, expected_value, "Value mismatch for key '{key}'");
            }
            Some(other) => panic!("Expected text value for key '{key}', got: {other:?}"),
            None => panic!("Key '{key}' not found in node"),
        }
    }
}

/// Assert that every leaf of `node`, in walk order, matches the expected
/// `(dotted address, value)` pairs.
pub fn assert_leaves(node: &Node, expected: &[(&str, i64)]) {
    let actual: Vec<(String, Value)> = node
        .walk()
        .map(|(address, value)| (address.to_string(), value))
        .collect();
    assert_eq!(actual.len(), expected.len(), "leaf count mismatch");
    for ((address, value), (expected_address, expected_value)) in
        actual.iter().zip(expected.iter())
    {
        assert_eq!(address, expected_address);
        assert_eq!(value, expected_value, "value mismatch at '{address}'");
    }
}
