//! Tests for serde round-trips.

use deepmap::{LockState, Node, Value};

use crate::helpers::*;

#[test]
fn test_node_serializes_as_nested_json() {
    let source = serde_json::json!({
        "a": {"aa": {"aaa": 0}},
        "b": 1,
        "c": {"cc": 2},
    });
    let tree = Node::wrap(&source).unwrap();

    assert_eq!(tree.to_json().unwrap(), source);
}

#[test]
fn test_json_string_round_trip() {
    let tree = setup_sample_tree();
    tree.set("s", "text").unwrap();
    tree.set("f", 1.5).unwrap();
    tree.set("n", Value::Null).unwrap();

    let encoded = tree.to_json_string().unwrap();
    let decoded: Node = serde_json::from_str(&encoded).unwrap();

    assert_eq!(decoded, tree);
    assert!(!Node::ptr_eq(&decoded, &tree));
}

#[test]
fn test_deserialization_rebuilds_linkage() {
    let encoded = r#"{"a": {"aa": {"aaa": 0}}, "b": 1}"#;
    let tree: Node = serde_json::from_str(encoded).unwrap();

    assert!(tree.is_root());
    let aa = tree.get_node("a").unwrap().get_node("aa").unwrap();
    assert_eq!(aa.address().to_string(), "a.aa");
    assert_eq!(aa.depth(), 2);
    assert!(Node::ptr_eq(&aa.root(), &tree));
    assert_eq!(aa.get("aaa").unwrap(), 0);
}

#[test]
fn test_lock_flags_are_runtime_state() {
    let tree = setup_sample_tree();
    tree.get_node("a").unwrap().lock();

    let encoded = tree.to_json_string().unwrap();
    let decoded: Node = serde_json::from_str(&encoded).unwrap();

    // Content survives, the lock does not
    assert_eq!(decoded, tree);
    let a = decoded.get_node("a").unwrap();
    assert_eq!(a.lock_state(), LockState::Inherit);
    assert!(!a.locked());
}

#[test]
fn test_opaque_json_objects_come_back_as_nodes() {
    let tree = Node::new();
    tree.set("blob", Value::Json(serde_json::json!({"x": 1}))).unwrap();
    assert!(tree.try_get("blob").unwrap().as_node().is_none());

    let encoded = tree.to_json_string().unwrap();
    let decoded: Node = serde_json::from_str(&encoded).unwrap();

    // The serialized form has no leaf/node marker, so objects revive as nodes
    let blob = decoded.get_node("blob").unwrap();
    assert_eq!(blob.get("x").unwrap(), 1);
}

#[test]
fn test_opaque_json_arrays_stay_opaque() {
    let tree = Node::new();
    tree.set("list", Value::Json(serde_json::json!([1, 2, 3]))).unwrap();

    let encoded = tree.to_json_string().unwrap();
    let decoded: Node = serde_json::from_str(&encoded).unwrap();

    let list = decoded.try_get("list").unwrap();
    assert_eq!(list.as_json(), Some(&serde_json::json!([1, 2, 3])));
}

#[test]
fn test_null_and_deleted_serialize_as_null() {
    let tree = Node::new();
    tree.set("n", Value::Null).unwrap();

    assert_eq!(tree.to_json_string().unwrap(), r#"{"n":null}"#);
    assert_eq!(
        serde_json::to_string(&Value::Deleted).unwrap(),
        "null"
    );
}

#[test]
fn test_deserialization_preserves_key_order() {
    let encoded = r#"{"z": 1, "a": 2, "m": 3}"#;
    let tree: Node = serde_json::from_str(encoded).unwrap();

    let keys: Vec<String> = tree.keys().collect();
    assert_eq!(keys, ["z", "a", "m"]);
}

#[test]
fn test_numbers_deserialize_by_shape() {
    let encoded = r#"{"int": 7, "float": 2.5, "big": 18446744073709551615}"#;
    let tree: Node = serde_json::from_str(encoded).unwrap();

    assert_eq!(tree.try_get("int"), Some(Value::Int(7)));
    assert_eq!(tree.try_get("float"), Some(Value::Float(2.5)));
    assert!(matches!(tree.try_get("big"), Some(Value::Float(_))));
}

#[test]
fn test_address_serializes_transparently() {
    let address = deepmap::address!["user", "profile"];

    let encoded = serde_json::to_string(&address).unwrap();
    assert_eq!(encoded, r#"["user","profile"]"#);

    let decoded: deepmap::Address = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, address);
}

#[test]
fn test_wrap_and_serde_agree() {
    let source = serde_json::json!({
        "config": {"retries": 3, "verbose": true},
        "tags": ["a", "b"],
        "name": "svc",
    });

    let wrapped = Node::wrap(&source).unwrap();
    let deserialized: Node = serde_json::from_value(source.clone()).unwrap();

    assert_eq!(wrapped, deserialized);
    assert_eq!(wrapped.to_json().unwrap(), source);
}
