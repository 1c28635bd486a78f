//! Tests for parent, key, and root tracking across attach and detach.

use deepmap::{Node, Value};

use crate::helpers::*;

// ===== FRESH AND ATTACHED NODES =====

#[test]
fn test_fresh_node_is_its_own_root() {
    let node = Node::new();

    assert!(node.is_root());
    assert_eq!(node.parent(), None);
    assert_eq!(node.key(), None);
    assert_eq!(node.depth(), 0);
    assert!(node.address().is_empty());
    assert_eq!(node.address().to_string(), "(root)");
    assert!(Node::ptr_eq(&node.root(), &node));
}

#[test]
fn test_attach_sets_parent_key_and_root() {
    let root = Node::new();
    let child = Node::new();
    root.set("child", child.clone()).unwrap();

    assert!(Node::ptr_eq(&child.parent().unwrap(), &root));
    assert_eq!(child.key(), Some("child".to_string()));
    assert!(Node::ptr_eq(&child.root(), &root));
    assert_eq!(child.depth(), 1);
    assert_eq!(child.address().to_string(), "child");
}

#[test]
fn test_vivified_chain_is_fully_linked() {
    let root = Node::new();
    root.set_path(["x", "y", "z"], 1).unwrap();

    let y = root.get_node("x").unwrap().get_node("y").unwrap();
    assert_eq!(y.address().to_string(), "x.y");
    assert_eq!(y.depth(), 2);
    assert!(Node::ptr_eq(&y.root(), &root));
    assert!(Node::ptr_eq(&y.parent().unwrap().root(), &root));
}

#[test]
fn test_depth_recurrence_across_the_tree() {
    let tree = setup_sample_tree();

    for node in tree.containers() {
        let parent = node.parent().unwrap();
        assert_eq!(node.depth(), parent.depth() + 1);
        assert_eq!(node.address().len(), node.depth());
    }
}

#[test]
fn test_is_leaf_reflects_entry_shapes() {
    let tree = setup_sample_tree();

    assert!(!tree.is_leaf());
    let aa = tree.get_node("a").unwrap().get_node("aa").unwrap();
    assert!(aa.is_leaf());
    assert!(Node::new().is_leaf());
}

// ===== DETACH =====

#[test]
fn test_detach_resets_linkage_for_the_whole_subtree() {
    let root = Node::new();
    root.set_path(["a", "b", "c"], 1).unwrap();
    let a = root.get_node("a").unwrap();
    let b = a.get_node("b").unwrap();

    root.remove("a").unwrap();

    assert!(a.is_root());
    assert_eq!(a.key(), None);
    assert!(a.address().is_empty());

    // Descendants now resolve their root to the detached node
    assert!(Node::ptr_eq(&b.root(), &a));
    assert_eq!(b.address().to_string(), "b");
    assert_eq!(b.depth(), 1);
    assert_eq!(a.get_path(["b", "c"]).unwrap(), 1);
}

// ===== RE-PARENTING =====

#[test]
fn test_moving_a_subtree_updates_its_address() {
    let root = Node::new();
    root.set_path(["old", "branch", "leaf"], 1).unwrap();
    let branch = root.get_node("old").unwrap().get_node("branch").unwrap();

    let new_home = root.get_node("new").unwrap();
    new_home.set("branch", branch.clone()).unwrap();

    // The subtree lives in exactly one place
    assert!(!root.get_node("old").unwrap().contains_key("branch"));
    assert_eq!(branch.address().to_string(), "new.branch");
    assert_eq!(branch.depth(), 2);
    assert!(Node::ptr_eq(&branch.root(), &root));
    assert_eq!(root.get_path(["new", "branch", "leaf"]).unwrap(), 1);
}

#[test]
fn test_moving_a_node_between_trees() {
    let source = Node::new();
    source.set_path(["data", "x"], 1).unwrap();
    let data = source.get_node("data").unwrap();

    let target = Node::new();
    target.set("imported", data.clone()).unwrap();

    assert!(!source.contains_key("data"));
    assert!(Node::ptr_eq(&data.root(), &target));
    assert_eq!(data.address().to_string(), "imported");
    assert_eq!(target.get_path(["imported", "x"]).unwrap(), 1);
}

#[test]
fn test_moving_a_node_between_keys_in_one_parent() {
    let root = Node::new();
    let child = root.get_node("first").unwrap();

    root.set("second", child.clone()).unwrap();

    assert!(!root.contains_key("first"));
    assert_eq!(root.len(), 1);
    assert_eq!(child.key(), Some("second".to_string()));
    assert_eq!(child.address().to_string(), "second");
}

#[test]
fn test_replacing_an_entry_detaches_the_old_occupant() {
    let root = Node::new();
    let old = root.get_node("slot").unwrap();
    old.set("kept", 1).unwrap();

    root.set("slot", Node::new().with("fresh", 2)).unwrap();

    assert!(old.is_root());
    assert_eq!(old.get("kept").unwrap(), 1);
    assert_eq!(root.get_path(["slot", "fresh"]).unwrap(), 2);
}

#[test]
fn test_detached_subtree_works_standalone() {
    let root = Node::new();
    root.set_path(["sub", "a"], 1).unwrap();
    let sub = root.remove("sub").unwrap().unwrap().as_node().unwrap();

    // The detached tree accepts its own deep writes and lookups
    sub.set_path(["b", "c"], 2).unwrap();
    assert_eq!(sub.get("a").unwrap(), 1);
    assert_eq!(sub.get_path(["b", "c"]).unwrap(), 2);
    assert_eq!(sub.get_node("b").unwrap().address().to_string(), "b");
}

// ===== ROOT RESOLUTION =====

#[test]
fn test_root_is_shared_by_every_descendant() {
    let root = setup_chain(&["l1", "l2", "l3", "l4"]);
    let mut current = root.clone();
    for _ in 0..4 {
        let (key, value) = current.iter().next().unwrap();
        let child = value.as_node().unwrap();
        assert!(Node::ptr_eq(&child.root(), &root));
        assert_eq!(child.key(), Some(key));
        current = child;
    }
    assert_eq!(current.depth(), 4);
    assert_eq!(current.address().to_string(), "l1.l2.l3.l4");
}

#[test]
fn test_root_stays_correct_after_successive_moves() {
    let tree_one = Node::new();
    let tree_two = Node::new();
    let nomad = Node::new().with("tag", 1);

    tree_one.set("here", nomad.clone()).unwrap();
    assert!(Node::ptr_eq(&nomad.root(), &tree_one));

    tree_two.set("there", nomad.clone()).unwrap();
    assert!(Node::ptr_eq(&nomad.root(), &tree_two));
    assert!(!tree_one.contains_key("here"));

    tree_two.remove("there").unwrap();
    assert!(Node::ptr_eq(&nomad.root(), &nomad));
}

#[test]
fn test_linkage_values_compare_by_content() {
    // Equal content in different trees still reports different positions
    let left = Node::new();
    left.set_path(["p", "q"], 1).unwrap();
    let right = Node::new();
    right.set_path(["p", "q"], 1).unwrap();

    assert_eq!(left, right);
    let left_q = left.get_node("p").unwrap().get_node("q").unwrap();
    let right_q = right.get_node("p").unwrap().get_node("q").unwrap();
    assert_eq!(left_q.address(), right_q.address());
    assert!(!Node::ptr_eq(&left_q.root(), &right_q.root()));
}

#[test]
fn test_removed_value_clone_keeps_subtree_alive() {
    let root = Node::new();
    root.set_path(["a", "b"], 1).unwrap();

    let removed = root.remove("a").unwrap();
    drop(root);

    // The extracted subtree outlives the tree it came from
    if let Some(Value::Node(a)) = removed {
        assert_eq!(a.get("b").unwrap(), 1);
        assert!(a.is_root());
    } else {
        panic!("Expected a node occupant");
    }
}
