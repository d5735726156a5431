//! Unit tests for the renderer contract helpers.

use rstest::rstest;
use serde_json::{Map, json};

use super::*;

fn state_of(encoded: serde_json::Value) -> Map<String, Json> {
    match encoded {
        Json::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

#[rstest]
#[case::numeric(json!({"type": "Process", "id": 42}), Some("42"))]
#[case::textual(json!({"type": "Process", "id": "abc"}), Some("\"abc\""))]
#[case::null_id(json!({"type": "Process", "id": null}), None)]
#[case::missing(json!({"type": "Process"}), None)]
fn default_cache_key_reads_id_field(
    #[case] encoded: serde_json::Value,
    #[case] expected: Option<&str>,
) {
    let key = default_cache_key(&state_of(encoded));
    assert_eq!(key.as_deref(), expected);
}

#[test]
fn tree_node_state_carries_options_and_child() {
    let node = TreeNode::new(Value::from("init")).with_option("depth", 2_u64);
    let state = TreeNodeRenderer.get_state(&Value::object(node));
    let map = state.as_map().expect("tree node state is a map");
    assert_eq!(map.get("child"), Some(&Value::from("init")));
    assert_eq!(map.get("depth"), Some(&Value::from(2_u64)));
}

#[test]
fn tree_node_wraps_foreign_values() {
    let state = TreeNodeRenderer.get_state(&Value::from(7_u64));
    let map = state.as_map().expect("tree node state is a map");
    assert_eq!(map.len(), 1);
    assert_eq!(map.get("child"), Some(&Value::from(7_u64)));
}

#[test]
fn tree_node_reconstruct_moves_options_out() {
    let mut state = ValueMap::new();
    state.insert("child".into(), Value::from("svchost.exe"));
    state.insert("depth".into(), Value::from(3_u64));
    let mut options = DecodeOptions::new();

    let child = TreeNodeRenderer
        .reconstruct(state, &mut options)
        .expect("reconstruct succeeds");

    assert_eq!(child, Value::from("svchost.exe"));
    assert_eq!(options.get("depth"), Some(&Value::from(3_u64)));
}

#[test]
fn tree_node_reconstruct_requires_child() {
    let mut options = DecodeOptions::new();
    let err = TreeNodeRenderer
        .reconstruct(ValueMap::new(), &mut options)
        .expect_err("missing child must fail");
    assert!(matches!(err, DecodeError::Reconstruct { .. }));
}
