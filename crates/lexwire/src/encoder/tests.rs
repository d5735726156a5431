//! Unit tests for the JSON encoder.

use std::rc::Rc;

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::renderer::TreeNode;
use crate::tests::support::{Broken, Process, Untracked, registry};

#[fixture]
fn encoder() -> JsonEncoder {
    JsonEncoder::new(Rc::new(registry()), false)
}

#[fixture]
fn compressing() -> JsonEncoder {
    JsonEncoder::new(Rc::new(registry()), true)
}

fn map(entries: &[(&str, Value)]) -> Value {
    Value::Map(
        entries
            .iter()
            .map(|(key, value)| ((*key).to_owned(), value.clone()))
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Shape dispatch
// ---------------------------------------------------------------------------

#[rstest]
#[case::null(Value::Null, json!(null))]
#[case::boolean(Value::from(true), json!(true))]
#[case::integer(Value::from(4_u64), json!(4))]
#[case::negative(Value::from(-3_i64), json!(-3))]
#[case::float(Value::from(1.5), json!(1.5))]
#[case::text(Value::from("System"), json!("System"))]
fn literals_pass_through(mut encoder: JsonEncoder, #[case] item: Value, #[case] expected: Json) {
    assert_eq!(encoder.encode(&item, None).expect("encode"), expected);
}

#[rstest]
fn mappings_and_lists_encode_recursively(mut encoder: JsonEncoder) {
    let item = map(&[
        ("pids", Value::List(vec![Value::from(4_u64), Value::from(8_u64)])),
        ("name", Value::from(b"smss.exe".as_slice())),
    ]);
    let encoded = encoder.encode(&item, None).expect("encode");
    assert_eq!(encoded, json!({"pids": [4, 8], "name": ["*", "smss.exe"]}));
}

#[rstest]
fn text_bytes_are_tagged_as_text(mut encoder: JsonEncoder) {
    let encoded = encoder
        .encode(&Value::from(b"hello".as_slice()), None)
        .expect("encode");
    assert_eq!(encoded, json!(["*", "hello"]));
}

#[rstest]
fn invalid_utf8_is_tagged_as_base64_binary(mut encoder: JsonEncoder) {
    let encoded = encoder
        .encode(&Value::from(vec![0xff_u8, 0xfe]), None)
        .expect("encode");
    assert_eq!(encoded, json!(["+", "//4="]));
}

#[rstest]
fn sets_use_the_set_marker(mut encoder: JsonEncoder) {
    let item = Value::Set(vec![Value::from(1_u64), Value::from("a")]);
    let encoded = encoder.encode(&item, None).expect("encode");
    assert_eq!(encoded, json!({"type": "set", "data": [1, "a"]}));
}

// ---------------------------------------------------------------------------
// Stateful objects
// ---------------------------------------------------------------------------

#[rstest]
fn objects_encode_through_their_renderer(mut encoder: JsonEncoder) {
    let encoded = encoder
        .encode(&Process::value(4, "System"), None)
        .expect("encode");
    assert_eq!(
        encoded,
        json!({
            "type": "Process",
            "id": 4,
            "pid": 4,
            "name": "System",
            "space": {"type": "AddressSpace", "cls": "WindowsAMD64PagedMemory"},
        })
    );
}

#[rstest]
fn objects_without_identity_carry_no_id(mut encoder: JsonEncoder) {
    let node = Value::object(TreeNode::new(Value::from(1_u64)));
    let encoded = encoder.encode(&node, None).expect("encode");
    assert_eq!(encoded, json!({"type": "TreeNode", "child": 1}));
}

#[rstest]
fn renderer_returning_non_mapping_is_fatal(mut encoder: JsonEncoder) {
    let err = encoder
        .encode(&Value::object(Broken), None)
        .expect_err("broken renderer must fail");
    assert!(
        matches!(err, EncodeError::InvalidState { ref renderer, found: "list" } if renderer == "Broken"),
        "unexpected error: {err}"
    );
}

#[rstest]
fn broken_renderer_deep_in_a_tree_still_fails(mut encoder: JsonEncoder) {
    let item = map(&[("inner", Value::List(vec![Value::object(Broken)]))]);
    assert!(encoder.encode(&item, None).is_err());
}

// ---------------------------------------------------------------------------
// Graceful degradation
// ---------------------------------------------------------------------------

#[rstest]
#[case::unclaimed_object(Value::object(Untracked))]
#[case::opaque(Value::opaque("SessionState"))]
fn unencodable_values_become_null(mut encoder: JsonEncoder, #[case] item: Value) {
    assert_eq!(encoder.encode(&item, None).expect("encode"), json!(null));
}

#[rstest]
fn unencodable_fields_do_not_abort_siblings(mut encoder: JsonEncoder) {
    let item = map(&[
        ("cache", Value::opaque("FastStore")),
        ("pid", Value::from(4_u64)),
    ]);
    let encoded = encoder.encode(&item, None).expect("encode");
    assert_eq!(encoded, json!({"cache": null, "pid": 4}));
}

// ---------------------------------------------------------------------------
// Explicit renderer names
// ---------------------------------------------------------------------------

#[rstest]
fn explicit_type_name_overrides_dispatch(mut encoder: JsonEncoder) {
    let encoded = encoder
        .encode(&Value::from(7_u64), Some("TreeNode"))
        .expect("encode");
    assert_eq!(encoded, json!({"type": "TreeNode", "child": 7}));
}

#[rstest]
fn explicit_type_name_skips_null(mut encoder: JsonEncoder) {
    let encoded = encoder
        .encode(&Value::Null, Some("TreeNode"))
        .expect("encode");
    assert_eq!(encoded, json!(null));
}

#[rstest]
fn unknown_explicit_type_name_is_a_lookup_error(mut encoder: JsonEncoder) {
    let err = encoder
        .encode(&Value::from(1_u64), Some("Pool"))
        .expect_err("unknown renderer");
    assert!(matches!(err, EncodeError::Lookup(_)));
}

// ---------------------------------------------------------------------------
// Compression
// ---------------------------------------------------------------------------

#[rstest]
fn compression_replaces_literals_with_ids(mut compressing: JsonEncoder) {
    let encoded = compressing
        .encode(&map(&[("pid", Value::from(4_u64))]), None)
        .expect("encode");
    assert_eq!(encoded, json!({"_": 1, "1": "2"}));
    assert_eq!(compressing.lexicon().get("1"), Some(&json!("pid")));
    assert_eq!(compressing.lexicon().get("2"), Some(&json!(4)));
}

#[rstest]
fn compression_dedups_equal_literals(mut compressing: JsonEncoder) {
    let first = compressing.encode(&Value::from("foo"), None).expect("encode");
    let second = compressing.encode(&Value::from("foo"), None).expect("encode");
    assert_eq!(first, second);
    assert_eq!(compressing.lexicon().len(), 1);
}

#[rstest]
fn compression_keeps_nested_mappings_inline(mut compressing: JsonEncoder) {
    let encoded = compressing
        .encode(&map(&[("outer", map(&[("inner", Value::from(1_u64))]))]), None)
        .expect("encode");
    assert_eq!(encoded, json!({"_": 1, "1": {"_": 1, "2": "3"}}));
}

#[rstest]
fn compression_stores_sequences_whole(mut compressing: JsonEncoder) {
    let encoded = compressing
        .encode(&Value::from(vec![0xff_u8, 0xfe]), None)
        .expect("encode");
    assert_eq!(encoded, json!("1"));
    assert_eq!(compressing.lexicon().get("1"), Some(&json!(["+", "//4="])));
}

#[rstest]
fn flush_resets_lexicon(mut compressing: JsonEncoder) {
    compressing.encode(&Value::from("a"), None).expect("encode");
    compressing.flush();
    assert!(compressing.lexicon().is_empty());
    let encoded = compressing.encode(&Value::from("b"), None).expect("encode");
    assert_eq!(encoded, json!("1"));
}

#[rstest]
fn uncompressed_encoder_leaves_lexicon_empty(mut encoder: JsonEncoder) {
    encoder
        .encode(&Process::value(4, "System"), None)
        .expect("encode");
    assert!(!encoder.compression());
    assert!(encoder.lexicon().is_empty());
}
