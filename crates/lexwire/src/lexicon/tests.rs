//! Unit tests for the lexicon.

use rstest::rstest;
use serde_json::json;

use super::*;

#[test]
fn ids_start_at_one_and_increase() {
    let mut lexicon = Lexicon::new();
    assert_eq!(lexicon.id_for(&json!("a")), "1");
    assert_eq!(lexicon.id_for(&json!("b")), "2");
    assert_eq!(lexicon.id_for(&json!(3)), "3");
    assert_eq!(lexicon.len(), 3);
}

#[test]
fn repeated_values_reuse_their_id() {
    let mut lexicon = Lexicon::new();
    let first = lexicon.id_for(&json!("foo"));
    let second = lexicon.id_for(&json!("foo"));
    assert_eq!(first, second);
    assert_eq!(lexicon.len(), 1);
}

#[test]
fn structured_values_dedup_by_equality() {
    let mut lexicon = Lexicon::new();
    let first = lexicon.id_for(&json!(["*", "hello"]));
    let second = lexicon.id_for(&json!(["*", "hello"]));
    let other = lexicon.id_for(&json!(["*", "world"]));
    assert_eq!(first, second);
    assert_ne!(first, other);
}

#[test]
fn distinct_json_types_get_distinct_ids() {
    let mut lexicon = Lexicon::new();
    let text = lexicon.id_for(&json!("1"));
    let number = lexicon.id_for(&json!(1));
    assert_ne!(text, number);
}

#[test]
fn clear_restarts_allocation() {
    let mut lexicon = Lexicon::new();
    lexicon.id_for(&json!("a"));
    lexicon.id_for(&json!("b"));
    lexicon.clear();
    assert!(lexicon.is_empty());
    assert_eq!(lexicon.id_for(&json!("z")), "1");
}

#[rstest]
#[case::string_id(json!("1"))]
#[case::numeric_id(json!(1))]
fn resolve_accepts_string_and_numeric_ids(#[case] id: Json) {
    let mut lexicon = Lexicon::new();
    lexicon.id_for(&json!("pid"));
    assert_eq!(lexicon.resolve(&id).expect("id resolves"), &json!("pid"));
}

#[test]
fn resolve_reports_missing_id_as_corruption() {
    let lexicon = Lexicon::new();
    let err = lexicon.resolve(&json!("99")).expect_err("missing id");
    assert!(matches!(err, DecodeError::LexiconCorruption { ref id } if id == "99"));
}

#[test]
fn resolve_rejects_non_scalar_ids() {
    let lexicon = Lexicon::new();
    let err = lexicon.resolve(&json!([1])).expect_err("list id");
    assert!(matches!(err, DecodeError::Malformed { .. }));
}

#[test]
fn snapshot_round_trips_through_json() {
    let mut lexicon = Lexicon::new();
    lexicon.id_for(&json!("name"));
    lexicon.id_for(&json!(4));
    let rebuilt = Lexicon::from_json(lexicon.to_json()).expect("snapshot parses");
    assert_eq!(rebuilt, lexicon);
}

#[test]
fn rebuilt_lexicon_continues_after_highest_id() {
    let mut lexicon =
        Lexicon::from_json(json!({"1": "a", "7": "b"})).expect("table parses");
    assert_eq!(lexicon.id_for(&json!("b")), "7");
    assert_eq!(lexicon.id_for(&json!("c")), "8");
}

#[rstest]
#[case::not_a_map(json!(["a"]))]
#[case::zero_id(json!({"0": "a"}))]
#[case::word_id(json!({"one": "a"}))]
fn from_json_rejects_malformed_tables(#[case] table: Json) {
    let err = Lexicon::from_json(table).expect_err("malformed table");
    assert!(matches!(err, DecodeError::Malformed { .. }));
}
