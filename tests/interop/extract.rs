use super::{Handle, host};
use jsinterop::bridge::sandbox::Value;
use jsinterop::{Record, Sandbox, TypeMismatch, TypeTag};
use serde_json::json;

#[test]
fn test_record_scenario() {
    let obj = host(json!({"a": "x", "b": 1, "c": true}));

    assert_eq!(obj.get("a").string(), Ok("x".to_string()));
    assert_eq!(
        obj.get("b").string(),
        Err(TypeMismatch::new("a string", TypeTag::String, TypeTag::Number))
    );
    assert_eq!(obj.get("b").string_or("fallback".to_string()), "fallback");
    assert!(obj.get("c").must_bool());
}

#[test]
fn test_sequence_scenario() {
    let arr = host(json!([1, 2, 3]));
    assert!(arr.is_array());
    assert_eq!(arr.length(), Ok(3));

    let items = arr.array().unwrap();
    let values: Vec<i64> = items.iter().map(|item| item.int().unwrap()).collect();
    assert_eq!(values, [1, 2, 3]);
}

#[test]
fn test_generic_postures_match_named_shortcuts() {
    let n = Handle::from(2.5);
    assert_eq!(n.try_extract::<f64>(), n.float());
    assert_eq!(n.must_extract::<f64>(), 2.5);
    assert_eq!(n.extract_or::<String>("d".to_string()), "d");
}

#[test]
fn test_record_values_are_live_handles() {
    let obj = host(json!({"inner": {"v": 1}}));
    let record: Record<Sandbox> = obj.must_object();
    record["inner"].set("v", &2).unwrap();
    assert_eq!(obj.get("inner").get("v").must_int(), 2);
}

#[test]
fn test_record_of_array_lists_indices() {
    let arr = host(json!(["x", "y"]));
    let record = arr.must_object();
    let keys: Vec<&String> = record.keys().collect();
    assert_eq!(keys, ["0", "1"]);
}

#[test]
fn test_length_of_non_array_object_is_host_defined() {
    let plain = host(json!({"a": 1}));
    assert_eq!(plain.length(), Ok(0));

    let array_like = host(json!({"length": 4.7}));
    assert_eq!(array_like.length(), Ok(4));
    assert!(array_like.array().is_err());
}

#[test]
fn test_length_tracks_mutation() {
    let arr = host(json!([]));
    assert_eq!(arr.must_length(), 0);
    arr.set("3", &true).unwrap();
    assert_eq!(arr.must_length(), 4);
    assert!(arr.index(1).is_undefined());

    arr.set("length", &1).unwrap();
    assert_eq!(arr.must_length(), 1);
}

#[test]
fn test_sequence_elements_follow_host_holes() {
    let arr = Handle::from_raw(Value::array(vec![Value::Undefined, Value::Null]));
    let items = arr.must_array();
    assert!(items[0].is_undefined());
    assert!(items[1].is_null());
}

#[test]
#[should_panic(expected = "must_array failed")]
fn test_must_array_on_plain_object_panics() {
    host(json!({})).must_array();
}

#[test]
#[should_panic(expected = "must_length failed")]
fn test_must_length_on_string_panics() {
    Handle::from("abc").must_length();
}

#[test]
fn test_record_of_sparse_array_skips_holes() {
    let arr = host(json!([]));
    arr.set("3", &"x").unwrap();
    let record = arr.must_object();
    let keys: Vec<&String> = record.keys().collect();
    assert_eq!(keys, ["3"]);
    // The sequence view still walks 0..length
    assert_eq!(arr.must_array().len(), 4);
}
