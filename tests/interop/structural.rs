use super::{Handle, host};
use jsinterop::bridge::sandbox::Value;
use jsinterop::{Bridge, CodecError, Sandbox, TypeTag};
use serde::Deserialize;
use serde_json::json;

#[test]
fn test_round_trip_is_exact_for_json_shapes() {
    let original = json!({
        "s": "text",
        "n": -12,
        "f": 1.5,
        "b": true,
        "z": null,
        "list": [1, "two", [3], {"four": 4}],
    });
    let back = host(original.clone()).must_to_structural();
    assert_eq!(back, original);
}

#[test]
fn test_lossy_members_are_documented_behavior() {
    let obj = host(json!({"kept": 1}));
    obj.set("nothing", &()).unwrap();
    obj.set("method", &Handle::global().get("Object")).unwrap();
    obj.set("nan", &f64::NAN).unwrap();

    // The host still has every member
    assert!(obj.get("method").is_function());
    assert_eq!(obj.must_length(), 0);

    assert_eq!(
        obj.to_structural().unwrap(),
        json!({"kept": 1, "nan": null})
    );
}

#[test]
fn test_cycles_are_rejected_by_the_host() {
    let a = host(json!({}));
    let b = host(json!({"back": null}));
    a.set("b", &b).unwrap();
    b.set("back", &a).unwrap();
    assert!(matches!(a.to_structural(), Err(CodecError::Host(_))));
    assert_eq!(a.to_structural_or(json!(false)), json!(false));
}

#[test]
fn test_shared_references_are_not_cycles() {
    let shared = host(json!({"v": 1}));
    let holder = Handle::from_raw(Value::object([
        ("x", shared.raw().clone()),
        ("y", shared.raw().clone()),
    ]));
    assert_eq!(
        holder.must_to_structural(),
        json!({"x": {"v": 1}, "y": {"v": 1}})
    );
}

#[test]
fn test_primitives_are_not_structural() {
    let err = Handle::from(true).to_structural().unwrap_err();
    let mismatch = err.as_type_mismatch().unwrap();
    assert_eq!(mismatch.actual, TypeTag::Boolean);
}

#[test]
fn test_decode_into_caller_structure() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Entry {
        key: String,
        #[serde(default)]
        weight: Option<f64>,
    }

    let entries = host(json!([{"key": "a", "weight": 2}, {"key": "b"}]));
    let decoded: Vec<Entry> = entries.decode().unwrap();
    assert_eq!(
        decoded,
        [
            Entry {
                key: "a".to_string(),
                weight: Some(2.0)
            },
            Entry {
                key: "b".to_string(),
                weight: None
            },
        ]
    );
}

#[test]
fn test_encode_builds_fresh_host_values() {
    let encoded = Handle::encode(&vec![("a", 1)]).unwrap();
    assert!(encoded.is_array());
    assert_eq!(encoded.index(0).index(0).must_string(), "a");

    let text = Sandbox::serialize(encoded.raw()).unwrap();
    assert_eq!(text, r#"[["a",1]]"#);
}

#[test]
fn test_large_whole_numbers_keep_their_value() {
    let obj = host(json!({}));
    obj.set("n", &2f64.powi(63)).unwrap();
    let back = obj.must_to_structural();
    assert_eq!(back["n"].as_f64(), Some(9223372036854775808.0));
    assert_ne!(back["n"].as_i64(), Some(i64::MAX));
}
