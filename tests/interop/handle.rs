use super::{Handle, host};
use jsinterop::bridge::sandbox::Value;
use jsinterop::{Bridge, HostError, Sandbox, TypeTag};
use serde_json::json;

#[test]
fn test_global_reaches_builtins() {
    let global = Handle::global();
    assert_eq!(global.type_tag(), TypeTag::Object);
    assert!(global.get("JSON").exists("stringify"));
    assert!(jsinterop::global().strict_equals(&global));
}

#[test]
fn test_prototype_members_are_visible() {
    let arr = host(json!([1, 2]));
    assert!(arr.get("push").is_function());
    assert!(!Sandbox::own_keys(arr.raw()).contains(&"push".to_string()));
}

#[test]
fn test_writes_are_visible_through_aliases() {
    let global = Handle::global();
    let config = host(json!({"mode": "a"}));
    global.set("config", &config).unwrap();

    config.set("mode", &"b").unwrap();
    assert_eq!(global.get("config").get("mode").must_string(), "b");
    assert!(global.get("config").strict_equals(&config));
}

#[test]
fn test_set_on_null_fails_and_on_primitive_is_ignored() {
    let err = Handle::null().set("x", &1).unwrap_err();
    assert!(err.to_string().starts_with("TypeError"));

    let text = Handle::from("abc");
    text.set("x", &1).unwrap();
    assert!(text.get("x").is_undefined());
    assert_eq!(text.get("length").must_int(), 3);
}

#[test]
fn test_call_returns_wrapped_result() {
    let arr = host(json!(["a", "b"]));
    let len = arr.call("push", &[&"c"]).unwrap();
    assert_eq!(len.must_int(), 3);
    assert_eq!(arr.call("join", &[&"-"]).unwrap().must_string(), "a-b-c");
}

#[test]
fn test_call_on_missing_or_non_callable_member() {
    let obj = host(json!({"field": 1}));
    assert_eq!(
        obj.call("missing", &[]).unwrap_err(),
        HostError::not_callable("missing")
    );
    assert_eq!(
        obj.call("field", &[]).unwrap_err(),
        HostError::NotCallable {
            method: "field".to_string()
        }
    );
}

#[test]
fn test_host_exceptions_propagate_unchanged() {
    let object = Handle::global().get("Object");
    let err = object.call("keys", &[&Handle::null()]).unwrap_err();
    assert!(matches!(err, HostError::Exception { .. }));

    let json_api = Handle::global().get("JSON");
    let err = json_api.call("parse", &[&"{broken"]).unwrap_err();
    assert!(err.to_string().starts_with("SyntaxError"));
}

#[test]
fn test_construct() {
    let array = Handle::global().get("Array");
    let made = array.construct(&[&1, &2, &3]).unwrap();
    assert!(made.is_array());
    assert_eq!(made.must_length(), 3);

    assert!(Handle::from(1).construct(&[]).is_err());
}

#[test]
fn test_index_out_of_range_is_undefined() {
    let arr = Handle::from_raw(Value::array(vec![Value::from(1)]));
    assert_eq!(arr.index(0).must_int(), 1);
    assert!(arr.index(5).is_undefined());
}

#[test]
fn test_composite_arguments_are_marshalled() {
    let items = vec![json!({"id": 1}), json!({"id": 2})];
    let copy = Handle::global()
        .get("Array")
        .call("from", &[&items])
        .unwrap();
    assert_eq!(copy.must_length(), 2);
    assert_eq!(copy.index(1).get("id").must_int(), 2);
}

#[test]
fn test_array_writes_follow_host_bounds() {
    let arr = host(json!([0]));
    arr.set("18446744073709551615", &1).unwrap();
    assert_eq!(arr.get("18446744073709551615").must_int(), 1);
    assert_eq!(arr.must_length(), 1);

    let err = arr.set("length", &1e300).unwrap_err();
    assert!(err.to_string().starts_with("RangeError"));

    let array = Handle::global().get("Array");
    assert!(array.construct(&[&1e20]).is_err());
    let array_like = host(json!({"length": 1e20}));
    assert!(array.call("from", &[&array_like]).is_err());
}
