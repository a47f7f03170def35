//! Property tests over generated host values

use super::{Handle, host};
use jsinterop::{Sandbox, Structural, ToHost, TypeTag};
use proptest::prelude::*;

fn primitive() -> impl Strategy<Value = Structural> {
    prop_oneof![
        Just(Structural::Null),
        any::<bool>().prop_map(Structural::from),
        any::<i32>().prop_map(Structural::from),
        "[a-zA-Z0-9 ]{0,8}".prop_map(Structural::from),
    ]
}

fn tree() -> impl Strategy<Value = Structural> {
    primitive().prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Structural::from),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|members| Structural::Object(members.into_iter().collect())),
        ]
    })
}

fn tag_of(json: &Structural) -> TypeTag {
    match json {
        Structural::Null => TypeTag::Null,
        Structural::Bool(_) => TypeTag::Boolean,
        Structural::Number(_) => TypeTag::Number,
        Structural::String(_) => TypeTag::String,
        Structural::Array(_) | Structural::Object(_) => TypeTag::Object,
    }
}

proptest! {
    #[test]
    fn extraction_succeeds_iff_tags_match(json in tree()) {
        let handle = Handle::from_raw(ToHost::<Sandbox>::to_host(&json));
        let tag = tag_of(&json);
        prop_assert_eq!(handle.type_tag(), tag);

        let number = tag == TypeTag::Number;
        prop_assert_eq!(handle.bool().is_ok(), tag == TypeTag::Boolean);
        prop_assert_eq!(handle.float().is_ok(), number);
        prop_assert_eq!(handle.int().is_ok(), number);
        prop_assert_eq!(handle.try_extract::<f32>().is_ok(), number);
        prop_assert_eq!(handle.try_extract::<i32>().is_ok(), number);
        prop_assert_eq!(handle.try_extract::<u32>().is_ok(), number);
        prop_assert_eq!(handle.try_extract::<usize>().is_ok(), number);
        prop_assert_eq!(handle.string().is_ok(), tag == TypeTag::String);
        prop_assert_eq!(handle.object().is_ok(), tag == TypeTag::Object);
        prop_assert_eq!(handle.length().is_ok(), tag == TypeTag::Object);
        prop_assert_eq!(handle.array().is_ok(), json.is_array());

        if let Err(mismatch) = handle.string() {
            prop_assert_eq!(mismatch.expected, TypeTag::String);
            prop_assert_eq!(mismatch.actual, tag);
        }
        if let Err(mismatch) = handle.int() {
            prop_assert_eq!(mismatch.expected, TypeTag::Number);
            prop_assert_eq!(mismatch.actual, tag);
        }
        if let Err(mismatch) = handle.array() {
            prop_assert_eq!(mismatch.expected, TypeTag::Object);
            prop_assert_eq!(mismatch.actual, tag);
        }
    }

    #[test]
    fn fallback_returns_default_exactly(json in primitive(), default in ".{0,12}") {
        let handle = Handle::from_raw(ToHost::<Sandbox>::to_host(&json));
        let expected = match &json {
            Structural::String(s) => s.clone(),
            _ => default.clone(),
        };
        prop_assert_eq!(handle.string_or(default), expected);
    }

    #[test]
    fn must_agrees_with_try_on_matching_values(n in any::<i32>()) {
        let handle = Handle::from(n);
        prop_assert_eq!(handle.must_int(), handle.int().unwrap());
        prop_assert_eq!(handle.must_int(), i64::from(n));
    }

    #[test]
    fn structural_round_trip(
        members in prop::collection::btree_map("[a-z]{1,6}", tree(), 0..5)
    ) {
        let original = Structural::Object(members.into_iter().collect());
        let back = host(original.clone()).to_structural().unwrap();
        prop_assert_eq!(back, original);
    }

    #[test]
    fn array_extraction_preserves_order(items in prop::collection::vec(any::<i32>(), 0..16)) {
        let handle = host(Structural::from(items.clone()));
        let values: Vec<i64> = handle
            .must_array()
            .iter()
            .map(|item| item.must_int())
            .collect();
        let expected: Vec<i64> = items.into_iter().map(i64::from).collect();
        prop_assert_eq!(handle.must_length(), expected.len());
        prop_assert_eq!(values, expected);
    }
}
