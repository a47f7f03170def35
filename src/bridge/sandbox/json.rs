//! `JSON.stringify` / `JSON.parse` for the sandbox host

use super::{Object, ObjectKind, ObjectRef, Value};
use crate::error::HostError;
use crate::prelude::*;

/// Serialize a host value the way `JSON.stringify` does.
///
/// Returns `None` where `JSON.stringify` returns `undefined` (for `undefined`
/// and functions at the top level). Nested `undefined` and function members are
/// dropped from objects and become `null` inside arrays. Non-finite numbers
/// become `null`. Cycles are rejected.
pub(super) fn stringify(value: &Value) -> Result<Option<String>, HostError> {
    let mut stack = FxHashSet::default();
    Ok(to_json(value, &mut stack)?.map(|json| json.to_string()))
}

pub(super) fn parse(text: &str) -> Result<Value, HostError> {
    let json: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| HostError::syntax_error(format!("JSON.parse: {}", e)))?;
    Ok(from_json(&json))
}

pub(super) fn from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::string(s),
        serde_json::Value::Array(items) => Value::array(items.iter().map(from_json).collect()),
        serde_json::Value::Object(map) => {
            let mut object = Object::ordinary();
            for (key, item) in map {
                object.properties.insert(key.clone(), from_json(item));
            }
            Value::Object(ObjectRef::new(object))
        }
    }
}

/// Members copied out of an object so no borrow is held while recursing
enum Snapshot {
    Elements(Vec<Option<Value>>),
    Entries(Vec<(String, Value)>),
}

/// `stack` holds the ids of the objects currently being serialized. Shared
/// (non-cyclic) references are fine; only an object that contains itself is
/// rejected.
fn to_json(value: &Value, stack: &mut FxHashSet<usize>) -> Result<Option<serde_json::Value>, HostError> {
    Ok(Some(match value {
        Value::Undefined => return Ok(None),
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => number_to_json(*n),
        Value::String(s) => serde_json::Value::String(s.to_string()),
        Value::Object(obj) => {
            let id = obj.id();
            if stack.contains(&id) {
                return Err(HostError::type_error(
                    "Converting circular structure to JSON",
                ));
            }

            let snapshot = {
                let object = obj.borrow();
                match &object.kind {
                    ObjectKind::Function(_) => return Ok(None),
                    ObjectKind::Array(elements) => Snapshot::Elements(elements.clone()),
                    ObjectKind::Ordinary => Snapshot::Entries(
                        object
                            .properties
                            .iter()
                            .map(|(k, v)| (k.clone(), v.cheap_clone()))
                            .collect(),
                    ),
                }
            };

            stack.insert(id);
            let json = match snapshot {
                Snapshot::Elements(elements) => {
                    let mut items = Vec::with_capacity(elements.len());
                    for element in &elements {
                        let json = match element {
                            Some(element) => to_json(element, stack)?,
                            None => None,
                        };
                        items.push(json.unwrap_or(serde_json::Value::Null));
                    }
                    serde_json::Value::Array(items)
                }
                Snapshot::Entries(entries) => {
                    let mut map = serde_json::Map::new();
                    for (key, member) in entries {
                        if let Some(json) = to_json(&member, stack)? {
                            map.insert(key, json);
                        }
                    }
                    serde_json::Value::Object(map)
                }
            };
            stack.remove(&id);
            json
        }
    }))
}

fn number_to_json(n: f64) -> serde_json::Value {
    if !n.is_finite() {
        return serde_json::Value::Null;
    }
    // Whole numbers print without a fraction, as the host does
    // `i64::MAX as f64` rounds up to 2^63, which `as i64` would saturate
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        serde_json::Value::Number(serde_json::Number::from(n as i64))
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}
