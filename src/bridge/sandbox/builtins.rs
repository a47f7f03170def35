//! Global objects of the sandbox realm: `Object`, `Array`, `JSON`, and
//! `Array.prototype`

use super::{
    MAX_ARRAY_LENGTH, NativeFn, ObjectKind, ObjectRef, Sandbox, Value, invalid_array_length, json,
    resize_elements, to_array_length,
};
use crate::bridge::Bridge;
use crate::error::HostError;
use crate::prelude::*;

fn register_method(obj: &ObjectRef, name: &'static str, func: NativeFn) {
    obj.borrow_mut()
        .properties
        .insert(name.to_string(), Value::native_function(name, func));
}

pub(super) fn init_globals(global: &ObjectRef) {
    let object = Value::native_function("Object", object_constructor);
    if let Some(obj) = object.as_object() {
        register_method(obj, "keys", object_keys);
    }

    let array = Value::native_function("Array", array_constructor);
    if let Some(obj) = array.as_object() {
        register_method(obj, "isArray", array_is_array);
        register_method(obj, "of", array_of);
        register_method(obj, "from", array_from);
    }

    let json = ObjectRef::new(super::Object::ordinary());
    register_method(&json, "stringify", json_stringify);
    register_method(&json, "parse", json_parse);

    let mut global = global.borrow_mut();
    global.properties.insert("Object".to_string(), object);
    global.properties.insert("Array".to_string(), array);
    global
        .properties
        .insert("JSON".to_string(), Value::Object(json));
}

pub(super) fn init_array_prototype(proto: &ObjectRef) {
    register_method(proto, "push", array_push);
    register_method(proto, "join", array_join);
}

fn first_arg(args: &[Value]) -> Value {
    args.first().cloned().unwrap_or_default()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Object
// ═══════════════════════════════════════════════════════════════════════════════

fn object_constructor(_this: &Value, args: &[Value]) -> Result<Value, HostError> {
    match args.first() {
        Some(value @ Value::Object(_)) => Ok(value.cheap_clone()),
        _ => Ok(Sandbox::new_object()),
    }
}

fn object_keys(_this: &Value, args: &[Value]) -> Result<Value, HostError> {
    let target = first_arg(args);
    if matches!(target, Value::Null | Value::Undefined) {
        return Err(HostError::type_error(
            "Cannot convert undefined or null to object",
        ));
    }
    let keys = Sandbox::own_keys(&target);
    Ok(Value::array(keys.into_iter().map(Value::from).collect()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Array
// ═══════════════════════════════════════════════════════════════════════════════

fn array_constructor(_this: &Value, args: &[Value]) -> Result<Value, HostError> {
    // A single numeric argument is a length, not an element
    if let [length @ Value::Number(_)] = args {
        let mut elements = Vec::new();
        resize_elements(&mut elements, to_array_length(length)?)?;
        return Ok(Value::sparse_array(elements));
    }
    Ok(Value::array(args.to_vec()))
}

fn array_is_array(_this: &Value, args: &[Value]) -> Result<Value, HostError> {
    Ok(Value::Boolean(args.first().is_some_and(Value::is_array)))
}

fn array_of(_this: &Value, args: &[Value]) -> Result<Value, HostError> {
    Ok(Value::array(args.to_vec()))
}

fn array_from(_this: &Value, args: &[Value]) -> Result<Value, HostError> {
    let source = first_arg(args);
    let elements = match &source {
        Value::Null | Value::Undefined => {
            return Err(HostError::type_error(format!(
                "{:?} is not iterable",
                source
            )));
        }
        Value::String(s) => s.chars().map(|c| Value::from(c.to_string())).collect(),
        Value::Object(_) => {
            let len = Sandbox::length(&source);
            if len > MAX_ARRAY_LENGTH as usize {
                return Err(invalid_array_length());
            }
            (0..len).map(|i| Sandbox::index_get(&source, i)).collect()
        }
        _ => Vec::new(),
    };
    Ok(Value::array(elements))
}

fn array_push(this: &Value, args: &[Value]) -> Result<Value, HostError> {
    let obj = this
        .as_object()
        .ok_or_else(|| HostError::type_error("Array.prototype.push called on non-object"))?;
    let mut object = obj.borrow_mut();
    match &mut object.kind {
        ObjectKind::Array(elements) => {
            elements.extend(args.iter().cloned().map(Some));
            Ok(Value::Number(elements.len() as f64))
        }
        _ => Err(HostError::type_error(
            "Array.prototype.push called on non-array",
        )),
    }
}

fn array_join(this: &Value, args: &[Value]) -> Result<Value, HostError> {
    let separator = match args.first() {
        None | Some(Value::Undefined) => String::from(","),
        Some(value) => value.to_display_string(),
    };
    let elements = match this.as_object() {
        Some(obj) => match &obj.borrow().kind {
            ObjectKind::Array(elements) => elements.clone(),
            _ => Vec::new(),
        },
        None => Vec::new(),
    };
    let parts: Vec<String> = elements
        .iter()
        .map(|element| match element {
            None | Some(Value::Undefined | Value::Null) => String::new(),
            Some(other) => other.to_display_string(),
        })
        .collect();
    Ok(Value::from(parts.join(&separator)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// JSON
// ═══════════════════════════════════════════════════════════════════════════════

fn json_stringify(_this: &Value, args: &[Value]) -> Result<Value, HostError> {
    Ok(match json::stringify(&first_arg(args))? {
        Some(text) => Value::from(text),
        None => Value::Undefined,
    })
}

fn json_parse(_this: &Value, args: &[Value]) -> Result<Value, HostError> {
    let text = first_arg(args);
    match &text {
        Value::String(s) => json::parse(s),
        other => json::parse(&other.to_display_string()),
    }
}
