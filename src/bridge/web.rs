//! Host bridge for a real JavaScript engine, via `wasm-bindgen` and `js-sys`.
//!
//! Every primitive goes through `Reflect`, so lookups follow the engine's own
//! rules (prototype chain, getters, proxies). Exceptions thrown by the engine
//! come back as [`HostError::Exception`] carrying the thrown value's string
//! form.

use crate::bridge::{Bridge, RawCallback, TypeTag};
use crate::error::HostError;
use crate::prelude::*;
use js_sys::{Array, Function, JSON, Object, Reflect};
use log::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

// ═══════════════════════════════════════════════════════════════════════════════
// JavaScript bindings
// ═══════════════════════════════════════════════════════════════════════════════

#[wasm_bindgen(inline_js = "export function collect_arguments(callback) { \
    return function (...args) { callback(args); }; \
}")]
extern "C" {
    // Adapts a one-argument closure into a variadic host function: the host's
    // arguments arrive as a single array.
    fn collect_arguments(callback: &JsValue) -> JsValue;
}

/// The `wasm-bindgen` host bridge
#[derive(Debug, Clone, Copy, Default)]
pub struct WebBridge;

fn key(name: &str) -> JsValue {
    JsValue::from_str(name)
}

fn exception(thrown: JsValue) -> HostError {
    let message = thrown
        .dyn_ref::<js_sys::Error>()
        .map(|error| String::from(error.to_string()))
        .or_else(|| thrown.as_string())
        .unwrap_or_else(|| format!("{:?}", thrown));
    HostError::exception(message)
}

/// The object property access would operate on: objects as themselves,
/// primitives boxed the way `value.member` boxes them, `null`/`undefined` not
/// at all.
fn receiver(value: &JsValue) -> Option<JsValue> {
    if value.is_null() || value.is_undefined() {
        return None;
    }
    if value.is_object() || value.is_function() {
        return Some(value.clone());
    }
    Object::new()
        .constructor()
        .call1(&JsValue::UNDEFINED, value)
        .ok()
}

fn to_array(items: &[JsValue]) -> Array {
    items.iter().collect()
}

impl Bridge for WebBridge {
    type Ref = JsValue;
    type Keepalive = Closure<dyn Fn(Array)>;

    fn global() -> JsValue {
        js_sys::global().into()
    }

    fn type_of(value: &JsValue) -> TypeTag {
        if value.is_undefined() {
            TypeTag::Undefined
        } else if value.is_null() {
            TypeTag::Null
        } else if value.as_bool().is_some() {
            TypeTag::Boolean
        } else if value.as_f64().is_some() {
            TypeTag::Number
        } else if value.is_string() {
            TypeTag::String
        } else if value.is_symbol() {
            TypeTag::Symbol
        } else if value.is_bigint() {
            TypeTag::BigInt
        } else if value.is_function() {
            TypeTag::Function
        } else {
            TypeTag::Object
        }
    }

    fn get_member(value: &JsValue, name: &str) -> JsValue {
        let Some(target) = receiver(value) else {
            return JsValue::UNDEFINED;
        };
        Reflect::get(&target, &key(name)).unwrap_or_else(|thrown| {
            warn!("host rejected read of '{}': {:?}", name, thrown);
            JsValue::UNDEFINED
        })
    }

    fn set_member(value: &JsValue, name: &str, member: JsValue) -> Result<(), HostError> {
        if value.is_null() || value.is_undefined() {
            return Err(HostError::type_error(format!(
                "Cannot set properties of {:?} (setting '{}')",
                value, name
            )));
        }
        if !value.is_object() && !value.is_function() {
            // Writes to primitives are silently dropped
            return Ok(());
        }
        Reflect::set(value, &key(name), &member)
            .map(|_| ())
            .map_err(exception)
    }

    fn define_member(value: &JsValue, name: &str, member: JsValue) -> Result<(), HostError> {
        if !value.is_object() && !value.is_function() {
            return Err(HostError::type_error(format!(
                "Object.defineProperty called on non-object {:?}",
                value
            )));
        }
        let descriptor = Object::new();
        for (field, setting) in [
            ("value", member),
            ("writable", JsValue::TRUE),
            ("enumerable", JsValue::TRUE),
            ("configurable", JsValue::TRUE),
        ] {
            Reflect::set(&descriptor, &key(field), &setting).map_err(exception)?;
        }
        let defined = Reflect::define_property(value.unchecked_ref::<Object>(), &key(name), &descriptor)
            .map_err(exception)?;
        if defined {
            Ok(())
        } else {
            Err(HostError::type_error(format!("Cannot define property {}", name)))
        }
    }

    fn call_method(value: &JsValue, name: &str, args: &[JsValue]) -> Result<JsValue, HostError> {
        let function = Self::get_member(value, name)
            .dyn_into::<Function>()
            .map_err(|_| HostError::not_callable(name))?;
        Reflect::apply(&function, value, &to_array(args)).map_err(exception)
    }

    fn construct(constructor: &JsValue, args: &[JsValue]) -> Result<JsValue, HostError> {
        let function = constructor.dyn_ref::<Function>().ok_or_else(|| {
            HostError::type_error(format!("{:?} is not a constructor", constructor))
        })?;
        Reflect::construct(function, &to_array(args)).map_err(exception)
    }

    fn is_array(value: &JsValue) -> bool {
        Array::is_array(value)
    }

    fn length(value: &JsValue) -> usize {
        match Self::get_member(value, "length").as_f64() {
            Some(n) if n.is_finite() && n > 0.0 => n.trunc() as usize,
            _ => 0,
        }
    }

    fn index_get(value: &JsValue, index: usize) -> JsValue {
        let Some(target) = receiver(value) else {
            return JsValue::UNDEFINED;
        };
        Reflect::get(&target, &JsValue::from_f64(index as f64)).unwrap_or_else(|thrown| {
            warn!("host rejected read of index {}: {:?}", index, thrown);
            JsValue::UNDEFINED
        })
    }

    fn own_keys(value: &JsValue) -> Vec<String> {
        match receiver(value) {
            Some(target) => Object::keys(target.unchecked_ref::<Object>())
                .iter()
                .filter_map(|key| key.as_string())
                .collect(),
            None => Vec::new(),
        }
    }

    fn serialize(value: &JsValue) -> Result<String, HostError> {
        let text: JsValue = JSON::stringify(value).map_err(exception)?.into();
        text.as_string()
            .ok_or_else(|| HostError::type_error(format!("{:?} has no JSON form", value)))
    }

    fn parse(text: &str) -> Result<JsValue, HostError> {
        JSON::parse(text).map_err(exception)
    }

    fn undefined() -> JsValue {
        JsValue::UNDEFINED
    }

    fn null() -> JsValue {
        JsValue::NULL
    }

    fn boolean(value: bool) -> JsValue {
        JsValue::from_bool(value)
    }

    fn number(value: f64) -> JsValue {
        JsValue::from_f64(value)
    }

    fn string(value: &str) -> JsValue {
        JsValue::from_str(value)
    }

    fn as_bool(value: &JsValue) -> Option<bool> {
        value.as_bool()
    }

    fn as_number(value: &JsValue) -> Option<f64> {
        value.as_f64()
    }

    fn as_string(value: &JsValue) -> Option<String> {
        value.as_string()
    }

    fn new_object() -> JsValue {
        Object::new().into()
    }

    fn new_array(items: Vec<JsValue>) -> JsValue {
        items.into_iter().collect::<Array>().into()
    }

    fn strict_equals(a: &JsValue, b: &JsValue) -> bool {
        a == b
    }

    fn make_function(callback: RawCallback<JsValue>) -> (JsValue, Closure<dyn Fn(Array)>) {
        let closure = Closure::<dyn Fn(Array)>::new(move |args: Array| {
            let args: Vec<JsValue> = args.iter().collect();
            callback(&args);
        });
        let function = collect_arguments(closure.as_ref());
        (function, closure)
    }
}
