//! In-memory host environment.
//!
//! A small JavaScript-shaped object model that implements [`Bridge`] without a
//! real engine. Native builds and the test suite run against it.
//!
//! It has the parts of the host semantics the interop layer depends on:
//! - the `typeof` taxonomy
//! - `undefined` for absent members, with prototype-chain lookup
//! - arrays with a live `length`
//! - callable native functions and guest callbacks
//! - a per-thread global object with `Object`, `Array` and `JSON`
//! - `JSON.stringify`/`JSON.parse` with the usual quirks (undefined and
//!   function members dropped, cycles rejected)
//!
//! Objects are reference counted, so aliasing behaves like a garbage-collected
//! heap: every handle to an object sees every write to it. Reference cycles
//! are never collected, which is acceptable for a test host.

mod builtins;
mod json;

use crate::bridge::{Bridge, RawCallback, TypeTag};
use crate::error::HostError;
use crate::prelude::*;
use log::warn;

/// Signature of a host-native function: receiver, then positional arguments.
pub type NativeFn = fn(&Value, &[Value]) -> Result<Value, HostError>;

/// A host value
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(Rc<str>),
    Object(ObjectRef),
}

impl CheapClone for Value {}

impl Value {
    pub fn string(value: &str) -> Self {
        Value::String(Rc::from(value))
    }

    /// A new array whose prototype is the realm's `Array.prototype`
    pub fn array(elements: Vec<Value>) -> Self {
        Value::sparse_array(elements.into_iter().map(Some).collect())
    }

    /// Like [`Value::array`]; `None` slots are holes
    pub fn sparse_array(elements: Vec<Option<Value>>) -> Self {
        let mut object = Object::new(ObjectKind::Array(elements));
        object.prototype = Some(array_prototype());
        Value::Object(ObjectRef::new(object))
    }

    /// A new ordinary object with the given members, in order
    pub fn object<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut object = Object::ordinary();
        for (key, value) in entries {
            object.properties.insert(key.into(), value);
        }
        Value::Object(ObjectRef::new(object))
    }

    pub fn native_function(name: &'static str, func: NativeFn) -> Self {
        Value::Object(ObjectRef::new(Object::new(ObjectKind::Function(
            Function::Native { name, func },
        ))))
    }

    /// Build a host value from its JSON shape
    pub fn from_json(json: &serde_json::Value) -> Self {
        json::from_json(json)
    }

    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Undefined => TypeTag::Undefined,
            Value::Null => TypeTag::Null,
            Value::Boolean(_) => TypeTag::Boolean,
            Value::Number(_) => TypeTag::Number,
            Value::String(_) => TypeTag::String,
            Value::Object(obj) => {
                if obj.is_callable() {
                    TypeTag::Function
                } else {
                    TypeTag::Object
                }
            }
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        self.as_object().is_some_and(ObjectRef::is_callable)
    }

    pub fn is_array(&self) -> bool {
        self.as_object()
            .is_some_and(|obj| matches!(obj.borrow().kind, ObjectKind::Array(_)))
    }

    /// Strict equality (===)
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            // NaN !== NaN falls out of f64 comparison
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// ToString, for the few builtins that need it
    pub(crate) fn to_display_string(&self) -> String {
        match self {
            Value::Undefined => String::from("undefined"),
            Value::Null => String::from("null"),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.to_string(),
            Value::Object(obj) => {
                if obj.is_callable() {
                    String::from("function () { [native code] }")
                } else {
                    String::from("[object Object]")
                }
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Object(obj) => match &obj.borrow().kind {
                ObjectKind::Ordinary => write!(f, "{{...}}"),
                ObjectKind::Array(elements) => write!(f, "Array({})", elements.len()),
                ObjectKind::Function(Function::Native { name, .. }) => {
                    write!(f, "[Function: {}]", name)
                }
                ObjectKind::Function(Function::Callback(_)) => write!(f, "[Function: callback]"),
            },
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(Rc::from(value))
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        String::from("NaN")
    } else if n.is_infinite() {
        if n > 0.0 {
            String::from("Infinity")
        } else {
            String::from("-Infinity")
        }
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Shared, mutable reference to a host object
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<Object>>);

impl CheapClone for ObjectRef {}

impl ObjectRef {
    pub fn new(object: Object) -> Self {
        ObjectRef(Rc::new(RefCell::new(object)))
    }

    pub fn borrow(&self) -> core::cell::Ref<'_, Object> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> core::cell::RefMut<'_, Object> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address-based identity, stable while the object is alive
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.borrow().kind, ObjectKind::Function(_))
    }

    /// Member lookup along the prototype chain
    pub fn get(&self, name: &str) -> Value {
        let mut current = Some(self.cheap_clone());
        while let Some(obj) = current {
            let object = obj.borrow();
            if let Some(value) = object.own_property(name) {
                return value;
            }
            current = object.prototype.clone();
        }
        Value::Undefined
    }

    /// Write an own member. Arrays treat `length` and canonical indices
    /// specially.
    pub fn set(&self, name: &str, value: Value) -> Result<(), HostError> {
        let mut object = self.borrow_mut();
        if let ObjectKind::Array(elements) = &mut object.kind {
            if name == "length" {
                let len = to_array_length(&value)?;
                return resize_elements(elements, len);
            }
            if let Some(index) = array_index(name) {
                if index >= elements.len() {
                    resize_elements(elements, index + 1)?;
                }
                if let Some(slot) = elements.get_mut(index) {
                    *slot = Some(value);
                }
                return Ok(());
            }
        }
        object.properties.insert(name.to_string(), value);
        Ok(())
    }
}

/// Host object storage
pub struct Object {
    pub kind: ObjectKind,
    pub properties: IndexMap<String, Value>,
    pub prototype: Option<ObjectRef>,
}

impl Object {
    pub fn new(kind: ObjectKind) -> Self {
        Object {
            kind,
            properties: index_map_new(),
            prototype: None,
        }
    }

    pub fn ordinary() -> Self {
        Object::new(ObjectKind::Ordinary)
    }

    fn own_property(&self, name: &str) -> Option<Value> {
        if let ObjectKind::Array(elements) = &self.kind {
            if name == "length" {
                return Some(Value::Number(elements.len() as f64));
            }
            if let Some(index) = array_index(name) {
                // A hole is absent, so the lookup moves on to the prototype
                return elements.get(index).cloned().flatten();
            }
        }
        self.properties.get(name).cloned()
    }

    fn own_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        if let ObjectKind::Array(elements) = &self.kind {
            keys.extend(
                elements
                    .iter()
                    .enumerate()
                    .filter(|(_, element)| element.is_some())
                    .map(|(i, _)| i.to_string()),
            );
        }
        keys.extend(self.properties.keys().cloned());
        keys
    }
}

pub enum ObjectKind {
    Ordinary,
    /// Dense storage; `None` marks a hole
    Array(Vec<Option<Value>>),
    Function(Function),
}

#[derive(Clone)]
pub enum Function {
    Native { name: &'static str, func: NativeFn },
    /// A guest closure. The host only holds a weak reference; the guest's
    /// keep-alive owns it.
    Callback(Weak<dyn Fn(&[Value])>),
}

/// Largest valid array length, 2^32 - 1
pub(crate) const MAX_ARRAY_LENGTH: u32 = u32::MAX;

/// Canonical array index: "0", "1", ... but not "01" or "+1". Indices stop
/// below `MAX_ARRAY_LENGTH`; larger keys are ordinary properties.
fn array_index(name: &str) -> Option<usize> {
    name.parse::<u32>()
        .ok()
        .filter(|index| *index < MAX_ARRAY_LENGTH && index.to_string() == name)
        .map(|index| index as usize)
}

pub(crate) fn invalid_array_length() -> HostError {
    HostError::exception("RangeError: Invalid array length")
}

/// A number usable as an array length: whole, non-negative, at most 2^32 - 1
pub(crate) fn to_array_length(value: &Value) -> Result<usize, HostError> {
    match value {
        Value::Number(n)
            if n.is_finite()
                && *n >= 0.0
                && n.fract() == 0.0
                && *n <= f64::from(MAX_ARRAY_LENGTH) =>
        {
            Ok(*n as usize)
        }
        _ => Err(invalid_array_length()),
    }
}

/// Elements are stored densely; a length the allocator refuses is a
/// `RangeError` rather than an abort.
pub(crate) fn resize_elements(elements: &mut Vec<Option<Value>>, len: usize) -> Result<(), HostError> {
    if let Some(extra) = len.checked_sub(elements.len()) {
        elements
            .try_reserve_exact(extra)
            .map_err(|_| invalid_array_length())?;
    }
    elements.resize(len, None);
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Realm (per-thread global state)
// ═══════════════════════════════════════════════════════════════════════════════

struct Realm {
    global: ObjectRef,
    array_prototype: ObjectRef,
}

impl Realm {
    fn new() -> Self {
        let array_prototype = ObjectRef::new(Object::ordinary());
        builtins::init_array_prototype(&array_prototype);

        let global = ObjectRef::new(Object::ordinary());
        builtins::init_globals(&global);

        Realm {
            global,
            array_prototype,
        }
    }
}

thread_local! {
    static REALM: RefCell<Realm> = RefCell::new(Realm::new());
}

fn array_prototype() -> ObjectRef {
    REALM.with(|realm| realm.borrow().array_prototype.cheap_clone())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Bridge implementation
// ═══════════════════════════════════════════════════════════════════════════════

/// The in-memory host bridge
#[derive(Debug, Clone, Copy, Default)]
pub struct Sandbox;

impl Sandbox {
    /// Replace this thread's global object with a fresh one
    pub fn reset() {
        let fresh = Realm::new();
        REALM.with(|realm| *realm.borrow_mut() = fresh);
    }

    /// Call `function` from the host side, the way an event loop would
    /// dispatch a stored handler. The receiver is `undefined`.
    pub fn invoke(function: &Value, args: &[Value]) -> Result<Value, HostError> {
        call_function(function, &Value::Undefined, args)
    }
}

fn call_function(function: &Value, this: &Value, args: &[Value]) -> Result<Value, HostError> {
    // Take the target out before calling so no borrow is held while guest code
    // runs; callbacks may re-enter and touch this very object.
    let target = match function {
        Value::Object(obj) => match &obj.borrow().kind {
            ObjectKind::Function(f) => Some(f.clone()),
            _ => None,
        },
        _ => None,
    };

    match target {
        Some(Function::Native { func, .. }) => func(this, args),
        Some(Function::Callback(callback)) => match callback.upgrade() {
            Some(callback) => {
                callback(args);
                Ok(Value::Undefined)
            }
            None => {
                warn!("host invoked a callback after its registration was released");
                Err(HostError::Released)
            }
        },
        None => Err(HostError::type_error(format!(
            "{:?} is not a function",
            function
        ))),
    }
}

impl Bridge for Sandbox {
    type Ref = Value;
    type Keepalive = RawCallback<Value>;

    fn global() -> Value {
        REALM.with(|realm| Value::Object(realm.borrow().global.cheap_clone()))
    }

    fn type_of(value: &Value) -> TypeTag {
        value.type_tag()
    }

    fn get_member(value: &Value, name: &str) -> Value {
        match value {
            Value::Object(obj) => obj.get(name),
            Value::String(s) if name == "length" => Value::Number(s.encode_utf16().count() as f64),
            _ => Value::Undefined,
        }
    }

    fn set_member(value: &Value, name: &str, member: Value) -> Result<(), HostError> {
        match value {
            Value::Object(obj) => obj.set(name, member),
            Value::Null | Value::Undefined => Err(HostError::type_error(format!(
                "Cannot set properties of {:?} (setting '{}')",
                value, name
            ))),
            // Writes to primitives are silently dropped
            _ => Ok(()),
        }
    }

    fn call_method(value: &Value, name: &str, args: &[Value]) -> Result<Value, HostError> {
        let function = Self::get_member(value, name);
        if !function.is_callable() {
            return Err(HostError::not_callable(name));
        }
        call_function(&function, value, args)
    }

    fn construct(constructor: &Value, args: &[Value]) -> Result<Value, HostError> {
        if !constructor.is_callable() {
            return Err(HostError::type_error(format!(
                "{:?} is not a constructor",
                constructor
            )));
        }
        let instance = Value::Object(ObjectRef::new(Object::ordinary()));
        let result = call_function(constructor, &instance, args)?;
        Ok(match result {
            Value::Object(_) => result,
            _ => instance,
        })
    }

    fn is_array(value: &Value) -> bool {
        value.is_array()
    }

    fn length(value: &Value) -> usize {
        match Self::get_member(value, "length") {
            Value::Number(n) if n.is_finite() && n > 0.0 => n.trunc() as usize,
            _ => 0,
        }
    }

    fn index_get(value: &Value, index: usize) -> Value {
        Self::get_member(value, &index.to_string())
    }

    fn own_keys(value: &Value) -> Vec<String> {
        match value {
            Value::Object(obj) => obj.borrow().own_keys(),
            _ => Vec::new(),
        }
    }

    fn serialize(value: &Value) -> Result<String, HostError> {
        json::stringify(value)?
            .ok_or_else(|| HostError::type_error(format!("{:?} has no JSON form", value)))
    }

    fn parse(text: &str) -> Result<Value, HostError> {
        json::parse(text)
    }

    fn undefined() -> Value {
        Value::Undefined
    }

    fn null() -> Value {
        Value::Null
    }

    fn boolean(value: bool) -> Value {
        Value::Boolean(value)
    }

    fn number(value: f64) -> Value {
        Value::Number(value)
    }

    fn string(value: &str) -> Value {
        Value::string(value)
    }

    fn as_bool(value: &Value) -> Option<bool> {
        match value {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    fn as_number(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn as_string(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.to_string()),
            _ => None,
        }
    }

    fn new_object() -> Value {
        Value::Object(ObjectRef::new(Object::ordinary()))
    }

    fn new_array(items: Vec<Value>) -> Value {
        Value::array(items)
    }

    fn strict_equals(a: &Value, b: &Value) -> bool {
        a.strict_equals(b)
    }

    fn make_function(callback: RawCallback<Value>) -> (Value, RawCallback<Value>) {
        let function = Function::Callback(Rc::downgrade(&callback));
        let value = Value::Object(ObjectRef::new(Object::new(ObjectKind::Function(function))));
        (value, callback)
    }
}
