//! Host bridge primitives.
//!
//! The [`Bridge`] trait is the entire surface the interop layer needs from a
//! host environment: member access, method dispatch, construction, type
//! queries, array indexing, key reflection, and a canonical textual
//! serialize/parse pair. Everything above this module is written in terms of
//! it and never touches a host reference any other way.
//!
//! Two bridges are provided:
//! - [`web::WebBridge`] talks to a real JavaScript engine through
//!   `wasm-bindgen` (only on `wasm32` with the `wasm` feature)
//! - [`sandbox::Sandbox`] is an in-memory host object model for native builds
//!   and tests
//!
//! [`DefaultBridge`] picks the web bridge when it is compiled in and the
//! sandbox otherwise.

pub mod sandbox;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub mod web;

use crate::error::HostError;
use crate::prelude::*;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub type DefaultBridge = web::WebBridge;

#[cfg(not(all(target_arch = "wasm32", feature = "wasm")))]
pub type DefaultBridge = sandbox::Sandbox;

/// Callback shape handed to [`Bridge::make_function`]: receives the raw host
/// arguments of one invocation.
pub type RawCallback<R> = Rc<dyn Fn(&[R])>;

/// Coarse type category reported by the host for any value.
///
/// Mirrors the JavaScript `typeof` taxonomy, except that `null` gets its own
/// tag instead of reporting `object`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Symbol,
    BigInt,
    Object,
    Function,
}

impl TypeTag {
    /// Lower-case host name of the category
    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::Undefined => "undefined",
            TypeTag::Null => "null",
            TypeTag::Boolean => "boolean",
            TypeTag::Number => "number",
            TypeTag::String => "string",
            TypeTag::Symbol => "symbol",
            TypeTag::BigInt => "bigint",
            TypeTag::Object => "object",
            TypeTag::Function => "function",
        }
    }

    /// Map a `typeof` result to a tag. `typeof null` is `"object"`, so callers
    /// must check for null before relying on this.
    pub fn from_typeof(name: &str) -> Option<TypeTag> {
        Some(match name {
            "undefined" => TypeTag::Undefined,
            "boolean" => TypeTag::Boolean,
            "number" => TypeTag::Number,
            "string" => TypeTag::String,
            "symbol" => TypeTag::Symbol,
            "bigint" => TypeTag::BigInt,
            "object" => TypeTag::Object,
            "function" => TypeTag::Function,
            _ => return None,
        })
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Foreign-call surface of a host environment.
///
/// All primitives are associated functions: the host is a single, process-wide
/// runtime, and a `Ref` alone is enough to reach the value it names. A `Ref` is
/// a non-owning view; cloning it must never duplicate host state.
///
/// The host is single-threaded from the guest's point of view. Implementations
/// must tolerate re-entrant calls: a callback made from inside
/// [`call_method`](Bridge::call_method) may call back into any primitive.
pub trait Bridge: Sized + 'static {
    /// Reference to one host value
    type Ref: Clone + fmt::Debug + 'static;

    /// Guest-side owner of a function created by [`make_function`](Bridge::make_function).
    /// Dropping it releases the guest closure.
    type Keepalive;

    /// The host's global object
    fn global() -> Self::Ref;

    /// Current type category of `value`, queried fresh every time
    fn type_of(value: &Self::Ref) -> TypeTag;

    /// Read a member through the host's own lookup rules (prototype chain
    /// included). Absent members, and lookups the host rejects outright, yield
    /// `undefined`.
    fn get_member(value: &Self::Ref, name: &str) -> Self::Ref;

    fn set_member(value: &Self::Ref, name: &str, member: Self::Ref) -> Result<(), HostError>;

    /// Create or overwrite an own, enumerable data member without going
    /// through setters, so a `"__proto__"` key stays an ordinary member.
    /// Used to build fresh objects from guest maps.
    fn define_member(value: &Self::Ref, name: &str, member: Self::Ref) -> Result<(), HostError> {
        Self::set_member(value, name, member)
    }

    /// Invoke the member `name` with `value` as the receiver.
    ///
    /// A member that is absent or not callable fails with
    /// [`HostError::NotCallable`]; exceptions raised inside the call surface as
    /// [`HostError::Exception`].
    fn call_method(
        value: &Self::Ref,
        name: &str,
        args: &[Self::Ref],
    ) -> Result<Self::Ref, HostError>;

    /// `new constructor(...args)`
    fn construct(constructor: &Self::Ref, args: &[Self::Ref]) -> Result<Self::Ref, HostError>;

    /// Host `Array.isArray` classification
    fn is_array(value: &Self::Ref) -> bool;

    /// The host's own `length` answer, truncated to an integer. Values with no
    /// numeric `length` report 0.
    fn length(value: &Self::Ref) -> usize;

    fn index_get(value: &Self::Ref, index: usize) -> Self::Ref;

    /// Own enumerable string keys, in host enumeration order (`Object.keys`)
    fn own_keys(value: &Self::Ref) -> Vec<String>;

    /// Canonical textual form (`JSON.stringify`)
    fn serialize(value: &Self::Ref) -> Result<String, HostError>;

    /// Inverse of [`serialize`](Bridge::serialize) (`JSON.parse`)
    fn parse(text: &str) -> Result<Self::Ref, HostError>;

    fn undefined() -> Self::Ref;
    fn null() -> Self::Ref;
    fn boolean(value: bool) -> Self::Ref;
    fn number(value: f64) -> Self::Ref;
    fn string(value: &str) -> Self::Ref;

    fn as_bool(value: &Self::Ref) -> Option<bool>;
    fn as_number(value: &Self::Ref) -> Option<f64>;
    fn as_string(value: &Self::Ref) -> Option<String>;

    /// A fresh, empty ordinary object
    fn new_object() -> Self::Ref;

    fn new_array(items: Vec<Self::Ref>) -> Self::Ref;

    /// Host `===`
    fn strict_equals(a: &Self::Ref, b: &Self::Ref) -> bool;

    /// Wrap a guest closure as a host function.
    ///
    /// The host may keep the returned function and invoke it at any later time,
    /// but the closure only lives as long as the returned `Keepalive`.
    fn make_function(callback: RawCallback<Self::Ref>) -> (Self::Ref, Self::Keepalive);
}
