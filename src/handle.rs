//! Value handles: the only type that crosses the host boundary.
//!
//! A [`ValueHandle`] names one host value. It caches nothing: every query goes
//! back to the host, because host values are mutable and shared with code the
//! guest cannot see. Copying a handle copies the reference, never the value,
//! so a `set` through one handle is visible through every other handle to the
//! same value.
//!
//! # Example
//!
//! ```
//! use jsinterop::{Sandbox, TypeTag, ValueHandle};
//!
//! let config = ValueHandle::<Sandbox>::from_structural(&serde_json::json!({
//!     "title": "hello",
//! }))?;
//! config.set("retries", &3)?;
//!
//! assert_eq!(config.get("title").type_tag(), TypeTag::String);
//! assert!(config.exists("retries"));
//! assert!(config.get("missing").is_undefined());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::bridge::{Bridge, DefaultBridge, TypeTag};
use crate::error::HostError;
use crate::marshal::ToHost;
use crate::prelude::*;

/// Non-owning reference to one host value.
///
/// The host owns the value and its lifetime; dropping a handle does not
/// destroy anything.
pub struct ValueHandle<B: Bridge = DefaultBridge> {
    raw: B::Ref,
}

impl<B: Bridge> Clone for ValueHandle<B> {
    fn clone(&self) -> Self {
        ValueHandle {
            raw: self.raw.clone(),
        }
    }
}

impl<B: Bridge> CheapClone for ValueHandle<B> {}

impl<B: Bridge> fmt::Debug for ValueHandle<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ValueHandle").field(&self.raw).finish()
    }
}

impl<B: Bridge> ValueHandle<B> {
    /// Wrap a raw host reference
    pub fn from_raw(raw: B::Ref) -> Self {
        ValueHandle { raw }
    }

    pub fn raw(&self) -> &B::Ref {
        &self.raw
    }

    pub fn into_raw(self) -> B::Ref {
        self.raw
    }

    /// The host's global object, root of every navigation
    pub fn global() -> Self {
        Self::from_raw(B::global())
    }

    pub fn undefined() -> Self {
        Self::from_raw(B::undefined())
    }

    pub fn null() -> Self {
        Self::from_raw(B::null())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Navigation and mutation
    // ═══════════════════════════════════════════════════════════════════════════

    /// Read a member. Never fails: an absent member, or a read the host
    /// rejects, gives an `undefined` handle. Shape errors surface later, at
    /// typed extraction.
    pub fn get(&self, name: &str) -> Self {
        Self::from_raw(B::get_member(&self.raw, name))
    }

    /// Write a member. `value` can be a primitive, another handle (the host
    /// then holds the same value under two names), or a composite the bridge
    /// marshals into fresh host objects.
    pub fn set<V: ToHost<B> + ?Sized>(&self, name: &str, value: &V) -> Result<(), HostError> {
        B::set_member(&self.raw, name, ToHost::<B>::to_host(value))
    }

    /// Invoke the method `method` with this value as the receiver.
    ///
    /// Nothing is checked locally before dispatch. If the member is missing or
    /// not callable the host's answer is [`HostError::NotCallable`], and an
    /// exception thrown by the method comes back as [`HostError::Exception`].
    pub fn call(&self, method: &str, args: &[&dyn ToHost<B>]) -> Result<Self, HostError> {
        let args = marshal_args(args);
        B::call_method(&self.raw, method, &args).map(Self::from_raw)
    }

    /// `new this(...args)`
    pub fn construct(&self, args: &[&dyn ToHost<B>]) -> Result<Self, HostError> {
        let args = marshal_args(args);
        B::construct(&self.raw, &args).map(Self::from_raw)
    }

    /// Indexed read; out-of-range indices give `undefined`
    pub fn index(&self, index: usize) -> Self {
        Self::from_raw(B::index_get(&self.raw, index))
    }

    /// True when the member reads as anything other than `undefined`
    pub fn exists(&self, name: &str) -> bool {
        !self.get(name).is_undefined()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Type queries
    // ═══════════════════════════════════════════════════════════════════════════

    /// Current host type, queried fresh on every call
    pub fn type_tag(&self) -> TypeTag {
        B::type_of(&self.raw)
    }

    pub fn is_null(&self) -> bool {
        self.type_tag() == TypeTag::Null
    }

    pub fn is_undefined(&self) -> bool {
        self.type_tag() == TypeTag::Undefined
    }

    pub fn is_function(&self) -> bool {
        self.type_tag() == TypeTag::Function
    }

    /// Host `Array.isArray`
    pub fn is_array(&self) -> bool {
        B::is_array(&self.raw)
    }

    /// Host `===`: identity for objects, value equality for primitives
    pub fn strict_equals(&self, other: &ValueHandle<B>) -> bool {
        B::strict_equals(&self.raw, &other.raw)
    }
}

fn marshal_args<B: Bridge>(args: &[&dyn ToHost<B>]) -> Vec<B::Ref> {
    args.iter().map(|arg| ToHost::<B>::to_host(*arg)).collect()
}

impl<B: Bridge> From<bool> for ValueHandle<B> {
    fn from(value: bool) -> Self {
        Self::from_raw(B::boolean(value))
    }
}

impl<B: Bridge> From<f64> for ValueHandle<B> {
    fn from(value: f64) -> Self {
        Self::from_raw(B::number(value))
    }
}

impl<B: Bridge> From<i32> for ValueHandle<B> {
    fn from(value: i32) -> Self {
        Self::from_raw(B::number(f64::from(value)))
    }
}

impl<B: Bridge> From<&str> for ValueHandle<B> {
    fn from(value: &str) -> Self {
        Self::from_raw(B::string(value))
    }
}

impl<B: Bridge> From<String> for ValueHandle<B> {
    fn from(value: String) -> Self {
        Self::from_raw(B::string(&value))
    }
}
