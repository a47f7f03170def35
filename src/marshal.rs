//! Guest-to-host value conversion.
//!
//! [`ToHost`] turns a guest value into a fresh host reference for `set`,
//! `call` and `construct`:
//! - primitives become host primitives
//! - handles pass their reference through unchanged (aliasing, not copying)
//! - sequences, maps and structural values are built member by member into
//!   new host arrays and objects

use crate::bridge::Bridge;
use crate::callback::HostCallable;
use crate::handle::ValueHandle;
use crate::prelude::*;
use log::warn;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Conversion of a guest value into a host reference
pub trait ToHost<B: Bridge> {
    fn to_host(&self) -> B::Ref;
}

impl<B: Bridge, T: ToHost<B> + ?Sized> ToHost<B> for &T {
    fn to_host(&self) -> B::Ref {
        <T as ToHost<B>>::to_host(*self)
    }
}

impl<B: Bridge> ToHost<B> for ValueHandle<B> {
    fn to_host(&self) -> B::Ref {
        self.raw().clone()
    }
}

impl<B: Bridge> ToHost<B> for HostCallable<B> {
    fn to_host(&self) -> B::Ref {
        self.handle().raw().clone()
    }
}

/// `()` marshals to `undefined`
impl<B: Bridge> ToHost<B> for () {
    fn to_host(&self) -> B::Ref {
        B::undefined()
    }
}

impl<B: Bridge> ToHost<B> for bool {
    fn to_host(&self) -> B::Ref {
        B::boolean(*self)
    }
}

impl<B: Bridge> ToHost<B> for str {
    fn to_host(&self) -> B::Ref {
        B::string(self)
    }
}

impl<B: Bridge> ToHost<B> for String {
    fn to_host(&self) -> B::Ref {
        B::string(self)
    }
}

impl<B: Bridge> ToHost<B> for char {
    fn to_host(&self) -> B::Ref {
        B::string(self.encode_utf8(&mut [0; 4]))
    }
}

macro_rules! number_to_host {
    ($($ty:ty),*) => {
        $(
            impl<B: Bridge> ToHost<B> for $ty {
                fn to_host(&self) -> B::Ref {
                    // The host has a single f64 number type; wide integers round
                    B::number(*self as f64)
                }
            }
        )*
    };
}

number_to_host!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// `None` marshals to `null`
impl<B: Bridge, T: ToHost<B>> ToHost<B> for Option<T> {
    fn to_host(&self) -> B::Ref {
        match self {
            Some(value) => <T as ToHost<B>>::to_host(value),
            None => B::null(),
        }
    }
}

impl<B: Bridge, T: ToHost<B>> ToHost<B> for [T] {
    fn to_host(&self) -> B::Ref {
        B::new_array(self.iter().map(<T as ToHost<B>>::to_host).collect())
    }
}

impl<B: Bridge, T: ToHost<B>> ToHost<B> for Vec<T> {
    fn to_host(&self) -> B::Ref {
        <[T] as ToHost<B>>::to_host(self)
    }
}

impl<B: Bridge, T: ToHost<B>, const N: usize> ToHost<B> for [T; N] {
    fn to_host(&self) -> B::Ref {
        <[T] as ToHost<B>>::to_host(self)
    }
}

fn object_from_entries<'a, B, T, I>(entries: I) -> B::Ref
where
    B: Bridge,
    T: ToHost<B> + 'a,
    I: IntoIterator<Item = (&'a String, &'a T)>,
{
    let object = B::new_object();
    for (key, value) in entries {
        // Own data members, so "__proto__" is a key like any other
        if let Err(err) = B::define_member(&object, key, <T as ToHost<B>>::to_host(value)) {
            warn!("host refused member '{}' on a fresh object: {}", key, err);
        }
    }
    object
}

impl<B: Bridge, T: ToHost<B>, S: BuildHasher> ToHost<B> for HashMap<String, T, S> {
    fn to_host(&self) -> B::Ref {
        object_from_entries::<B, T, _>(self)
    }
}

impl<B: Bridge, T: ToHost<B>> ToHost<B> for BTreeMap<String, T> {
    fn to_host(&self) -> B::Ref {
        object_from_entries::<B, T, _>(self)
    }
}

impl<B: Bridge, T: ToHost<B>, S: BuildHasher> ToHost<B> for indexmap::IndexMap<String, T, S> {
    fn to_host(&self) -> B::Ref {
        object_from_entries::<B, T, _>(self)
    }
}

/// Structural values are built directly; no text round trip is involved.
impl<B: Bridge> ToHost<B> for serde_json::Value {
    fn to_host(&self) -> B::Ref {
        match self {
            serde_json::Value::Null => B::null(),
            serde_json::Value::Bool(b) => B::boolean(*b),
            serde_json::Value::Number(n) => B::number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => B::string(s),
            serde_json::Value::Array(items) => <[serde_json::Value] as ToHost<B>>::to_host(items),
            serde_json::Value::Object(map) => object_from_entries::<B, _, _>(map),
        }
    }
}
