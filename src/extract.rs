//! Typed extraction from value handles.
//!
//! [`Extract`] is the single fallible core: it re-queries the host type tag and
//! either produces a local value or a [`TypeMismatch`]. The three postures on
//! [`ValueHandle`] are thin views over it:
//!
//! | posture | on mismatch |
//! |---|---|
//! | [`try_extract`](ValueHandle::try_extract) | returns `Err(TypeMismatch)` |
//! | [`must_extract`](ValueHandle::must_extract) | panics; the caller's shape assumption was wrong |
//! | [`extract_or`](ValueHandle::extract_or) | returns the default, nothing else happens |
//!
//! The host has one number category, so every numeric target requires
//! `number`. Integer targets truncate toward zero and saturate at the bounds
//! of the target type; NaN becomes 0.

use crate::bridge::{Bridge, TypeTag};
use crate::error::{AccessResult, TypeMismatch};
use crate::handle::ValueHandle;
use crate::prelude::*;

/// Own enumerable members of a host object, in host enumeration order
pub type Record<B = crate::bridge::DefaultBridge> = IndexMap<String, ValueHandle<B>>;

/// A local shape that can be read out of a host value
pub trait Extract<B: Bridge>: Sized {
    /// Name of the shape in mismatch messages
    const TARGET: &'static str;

    /// The one host tag this shape accepts
    const EXPECTED: TypeTag;

    fn extract(handle: &ValueHandle<B>) -> AccessResult<Self>;
}

/// Tag gate shared by every `Extract` impl
fn require<B: Bridge, T: Extract<B>>(handle: &ValueHandle<B>) -> AccessResult<&B::Ref> {
    let actual = handle.type_tag();
    if actual == T::EXPECTED {
        Ok(handle.raw())
    } else {
        Err(TypeMismatch::new(T::TARGET, T::EXPECTED, actual))
    }
}

fn mismatch<B: Bridge, T: Extract<B>>(handle: &ValueHandle<B>) -> TypeMismatch {
    TypeMismatch::new(T::TARGET, T::EXPECTED, handle.type_tag())
}

impl<B: Bridge> Extract<B> for bool {
    const TARGET: &'static str = "a boolean";
    const EXPECTED: TypeTag = TypeTag::Boolean;

    fn extract(handle: &ValueHandle<B>) -> AccessResult<Self> {
        let raw = require::<B, Self>(handle)?;
        B::as_bool(raw).ok_or_else(|| mismatch::<B, Self>(handle))
    }
}

impl<B: Bridge> Extract<B> for f64 {
    const TARGET: &'static str = "a number";
    const EXPECTED: TypeTag = TypeTag::Number;

    fn extract(handle: &ValueHandle<B>) -> AccessResult<Self> {
        let raw = require::<B, Self>(handle)?;
        B::as_number(raw).ok_or_else(|| mismatch::<B, Self>(handle))
    }
}

macro_rules! extract_number {
    ($($ty:ty),*) => {
        $(
            impl<B: Bridge> Extract<B> for $ty {
                const TARGET: &'static str = "a number";
                const EXPECTED: TypeTag = TypeTag::Number;

                fn extract(handle: &ValueHandle<B>) -> AccessResult<Self> {
                    // `as` truncates, saturates, and maps NaN to 0
                    <f64 as Extract<B>>::extract(handle).map(|n| n as $ty)
                }
            }
        )*
    };
}

extract_number!(f32, i64, i32, u32, usize);

impl<B: Bridge> Extract<B> for String {
    const TARGET: &'static str = "a string";
    const EXPECTED: TypeTag = TypeTag::String;

    fn extract(handle: &ValueHandle<B>) -> AccessResult<Self> {
        let raw = require::<B, Self>(handle)?;
        B::as_string(raw).ok_or_else(|| mismatch::<B, Self>(handle))
    }
}

impl<B: Bridge> Extract<B> for Record<B> {
    const TARGET: &'static str = "a record";
    const EXPECTED: TypeTag = TypeTag::Object;

    fn extract(handle: &ValueHandle<B>) -> AccessResult<Self> {
        let raw = require::<B, Self>(handle)?;
        let mut record = index_map_new();
        for key in B::own_keys(raw) {
            let member = handle.get(&key);
            record.insert(key, member);
        }
        Ok(record)
    }
}

/// Requires host `Array.isArray`, not just `object`; a non-array object is a
/// mismatch even though its tag is the expected one.
impl<B: Bridge> Extract<B> for Vec<ValueHandle<B>> {
    const TARGET: &'static str = "an array";
    const EXPECTED: TypeTag = TypeTag::Object;

    fn extract(handle: &ValueHandle<B>) -> AccessResult<Self> {
        let raw = require::<B, Self>(handle)?;
        if !B::is_array(raw) {
            return Err(mismatch::<B, Self>(handle));
        }
        Ok((0..B::length(raw)).map(|i| handle.index(i)).collect())
    }
}

/// Abort on a broken shape assumption
#[cold]
#[track_caller]
#[allow(clippy::panic)]
fn contract_violation(operation: &str, error: &dyn fmt::Display) -> ! {
    panic!("{operation} failed: {error}")
}

#[track_caller]
pub(crate) fn must<T, E: fmt::Display>(operation: &str, result: Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(error) => contract_violation(operation, &error),
    }
}

impl<B: Bridge> ValueHandle<B> {
    /// Fallible extraction; never panics and never logs
    pub fn try_extract<T: Extract<B>>(&self) -> AccessResult<T> {
        T::extract(self)
    }

    /// Extraction for shapes the caller has already established.
    ///
    /// # Panics
    ///
    /// Panics on a type mismatch. That is a programming error, not a
    /// recoverable condition.
    #[track_caller]
    pub fn must_extract<T: Extract<B>>(&self) -> T {
        must("must_extract", self.try_extract())
    }

    /// Extraction where a mismatch is expected and benign: gives `default`
    pub fn extract_or<T: Extract<B>>(&self, default: T) -> T {
        self.try_extract().unwrap_or(default)
    }

    /// The host's `length` for an object. Arrays report their element count;
    /// any other object reports whatever its `length` member says (0 when it
    /// has none or it is not a number).
    pub fn length(&self) -> AccessResult<usize> {
        let actual = self.type_tag();
        if actual != TypeTag::Object {
            return Err(TypeMismatch::new("array-like", TypeTag::Object, actual));
        }
        Ok(B::length(self.raw()))
    }

    #[track_caller]
    pub fn must_length(&self) -> usize {
        must("must_length", self.length())
    }

    pub fn length_or(&self, default: usize) -> usize {
        self.length().unwrap_or(default)
    }
}

macro_rules! shortcuts {
    ($($(#[$doc:meta])* $name:ident, $must:ident, $or:ident => $ty:ty;)*) => {
        impl<B: Bridge> ValueHandle<B> {
            $(
                $(#[$doc])*
                pub fn $name(&self) -> AccessResult<$ty> {
                    self.try_extract()
                }

                #[track_caller]
                pub fn $must(&self) -> $ty {
                    must(stringify!($must), self.try_extract())
                }

                pub fn $or(&self, default: $ty) -> $ty {
                    self.extract_or(default)
                }
            )*
        }
    };
}

shortcuts! {
    bool, must_bool, bool_or => bool;
    /// Host number truncated to an integer
    int, must_int, int_or => i64;
    float, must_float, float_or => f64;
    string, must_string, string_or => String;
    /// Own enumerable members, each as a fresh handle
    object, must_object, object_or => Record<B>;
    /// Elements `0..length` of a host array
    array, must_array, array_or => Vec<ValueHandle<B>>;
}
