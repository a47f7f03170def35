//! Structural (JSON-shaped) conversion of host values.
//!
//! The host does the serializing, never a local walker: getters, exotic
//! objects and non-enumerable members are handled by the host's own
//! `JSON.stringify`, and the text is parsed here with `serde_json`.
//!
//! # Lossiness
//!
//! The conversion narrows, and the host's quirks are inherited as they are:
//! - members holding `undefined` or a function are dropped from objects
//! - array slots holding `undefined` or a function become `null`
//! - `NaN` and the infinities become `null`
//! - cyclic structures are rejected with [`CodecError::Host`]
//!
//! Only values built from booleans, numbers, strings, `null`, records and
//! sequences survive a round trip unchanged.

use crate::bridge::{Bridge, TypeTag};
use crate::error::{CodecError, HostError, TypeMismatch};
use crate::extract::must;
use crate::handle::ValueHandle;
use crate::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Local, JSON-shaped copy of a host subtree
pub type Structural = serde_json::Value;

impl<B: Bridge> ValueHandle<B> {
    /// Host-serialized text of an `object` value
    fn host_text(&self) -> Result<String, CodecError> {
        let actual = self.type_tag();
        if actual != TypeTag::Object {
            return Err(TypeMismatch::new("a structural value", TypeTag::Object, actual).into());
        }
        Ok(B::serialize(self.raw())?)
    }

    /// Copy this object's subtree into a local structural value
    pub fn to_structural(&self) -> Result<Structural, CodecError> {
        self.decode()
    }

    /// # Panics
    ///
    /// Panics when the value is not an object or the host cannot serialize it.
    #[track_caller]
    pub fn must_to_structural(&self) -> Structural {
        must("must_to_structural", self.to_structural())
    }

    pub fn to_structural_or(&self, default: Structural) -> Structural {
        self.to_structural().unwrap_or(default)
    }

    /// Fill a caller-owned typed structure from this object's subtree.
    ///
    /// ```
    /// use jsinterop::{Sandbox, ValueHandle};
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Point {
    ///     x: f64,
    ///     y: f64,
    /// }
    ///
    /// let host = ValueHandle::<Sandbox>::from_structural(&serde_json::json!({"x": 1, "y": 2.5}))?;
    /// let point: Point = host.decode()?;
    /// assert_eq!((point.x, point.y), (1.0, 2.5));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
        let text = self.host_text()?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Build a fresh host value from a structural one. The text is produced
    /// locally and parsed by the host.
    pub fn from_structural(value: &Structural) -> Result<Self, HostError> {
        B::parse(&value.to_string()).map(Self::from_raw)
    }

    /// Like [`from_structural`](Self::from_structural), for any serializable value
    pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Self, CodecError> {
        let text = serde_json::to_string(value)?;
        Ok(Self::from_raw(B::parse(&text)?))
    }
}
