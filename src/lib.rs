//! Typed access to a dynamically typed JavaScript host value graph
//!
//! Guest code holds [`ValueHandle`]s, navigates with `get`/`call`, writes with
//! `set`, and reads concrete data through type-checked accessors that come in
//! three postures: fallible (`try_extract`, `string()`), panicking
//! (`must_extract`, `must_string()`) and fallback (`extract_or`,
//! `string_or()`). Whole subtrees convert to and from [`Structural`] values
//! through the host's own JSON facility, and guest closures become host
//! functions with [`register`].
//!
//! # Example
//!
//! ```
//! use jsinterop::{Sandbox, ValueHandle};
//!
//! let doc = ValueHandle::<Sandbox>::from_structural(&serde_json::json!({
//!     "a": "x",
//!     "b": 1,
//! }))?;
//!
//! assert_eq!(doc.get("a").string()?, "x");
//! assert!(doc.get("b").string().is_err());
//! assert_eq!(doc.get("b").string_or("fallback".to_string()), "fallback");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The host is reached through a [`Bridge`]. On `wasm32` with the `wasm`
//! feature that is the real JavaScript engine; everywhere else it is the
//! in-memory [`Sandbox`].

#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )
)]

pub mod bridge;
pub mod callback;
pub mod error;
pub mod extract;
pub mod handle;
pub mod marshal;
pub mod prelude;
pub mod structural;

pub use bridge::sandbox::Sandbox;
#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub use bridge::web::WebBridge;
pub use bridge::{Bridge, DefaultBridge, TypeTag};
pub use callback::{CallbackId, CallbackRegistry, HostCallable, register};
pub use error::{AccessResult, CodecError, HostError, TypeMismatch};
pub use extract::{Extract, Record};
pub use handle::ValueHandle;
pub use marshal::ToHost;
pub use prelude::CheapClone;
pub use structural::Structural;

/// Handle to the default host's global object
pub fn global() -> ValueHandle {
    ValueHandle::global()
}
