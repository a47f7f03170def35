//! Common imports shared across the crate.
//!
//! Collections use the FxHasher from `rustc-hash`; host key enumeration order
//! matters, so keyed maps that face the host are `IndexMap`s.

pub use core::{cell::RefCell, fmt};

pub use std::{
    boxed::Box,
    rc::{Rc, Weak},
    string::{String, ToString},
    vec,
    vec::Vec,
};

pub use rustc_hash::{FxHashMap, FxHashSet};

pub type IndexMap<K, V> =
    indexmap::IndexMap<K, V, core::hash::BuildHasherDefault<rustc_hash::FxHasher>>;

/// Create an empty IndexMap
#[inline]
pub fn index_map_new<K, V>() -> IndexMap<K, V> {
    IndexMap::with_hasher(Default::default())
}

/// Trait for types that have cheap (O(1), reference-counted) clones.
///
/// Makes it explicit at the call site that a clone only bumps a reference
/// count. Host references and value handles implement it: copying one never
/// duplicates the host value it names.
pub trait CheapClone: Clone {
    /// Semantically identical to `clone()`, but documents that the operation is O(1).
    fn cheap_clone(&self) -> Self {
        self.clone()
    }
}

impl<T: ?Sized> CheapClone for Rc<T> {}
