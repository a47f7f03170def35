//! Guest functions the host can call.
//!
//! [`register`] wraps a closure as a host function. Each host argument is
//! re-wrapped as a fresh [`ValueHandle`] before the closure runs, so guest
//! code never sees a raw host reference. The host always receives `undefined`
//! as the return value.
//!
//! The host may store the function and call it at any later time, and the
//! guest cannot see when the host lets go of it. The returned
//! [`HostCallable`] therefore owns the closure explicitly: it must outlive
//! every host invocation. Calling a function whose `HostCallable` was dropped
//! is an error on the host side ([`HostError::Released`] in the sandbox).
//! Use a [`CallbackRegistry`] to keep registrations alive for a component's
//! lifetime, or [`HostCallable::forget`] for the whole program.
//!
//! [`HostError::Released`]: crate::error::HostError::Released

use crate::bridge::{Bridge, DefaultBridge, RawCallback};
use crate::handle::ValueHandle;
use crate::prelude::*;
use log::{debug, trace};

/// Keep-alive owner of a guest closure installed in the host
pub struct HostCallable<B: Bridge = DefaultBridge> {
    handle: ValueHandle<B>,
    keepalive: B::Keepalive,
}

impl<B: Bridge> HostCallable<B> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[ValueHandle<B>]) + 'static,
    {
        let callback: RawCallback<B::Ref> = Rc::new(move |args: &[B::Ref]| {
            trace!("host callback invoked with {} argument(s)", args.len());
            // Fresh handles per invocation; nested invocations never share them
            let args: Vec<ValueHandle<B>> =
                args.iter().cloned().map(ValueHandle::from_raw).collect();
            f(&args);
        });
        let (function, keepalive) = B::make_function(callback);
        debug!("registered host callback");
        HostCallable {
            handle: ValueHandle::from_raw(function),
            keepalive,
        }
    }

    /// The host function, ready to be stored with `set` or passed to `call`
    pub fn handle(&self) -> &ValueHandle<B> {
        &self.handle
    }

    /// Keep the closure alive for the rest of the program and return the
    /// host function.
    pub fn forget(self) -> ValueHandle<B> {
        let HostCallable { handle, keepalive } = self;
        core::mem::forget(keepalive);
        handle
    }
}

impl<B: Bridge> fmt::Debug for HostCallable<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostCallable")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

/// Install `f` as a function of the default host
pub fn register<F>(f: F) -> HostCallable
where
    F: Fn(&[ValueHandle]) + 'static,
{
    HostCallable::new(f)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════════

/// Identifier of a registration in a [`CallbackRegistry`]. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(u64);

impl CallbackId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owner of a set of registrations.
///
/// Scope one to a component and every callback it installed is released with
/// it; put one in a `thread_local!` for process-wide handlers.
pub struct CallbackRegistry<B: Bridge = DefaultBridge> {
    callbacks: FxHashMap<CallbackId, HostCallable<B>>,
    next_id: u64,
}

impl<B: Bridge> Default for CallbackRegistry<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Bridge> fmt::Debug for CallbackRegistry<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("len", &self.callbacks.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl<B: Bridge> CallbackRegistry<B> {
    pub fn new() -> Self {
        CallbackRegistry {
            callbacks: FxHashMap::default(),
            next_id: 1,
        }
    }

    /// Take ownership of an existing registration
    pub fn insert(&mut self, callable: HostCallable<B>) -> CallbackId {
        let id = CallbackId(self.next_id);
        self.next_id += 1;
        self.callbacks.insert(id, callable);
        id
    }

    /// Register `f` and keep it alive until released
    pub fn register<F>(&mut self, f: F) -> (CallbackId, ValueHandle<B>)
    where
        F: Fn(&[ValueHandle<B>]) + 'static,
    {
        let callable = HostCallable::new(f);
        let handle = callable.handle().cheap_clone();
        (self.insert(callable), handle)
    }

    pub fn handle(&self, id: CallbackId) -> Option<&ValueHandle<B>> {
        self.callbacks.get(&id).map(HostCallable::handle)
    }

    pub fn contains(&self, id: CallbackId) -> bool {
        self.callbacks.contains_key(&id)
    }

    /// Drop a registration. The host must not call it afterwards.
    pub fn release(&mut self, id: CallbackId) -> bool {
        let released = self.callbacks.remove(&id).is_some();
        if released {
            debug!("released host callback {}", id);
        }
        released
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Release every registration. Ids keep counting from where they were.
    pub fn clear(&mut self) {
        debug!("releasing {} host callback(s)", self.callbacks.len());
        self.callbacks.clear();
    }
}
