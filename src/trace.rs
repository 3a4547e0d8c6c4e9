//! Trace callback storage shared by slots, registries and factories.

use std::cell::Cell;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::FactoryEvent;

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a `FactoryEvent` every time the owning
/// component is interacted with. It must be thread-safe because the component
/// itself is shared between threads.
pub type TraceCallback = dyn Fn(&FactoryEvent) + Send + Sync + 'static;

thread_local! {
    /// Set while this thread is running a trace callback.
    static IN_CALLBACK: Cell<bool> = const { Cell::new(false) };
}

/// Clears [`IN_CALLBACK`] when the callback returns or unwinds.
struct CallbackScope;

impl CallbackScope {
    fn enter() -> Option<Self> {
        if IN_CALLBACK.with(|flag| flag.replace(true)) {
            None
        } else {
            Some(CallbackScope)
        }
    }
}

impl Drop for CallbackScope {
    fn drop(&mut self) {
        IN_CALLBACK.with(|flag| flag.set(false));
    }
}

/// Holds an optional tracing callback.
pub(crate) struct TraceHook {
    callback: Mutex<Option<Arc<TraceCallback>>>,
}

impl TraceHook {
    pub(crate) const fn new() -> Self {
        Self {
            callback: Mutex::new(None),
        }
    }

    pub(crate) fn set(&self, callback: impl Fn(&FactoryEvent) + Send + Sync + 'static) {
        *self.callback.lock() = Some(Arc::new(callback));
    }

    pub(crate) fn clear(&self) {
        *self.callback.lock() = None;
    }

    /// Builds the event only when a callback is installed.
    ///
    /// The hook lock is released before the callback runs, so a callback may
    /// call back into the component that emitted the event. Events raised on
    /// this thread while a callback is running are not delivered.
    pub(crate) fn emit(&self, event: impl FnOnce() -> FactoryEvent) {
        let callback = self.callback.lock().clone();
        if let Some(callback) = callback {
            if let Some(_scope) = CallbackScope::enter() {
                callback(&event());
            }
        }
    }
}

impl Default for TraceHook {
    fn default() -> Self {
        Self::new()
    }
}
