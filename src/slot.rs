//! Exactly-once lazy construction of a shared instance.
//!
//! A [`SingletonSlot`] owns a constructor and at most one constructed value.
//! The first caller to find the slot empty runs the constructor; concurrent
//! callers block until that attempt resolves and then share its outcome.
//!
//! ```text
//! Uninitialized --get_instance--> Initializing --ok--> Ready (terminal)
//!       ^                               |
//!       +-------------err/panic---------+
//! ```

use std::any::type_name;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::error::{into_cause, BoxError, Cause, ConstructorPanicked, SlotError};
use crate::trace::TraceHook;
use crate::FactoryEvent;

/// Observable lifecycle state of a [`SingletonSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Nothing constructed yet, or the last attempt failed.
    Uninitialized,
    /// A constructor is running right now.
    Initializing,
    /// The instance is published and will never change.
    Ready,
}

/// Constructor type used by slots declared in a `static`.
pub type InitFn<T> = fn() -> Result<T, BoxError>;

/// A slot whose constructor is a plain function pointer, as required in a `static`.
pub type StaticSlot<T> = SingletonSlot<T, InitFn<T>>;

/// One construction attempt. Waiters hold on to the attempt they blocked on so
/// that they receive exactly its outcome, even if a later retry has started.
struct Attempt<T> {
    outcome: OnceLock<Result<Arc<T>, Cause>>,
}

enum Phase<T> {
    Uninitialized,
    Initializing(Arc<Attempt<T>>),
    Ready(Arc<T>),
}

/// Holds at most one lazily constructed, shared instance of `T`.
///
/// `F` is the constructor, any `Fn() -> Result<T, E>` where `E` converts into
/// a [`BoxError`]. `new` is `const`, so a slot can live in a `static`
/// (see [`define_singleton!`](crate::define_singleton)).
///
/// # Examples
///
/// ```rust
/// use singleton_factory::SingletonSlot;
/// use std::sync::Arc;
///
/// let slot = SingletonSlot::new(|| Ok::<_, std::io::Error>(String::from("shared")));
///
/// let a = slot.get_instance().unwrap();
/// let b = slot.get_instance().unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
pub struct SingletonSlot<T, F> {
    /// Lock-free fast path; written once, right before the phase turns `Ready`.
    value: OnceLock<Arc<T>>,
    phase: Mutex<Phase<T>>,
    resolved: Condvar,
    init: F,
    trace: TraceHook,
}

impl<T, F> SingletonSlot<T, F> {
    /// Creates an uninitialized slot that will build its value with `init`.
    pub const fn new<E>(init: F) -> Self
    where
        F: Fn() -> Result<T, E>,
        E: Into<BoxError>,
    {
        Self {
            value: OnceLock::new(),
            phase: Mutex::new(Phase::Uninitialized),
            resolved: Condvar::new(),
            init,
            trace: TraceHook::new(),
        }
    }

    /// Returns the instance if it has been published. Never blocks on, or
    /// triggers, construction.
    pub fn get(&self) -> Option<Arc<T>> {
        self.value.get().cloned()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SlotState {
        if self.value.get().is_some() {
            return SlotState::Ready;
        }
        match &*self.phase.lock() {
            Phase::Uninitialized => SlotState::Uninitialized,
            Phase::Initializing(_) => SlotState::Initializing,
            Phase::Ready(_) => SlotState::Ready,
        }
    }

    /// Whether the instance has been published.
    pub fn is_ready(&self) -> bool {
        self.value.get().is_some()
    }

    /// Set a tracing callback for slot operations.
    ///
    /// Events raised while the callback itself runs are not delivered, so a
    /// callback may call [`get_instance`](Self::get_instance) on this slot
    /// from a waiting thread. Doing so on `SlotInitializing` blocks the
    /// constructing thread on its own attempt.
    pub fn set_trace_callback(&self, callback: impl Fn(&FactoryEvent) + Send + Sync + 'static) {
        self.trace.set(callback);
    }

    /// Clear the tracing callback.
    pub fn clear_trace_callback(&self) {
        self.trace.clear();
    }

    /// Returns the slot to `Uninitialized`, dropping its reference to the
    /// instance. Handles already given out stay valid.
    ///
    /// Intended for test isolation. The exclusive borrow guarantees that no
    /// caller is reading or constructing concurrently.
    #[doc(hidden)]
    pub fn reset(&mut self) {
        self.take();
    }

    /// Resets the slot and returns the instance it held, if any.
    pub fn take(&mut self) -> Option<Arc<T>> {
        self.trace.emit(|| FactoryEvent::SlotReset {
            type_name: type_name::<T>(),
        });
        *self.phase.get_mut() = Phase::Uninitialized;
        self.value.take()
    }

    /// Publishes the outcome of `attempt` and wakes everyone waiting on it.
    fn finish(&self, attempt: &Attempt<T>, outcome: Result<Arc<T>, Cause>) {
        if let Ok(value) = &outcome {
            // Ready is terminal and only one attempt runs at a time, so the
            // cell is still empty here.
            let _ = self.value.set(value.clone());
        }

        let mut phase = self.phase.lock();
        *phase = match &outcome {
            Ok(value) => Phase::Ready(value.clone()),
            Err(_) => Phase::Uninitialized,
        };
        let _ = attempt.outcome.set(outcome);
        drop(phase);

        self.resolved.notify_all();
    }

    fn wait_for(
        &self,
        phase: &mut MutexGuard<'_, Phase<T>>,
        attempt: Arc<Attempt<T>>,
    ) -> Result<Arc<T>, SlotError> {
        MutexGuard::unlocked(phase, || {
            self.trace.emit(|| FactoryEvent::SlotWaiting {
                type_name: type_name::<T>(),
            })
        });

        loop {
            match attempt.outcome.get() {
                Some(Ok(value)) => return Ok(value.clone()),
                Some(Err(cause)) => {
                    return Err(SlotError::ConcurrentWaitFailure {
                        cause: cause.clone(),
                    })
                }
                None => self.resolved.wait(phase),
            }
        }
    }
}

impl<T, F, E> SingletonSlot<T, F>
where
    F: Fn() -> Result<T, E>,
    E: Into<BoxError>,
{
    /// Returns the shared instance, constructing it on first use.
    ///
    /// Exactly one caller runs the constructor per attempt. Callers arriving
    /// while it runs block until it resolves and then either share the new
    /// instance or receive [`SlotError::ConcurrentWaitFailure`] carrying the
    /// same cause. A failed attempt leaves the slot `Uninitialized`, so the
    /// next call retries.
    ///
    /// # Errors
    ///
    /// - [`SlotError::InitializationFailure`] if this caller's constructor failed
    /// - [`SlotError::ConcurrentWaitFailure`] if the attempt this caller waited on failed
    pub fn get_instance(&self) -> Result<Arc<T>, SlotError> {
        if let Some(value) = self.value.get() {
            return Ok(value.clone());
        }

        let mut phase = self.phase.lock();
        let in_flight = match &*phase {
            Phase::Ready(value) => return Ok(value.clone()),
            Phase::Initializing(attempt) => Some(attempt.clone()),
            Phase::Uninitialized => None,
        };

        if let Some(attempt) = in_flight {
            return self.wait_for(&mut phase, attempt);
        }

        let attempt = Arc::new(Attempt {
            outcome: OnceLock::new(),
        });
        *phase = Phase::Initializing(attempt.clone());
        drop(phase);
        self.construct(attempt)
    }

    fn construct(&self, attempt: Arc<Attempt<T>>) -> Result<Arc<T>, SlotError> {
        let guard = ConstructionGuard {
            slot: self,
            attempt,
        };

        self.trace.emit(|| FactoryEvent::SlotInitializing {
            type_name: type_name::<T>(),
        });

        match (self.init)() {
            Ok(value) => {
                let value = Arc::new(value);
                self.finish(&guard.attempt, Ok(value.clone()));
                self.trace.emit(|| FactoryEvent::SlotReady {
                    type_name: type_name::<T>(),
                });
                Ok(value)
            }
            Err(err) => {
                let cause = into_cause(err);
                self.finish(&guard.attempt, Err(cause.clone()));
                self.trace.emit(|| FactoryEvent::SlotFailed {
                    type_name: type_name::<T>(),
                    cause: cause.to_string(),
                });
                Err(SlotError::InitializationFailure { cause })
            }
        }
    }
}

/// Resolves the attempt as failed if the constructor unwinds, so waiters are
/// released and the slot stays retryable.
struct ConstructionGuard<'a, T, F> {
    slot: &'a SingletonSlot<T, F>,
    attempt: Arc<Attempt<T>>,
}

impl<T, F> Drop for ConstructionGuard<'_, T, F> {
    fn drop(&mut self) {
        if self.attempt.outcome.get().is_none() {
            let cause: Cause = Arc::new(ConstructorPanicked);
            self.slot.finish(&self.attempt, Err(cause.clone()));
            self.slot.trace.emit(|| FactoryEvent::SlotFailed {
                type_name: type_name::<T>(),
                cause: cause.to_string(),
            });
        }
    }
}

impl<T, F> fmt::Debug for SingletonSlot<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingletonSlot")
            .field("type_name", &type_name::<T>())
            .field("state", &self.state())
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
