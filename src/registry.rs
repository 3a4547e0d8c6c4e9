//! Runtime-extensible mapping from keys to constructors.
//!
//! A [`TypeRegistry`] replaces conditional dispatch: adding a producible type
//! is a single [`register`](TypeRegistry::register) call, and
//! [`create`](TypeRegistry::create) never has to change.
//!
//! # Examples
//!
//! ```
//! use singleton_factory::{FactoryError, TypeRegistry};
//!
//! let registry: TypeRegistry<String, u32> = TypeRegistry::new();
//! registry.register("answer".to_string(), || 42);
//!
//! assert_eq!(registry.create("answer").unwrap(), 42);
//! assert!(matches!(
//!     registry.create("question"),
//!     Err(FactoryError::UnknownKey { .. })
//! ));
//! ```

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::{Once, RwLock};

use crate::error::{into_cause, BoxError, FactoryError};
use crate::trace::TraceHook;
use crate::FactoryEvent;

/// Stored zero-argument constructor.
///
/// Infallible constructors are wrapped to always return `Ok`.
pub type Constructor<T> = Arc<dyn Fn() -> Result<T, BoxError> + Send + Sync>;

/// Thread-safe mapping from `K` to a constructor producing `T`.
///
/// `T` is usually the common capability, e.g. `Box<dyn Shape>`. Lookups take
/// a shared lock, registrations an exclusive one; constructors always run
/// after the lock has been released.
pub struct TypeRegistry<K, T> {
    entries: RwLock<HashMap<K, Constructor<T>>>,
    seeded: Once,
    trace: TraceHook,
}

impl<K, T> TypeRegistry<K, T>
where
    K: Eq + Hash + fmt::Debug,
{
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            seeded: Once::new(),
            trace: TraceHook::new(),
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Set a tracing callback for registry operations.
    ///
    /// The callback is invoked outside the entry lock, so it may call back
    /// into this registry.
    pub fn set_trace_callback(&self, callback: impl Fn(&FactoryEvent) + Send + Sync + 'static) {
        self.trace.set(callback);
    }

    /// Clear the tracing callback.
    pub fn clear_trace_callback(&self) {
        self.trace.clear();
    }

    // -------------------------------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------------------------------

    /// Registers `constructor` under `key`, replacing any previous entry.
    pub fn register<F>(&self, key: K, constructor: F)
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: 'static,
    {
        self.register_constructor(key, Arc::new(move || Ok::<T, BoxError>(constructor())));
    }

    /// Registers a constructor that may fail. Its error surfaces from
    /// [`create`](Self::create) as [`FactoryError::InitializationFailure`].
    pub fn register_fallible<F, E>(&self, key: K, constructor: F)
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
        T: 'static,
    {
        self.register_constructor(
            key,
            Arc::new(move || -> Result<T, BoxError> { constructor().map_err(Into::into) }),
        );
    }

    /// Registers an already type-erased constructor, replacing any previous entry.
    pub fn register_constructor(&self, key: K, constructor: Constructor<T>) {
        self.trace.emit(|| FactoryEvent::Register {
            key: format!("{:?}", key),
        });

        self.entries.write().insert(key, constructor);
    }

    /// Removes the entry for `key`. Returns whether one existed.
    pub fn unregister<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + fmt::Debug,
    {
        let found = self.entries.write().remove(key).is_some();

        self.trace.emit(|| FactoryEvent::Unregister {
            key: format!("{:?}", key),
            found,
        });

        found
    }

    /// Runs `seed` against this registry at most once over its lifetime.
    ///
    /// Concurrent callers block until the first seeding has finished, so
    /// built-in entries are present once any call returns.
    ///
    /// # Panics
    ///
    /// If a previous `seed` panicked, the registry is marked as poisoned and
    /// later calls panic as well.
    pub fn seed_once(&self, seed: impl FnOnce(&Self)) {
        self.seeded.call_once(|| {
            seed(self);
            self.trace.emit(|| FactoryEvent::Seeded {});
        });
    }

    /// Whether [`seed_once`](Self::seed_once) has completed.
    pub fn is_seeded(&self) -> bool {
        self.seeded.state().done()
    }

    // -------------------------------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------------------------------

    /// Constructs a new instance from the constructor registered under `key`.
    ///
    /// The constructor used is the one committed when the lookup ran; a
    /// concurrent `register` for the same key affects only later lookups.
    ///
    /// # Errors
    ///
    /// - [`FactoryError::UnknownKey`] if nothing is registered under `key`
    /// - [`FactoryError::InitializationFailure`] if the constructor failed
    pub fn create<Q>(&self, key: &Q) -> Result<T, FactoryError<K>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + fmt::Debug + ToOwned<Owned = K>,
    {
        let constructor = self.entries.read().get(key).cloned();

        self.trace.emit(|| FactoryEvent::Create {
            key: format!("{:?}", key),
            found: constructor.is_some(),
        });

        let constructor = constructor.ok_or_else(|| FactoryError::UnknownKey {
            key: key.to_owned(),
        })?;

        constructor().map_err(|err| FactoryError::InitializationFailure {
            cause: into_cause(err),
        })
    }

    /// Check if a constructor is registered under `key`.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.entries.read().contains_key(key)
    }

    /// Snapshot of the registered keys, in no particular order.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.entries.read().keys().cloned().collect()
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether no constructor is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<K, T> Default for TypeRegistry<K, T>
where
    K: Eq + Hash + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> fmt::Debug for TypeRegistry<K, T>
where
    K: Eq + Hash + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("keys", &self.entries.read().keys().collect::<Vec<_>>())
            .field("seeded", &self.is_seeded())
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
