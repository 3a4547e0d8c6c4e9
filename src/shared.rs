//! Core trait behind process-wide shared factories.
//!
//! A shared factory is one [`Factory`] that lives in a `static`
//! [`SingletonSlot`](crate::SingletonSlot) and is built on first use. The
//! [`SharedFactory`] trait supplies every operation as a default method, so an
//! implementor only points [`slot`](SharedFactory::slot) at its static.
//! [`define_factory!`](crate::define_factory) generates exactly that.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::error::{BoxError, FactoryError, SlotError};
use crate::trace::TraceCallback;
use crate::{Factory, FactoryEvent, StaticSlot};

/// Operations on a factory that is itself a lazily constructed singleton.
///
/// The slot and the registry are orthogonal: the slot decides *when* the one
/// factory is built, the registry decides *what* it builds.
pub trait SharedFactory {
    /// Key type the factory dispatches on.
    type Key: Eq + Hash + fmt::Debug + Send + Sync + 'static;

    /// Common capability every constructor produces.
    type Product: 'static;

    /// Access the slot static holding the shared factory.
    ///
    /// This method must be implemented to provide access to the factory.
    fn slot() -> &'static StaticSlot<Factory<Self::Key, Self::Product>>;

    /// The shared factory, built (and seeded) on first use.
    ///
    /// Every caller receives the same `Arc`.
    fn instance(&self) -> Result<Arc<Factory<Self::Key, Self::Product>>, SlotError> {
        Self::slot().get_instance()
    }

    /// Register a constructor on the shared factory.
    ///
    /// Fails only if the factory itself could not be built.
    fn register<F>(&self, key: Self::Key, constructor: F) -> Result<(), SlotError>
    where
        F: Fn() -> Self::Product + Send + Sync + 'static,
    {
        self.instance()?.register(key, constructor);
        Ok(())
    }

    /// Register a fallible constructor on the shared factory.
    fn register_fallible<F, E>(&self, key: Self::Key, constructor: F) -> Result<(), SlotError>
    where
        F: Fn() -> Result<Self::Product, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.instance()?.register_fallible(key, constructor);
        Ok(())
    }

    /// Create a new product for `key`.
    ///
    /// # Errors
    ///
    /// - [`FactoryError::UnknownKey`] if nothing is registered under `key`
    /// - [`FactoryError::InitializationFailure`] if the product's constructor,
    ///   or the shared factory's own construction, failed
    fn create<Q>(&self, key: &Q) -> Result<Self::Product, FactoryError<Self::Key>>
    where
        Self::Key: Borrow<Q>,
        Q: ?Sized + Hash + Eq + fmt::Debug + ToOwned<Owned = Self::Key>,
    {
        self.instance()?.create(key)
    }

    /// Check if a constructor is registered under `key`.
    fn contains<Q>(&self, key: &Q) -> Result<bool, SlotError>
    where
        Self::Key: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        Ok(self.instance()?.contains(key))
    }

    /// Set a tracing callback for both the slot and the factory's registry.
    ///
    /// Installing the callback builds the factory if needed; entries seeded
    /// during that first build are not reported.
    fn set_trace_callback(
        &self,
        callback: impl Fn(&FactoryEvent) + Send + Sync + 'static,
    ) -> Result<(), SlotError> {
        let callback: Arc<TraceCallback> = Arc::new(callback);

        let slot_callback = Arc::clone(&callback);
        Self::slot().set_trace_callback(move |event| slot_callback(event));

        self.instance()?
            .set_trace_callback(move |event| callback(event));
        Ok(())
    }

    /// Clear the tracing callback on the slot and on the registry.
    fn clear_trace_callback(&self) {
        Self::slot().clear_trace_callback();
        if let Some(factory) = Self::slot().get() {
            factory.clear_trace_callback();
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
