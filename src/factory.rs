//! Key-based object creation fronting a [`TypeRegistry`].

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::error::{BoxError, FactoryError};
use crate::{FactoryEvent, TypeRegistry};

/// Resolves a key to a freshly constructed instance.
///
/// A factory holds nothing but a handle to its registry; cloning it, or
/// building several factories with [`with_registry`](Self::with_registry),
/// yields views of the same registry.
///
/// # Examples
///
/// ```rust
/// use singleton_factory::Factory;
///
/// trait Shape {
///     fn name(&self) -> &'static str;
/// }
///
/// struct Circle;
/// impl Shape for Circle {
///     fn name(&self) -> &'static str {
///         "circle"
///     }
/// }
///
/// let shapes: Factory<String, Box<dyn Shape>> = Factory::with_builtins(|registry| {
///     registry.register("circle".to_string(), || Box::new(Circle) as Box<dyn Shape>);
/// });
///
/// assert_eq!(shapes.create("circle").unwrap().name(), "circle");
/// assert!(shapes.create("hexagon").is_err());
/// ```
pub struct Factory<K, T> {
    registry: Arc<TypeRegistry<K, T>>,
}

impl<K, T> Factory<K, T>
where
    K: Eq + Hash + fmt::Debug,
{
    /// Factory over a new, empty registry.
    pub fn new() -> Self {
        Self::with_registry(Arc::new(TypeRegistry::new()))
    }

    /// Factory over an existing, possibly shared, registry.
    pub fn with_registry(registry: Arc<TypeRegistry<K, T>>) -> Self {
        Self { registry }
    }

    /// Factory over a new registry pre-populated by `seed`.
    pub fn with_builtins(seed: impl FnOnce(&TypeRegistry<K, T>)) -> Self {
        Self::shared_with_builtins(Arc::new(TypeRegistry::new()), seed)
    }

    /// Factory over `registry`, seeding built-ins into it unless that already
    /// happened. Safe to call concurrently from any number of call sites; the
    /// seed runs once per registry and every caller sees its entries.
    pub fn shared_with_builtins(
        registry: Arc<TypeRegistry<K, T>>,
        seed: impl FnOnce(&TypeRegistry<K, T>),
    ) -> Self {
        registry.seed_once(seed);
        Self::with_registry(registry)
    }

    /// The registry this factory resolves keys through.
    pub fn registry(&self) -> &Arc<TypeRegistry<K, T>> {
        &self.registry
    }

    /// See [`TypeRegistry::register`].
    pub fn register<F>(&self, key: K, constructor: F)
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: 'static,
    {
        self.registry.register(key, constructor);
    }

    /// See [`TypeRegistry::register_fallible`].
    pub fn register_fallible<F, E>(&self, key: K, constructor: F)
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
        T: 'static,
    {
        self.registry.register_fallible(key, constructor);
    }

    /// Creates a new instance for `key`. See [`TypeRegistry::create`].
    pub fn create<Q>(&self, key: &Q) -> Result<T, FactoryError<K>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + fmt::Debug + ToOwned<Owned = K>,
    {
        self.registry.create(key)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.registry.contains(key)
    }

    /// Set a tracing callback on the underlying registry.
    pub fn set_trace_callback(&self, callback: impl Fn(&FactoryEvent) + Send + Sync + 'static) {
        self.registry.set_trace_callback(callback);
    }

    pub fn clear_trace_callback(&self) {
        self.registry.clear_trace_callback();
    }
}

impl<K, T> Default for Factory<K, T>
where
    K: Eq + Hash + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> Clone for Factory<K, T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<K, T> fmt::Debug for Factory<K, T>
where
    K: Eq + Hash + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("registry", &self.registry)
            .finish()
    }
}
