//! Macros for declaring process-wide singletons and shared factories.

/// Declares a `static` [`SingletonSlot`](crate::SingletonSlot).
///
/// The initializer must be a function (or non-capturing closure) returning
/// `Result<T, BoxError>`.
///
/// # Examples
///
/// ```rust
/// use singleton_factory::{define_singleton, BoxError};
///
/// #[derive(Debug)]
/// struct Settings {
///     workers: usize,
/// }
///
/// fn load() -> Result<Settings, BoxError> {
///     Ok(Settings { workers: 4 })
/// }
///
/// define_singleton!(SETTINGS: Settings = load);
///
/// assert_eq!(SETTINGS.get_instance().unwrap().workers, 4);
/// ```
#[macro_export]
macro_rules! define_singleton {
    ($(#[$meta:meta])* $vis:vis $name:ident : $ty:ty = $init:expr) => {
        $(#[$meta])*
        $vis static $name: $crate::StaticSlot<$ty> = $crate::SingletonSlot::new($init);
    };
}

/// Creates a process-wide shared factory with a single macro invocation.
///
/// The macro generates a module containing:
/// - The slot static holding the factory (hidden)
/// - An `Api` struct that implements `SharedFactory`
/// - Free functions delegating to it
///
/// The factory is built on first use and seeded once with the given
/// built-ins. Items of the enclosing module are in scope inside the generated
/// module, so key, product and seed can be named as usual.
///
/// # Examples
///
/// ```rust
/// use singleton_factory::{define_factory, FactoryError, TypeRegistry};
///
/// pub trait Shape: Send {
///     fn sides(&self) -> u32;
/// }
///
/// pub struct Square;
/// impl Shape for Square {
///     fn sides(&self) -> u32 {
///         4
///     }
/// }
///
/// fn builtins(registry: &TypeRegistry<String, Box<dyn Shape>>) {
///     registry.register("square".to_string(), || Box::new(Square) as Box<dyn Shape>);
/// }
///
/// define_factory!(shapes: String => Box<dyn Shape>, builtins);
///
/// fn main() {
///     assert_eq!(shapes::create("square").unwrap().sides(), 4);
///     assert!(matches!(
///         shapes::create("circle"),
///         Err(FactoryError::UnknownKey { .. })
///     ));
/// }
/// ```
///
/// # Trait-Based Usage
///
/// ```rust
/// use singleton_factory::{define_factory, SharedFactory};
///
/// define_factory!(numbers: u8 => u64);
///
/// numbers::API.register(1, || 100).unwrap();
/// assert_eq!(numbers::API.create(&1u8).unwrap(), 100);
/// ```
#[macro_export]
macro_rules! define_factory {
    ($name:ident : $key:ty => $product:ty) => {
        $crate::define_factory!($name: $key => $product, |_| {});
    };
    ($name:ident : $key:ty => $product:ty, $seed:expr) => {
        pub mod $name {
            #[allow(unused_imports)]
            use super::*;

            use std::borrow::Borrow;
            use std::fmt::Debug;
            use std::hash::Hash;
            use std::sync::Arc;

            // Slot holding the shared factory (module-private)
            static FACTORY: $crate::StaticSlot<$crate::Factory<$key, $product>> =
                $crate::SingletonSlot::new(build);

            fn build() -> Result<$crate::Factory<$key, $product>, $crate::BoxError> {
                Ok($crate::Factory::with_builtins($seed))
            }

            /// Zero-sized type that implements the shared factory API.
            ///
            /// All operations are provided by the `SharedFactory` trait's
            /// default implementations. This struct only provides access to the static.
            pub struct Api;

            impl $crate::SharedFactory for Api {
                type Key = $key;
                type Product = $product;

                fn slot() -> &'static $crate::StaticSlot<$crate::Factory<$key, $product>> {
                    &FACTORY
                }
            }

            /// Convenient constant for accessing the factory API.
            pub const API: Api = Api;

            // Free functions for ergonomic usage - they delegate to API

            /// The shared factory, built on first use.
            pub fn instance() -> Result<Arc<$crate::Factory<$key, $product>>, $crate::SlotError> {
                use $crate::SharedFactory;
                API.instance()
            }

            /// Register a constructor.
            pub fn register(
                key: $key,
                constructor: impl Fn() -> $product + Send + Sync + 'static,
            ) -> Result<(), $crate::SlotError> {
                use $crate::SharedFactory;
                API.register(key, constructor)
            }

            /// Register a constructor that may fail.
            pub fn register_fallible<E: Into<$crate::BoxError>>(
                key: $key,
                constructor: impl Fn() -> Result<$product, E> + Send + Sync + 'static,
            ) -> Result<(), $crate::SlotError> {
                use $crate::SharedFactory;
                API.register_fallible(key, constructor)
            }

            /// Create a new product for `key`.
            pub fn create<Q>(key: &Q) -> Result<$product, $crate::FactoryError<$key>>
            where
                $key: Borrow<Q>,
                Q: ?Sized + Hash + Eq + Debug + ToOwned<Owned = $key>,
            {
                use $crate::SharedFactory;
                API.create(key)
            }

            /// Check if a constructor is registered under `key`.
            pub fn contains<Q>(key: &Q) -> Result<bool, $crate::SlotError>
            where
                $key: Borrow<Q>,
                Q: ?Sized + Hash + Eq,
            {
                use $crate::SharedFactory;
                API.contains(key)
            }

            /// Set a tracing callback for the slot and the registry.
            pub fn set_trace_callback(
                callback: impl Fn(&$crate::FactoryEvent) + Send + Sync + 'static,
            ) -> Result<(), $crate::SlotError> {
                use $crate::SharedFactory;
                API.set_trace_callback(callback)
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() {
                use $crate::SharedFactory;
                API.clear_trace_callback()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{BoxError, FactoryError, SlotState, TypeRegistry};
    use serial_test::serial;
    use std::sync::Arc;

    fn answer() -> Result<u64, BoxError> {
        Ok(42)
    }

    define_singleton!(ANSWER: u64 = answer);

    fn greetings(registry: &TypeRegistry<String, String>) {
        registry.register("en".to_string(), || "hello".to_string());
    }

    define_factory!(greeting: String => String, greetings);
    define_factory!(empty: u32 => u32);

    #[test]
    fn test_define_singleton_macro() {
        let a = ANSWER.get_instance().unwrap();
        let b = ANSWER.get_instance().unwrap();
        assert_eq!(*a, 42);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(ANSWER.state(), SlotState::Ready);
    }

    #[test]
    #[serial]
    fn test_define_factory_macro() {
        assert_eq!(greeting::create("en").unwrap(), "hello");

        greeting::register("de".to_string(), || "hallo".to_string()).unwrap();
        assert_eq!(greeting::create("de").unwrap(), "hallo");
        assert!(greeting::contains("de").unwrap());

        let err = greeting::create("fr").unwrap_err();
        assert!(matches!(err, FactoryError::UnknownKey { ref key } if key == "fr"));
    }

    #[test]
    fn test_seedless_factory_starts_empty() {
        assert!(!empty::contains(&1u32).unwrap());
        empty::register(1, || 11).unwrap();
        assert_eq!(empty::create(&1u32).unwrap(), 11);
    }

    #[test]
    #[serial]
    fn test_instance_identity() {
        let a = greeting::instance().unwrap();
        let b = greeting::instance().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
