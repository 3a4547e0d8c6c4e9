//! # Singleton Factory
//!
//! Thread-safe lazy singletons and registry-backed factories for in-process
//! object lifecycle.
//!
//! Two orthogonal building blocks:
//!
//! - [`SingletonSlot`] constructs a shared instance exactly once, even under
//!   concurrent first access. A failed construction is reported to everyone
//!   who waited on it and leaves the slot retryable.
//! - [`TypeRegistry`] maps keys to constructors, and [`Factory`] fronts one.
//!   New producible types are added with a `register` call instead of a new
//!   branch in dispatch code. Unknown keys are a typed error, never a null.
//!
//! ## Quick Start
//!
//! ```rust
//! use singleton_factory::{Factory, FactoryError, SingletonSlot};
//! use std::sync::Arc;
//!
//! // Exactly-once construction
//! let config = SingletonSlot::new(|| Ok::<_, std::io::Error>("db=primary".to_string()));
//! let a = config.get_instance().unwrap();
//! let b = config.get_instance().unwrap();
//! assert!(Arc::ptr_eq(&a, &b));
//!
//! // Registry-based creation
//! let numbers: Factory<String, u32> = Factory::new();
//! numbers.register("one".to_string(), || 1);
//! assert_eq!(numbers.create("one").unwrap(), 1);
//! assert!(matches!(numbers.create("two"), Err(FactoryError::UnknownKey { .. })));
//! ```
//!
//! ## Features
//!
//! - **Thread-safe**: every operation may be called from any number of threads
//! - **Lock-free fast path**: reading a published singleton never blocks
//! - **Typed errors**: [`SlotError`] and [`FactoryError`] instead of absent values
//! - **Tracing support**: optional callback receiving [`FactoryEvent`]s
//!
//! ## Main Items
//!
//! - [`SingletonSlot`] - exactly-once lazy construction
//! - [`TypeRegistry`] - key to constructor mapping
//! - [`Factory`] - key-based creation over a registry
//! - [`SharedFactory`] - a factory that is itself a singleton
//! - [`define_singleton!`] / [`define_factory!`] - declare process-wide instances

mod error;
mod event;
mod factory;
mod macros;
mod registry;
mod shared;
mod slot;
mod trace;

pub use error::{BoxError, Cause, FactoryError, SlotError};
pub use event::FactoryEvent;
pub use factory::Factory;
pub use registry::{Constructor, TypeRegistry};
pub use shared::SharedFactory;
pub use slot::{InitFn, SingletonSlot, SlotState, StaticSlot};
pub use trace::TraceCallback;
