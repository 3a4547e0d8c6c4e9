use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Error type a constructor may return.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Shareable construction failure.
///
/// A failed singleton construction hands the same cause to the constructing
/// thread and to every thread that was waiting on that attempt, so the cause
/// lives behind an `Arc`.
pub type Cause = Arc<dyn Error + Send + Sync + 'static>;

/// Errors returned by [`SingletonSlot::get_instance`](crate::SingletonSlot::get_instance).
#[derive(Debug, Clone, thiserror::Error)]
pub enum SlotError {
    /// This caller ran the constructor and it failed.
    #[error("singleton construction failed: {cause}")]
    InitializationFailure {
        #[source]
        cause: Cause,
    },

    /// This caller waited on another thread's construction, which failed.
    #[error("waited on a singleton construction that failed: {cause}")]
    ConcurrentWaitFailure {
        #[source]
        cause: Cause,
    },
}

impl SlotError {
    /// The underlying constructor error.
    pub fn cause(&self) -> &Cause {
        match self {
            SlotError::InitializationFailure { cause }
            | SlotError::ConcurrentWaitFailure { cause } => cause,
        }
    }
}

/// Errors returned by [`TypeRegistry::create`](crate::TypeRegistry::create) and
/// [`Factory::create`](crate::Factory::create).
#[derive(Debug, Clone, thiserror::Error)]
pub enum FactoryError<K: fmt::Debug> {
    /// No constructor is registered under `key`.
    #[error("no constructor registered for key {key:?}")]
    UnknownKey { key: K },

    /// The registered constructor (or the shared factory's own constructor) failed.
    #[error("construction failed: {cause}")]
    InitializationFailure {
        #[source]
        cause: Cause,
    },
}

impl<K: fmt::Debug> FactoryError<K> {
    /// The offending key, if this is an [`UnknownKey`](FactoryError::UnknownKey) error.
    pub fn unknown_key(&self) -> Option<&K> {
        match self {
            FactoryError::UnknownKey { key } => Some(key),
            FactoryError::InitializationFailure { .. } => None,
        }
    }
}

impl<K: fmt::Debug> From<SlotError> for FactoryError<K> {
    fn from(err: SlotError) -> Self {
        FactoryError::InitializationFailure {
            cause: err.cause().clone(),
        }
    }
}

/// Error recorded for waiters when a constructor unwinds instead of returning.
#[derive(Debug, thiserror::Error)]
#[error("constructor panicked")]
pub(crate) struct ConstructorPanicked;

pub(crate) fn into_cause(err: impl Into<BoxError>) -> Cause {
    Arc::from(err.into())
}
