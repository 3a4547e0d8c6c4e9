/// Events emitted by slots, registries and factories during operations.
///
/// These events are passed to the tracing callback set via `set_trace_callback`.
/// Keys are rendered with their `Debug` form so that one event type serves
/// every key type.
///
/// # Examples
///
/// ```rust
/// use singleton_factory::FactoryEvent;
///
/// let event = FactoryEvent::Create { key: "\"circle\"".into(), found: true };
/// assert_eq!(event.to_string(), "create { key: \"circle\", found: true }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactoryEvent {
    /// A caller found the slot empty and is running the constructor.
    SlotInitializing {
        /// Type held by the slot (e.g. "alloc::string::String")
        type_name: &'static str,
    },

    /// Construction succeeded and the instance is published.
    SlotReady { type_name: &'static str },

    /// Construction failed; the slot is retryable again.
    SlotFailed {
        type_name: &'static str,
        /// Rendered constructor error
        cause: String,
    },

    /// A caller is blocked on another thread's construction.
    SlotWaiting { type_name: &'static str },

    /// The slot was returned to its uninitialized state.
    SlotReset { type_name: &'static str },

    /// A constructor was registered (or replaced) under `key`.
    Register { key: String },

    /// An entry removal was attempted.
    Unregister { key: String, found: bool },

    /// A `create` lookup was performed.
    Create {
        key: String,
        /// Whether a constructor was registered for the key
        found: bool,
    },

    /// Built-in entries were seeded into a registry.
    Seeded {},
}

impl std::fmt::Display for FactoryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FactoryEvent::SlotInitializing { type_name } => {
                write!(f, "slot initializing {{ type_name: {} }}", type_name)
            }
            FactoryEvent::SlotReady { type_name } => {
                write!(f, "slot ready {{ type_name: {} }}", type_name)
            }
            FactoryEvent::SlotFailed { type_name, cause } => {
                write!(
                    f,
                    "slot failed {{ type_name: {}, cause: {} }}",
                    type_name, cause
                )
            }
            FactoryEvent::SlotWaiting { type_name } => {
                write!(f, "slot waiting {{ type_name: {} }}", type_name)
            }
            FactoryEvent::SlotReset { type_name } => {
                write!(f, "slot reset {{ type_name: {} }}", type_name)
            }
            FactoryEvent::Register { key } => write!(f, "register {{ key: {} }}", key),
            FactoryEvent::Unregister { key, found } => {
                write!(f, "unregister {{ key: {}, found: {} }}", key, found)
            }
            FactoryEvent::Create { key, found } => {
                write!(f, "create {{ key: {}, found: {} }}", key, found)
            }
            FactoryEvent::Seeded {} => write!(f, "seeded {{}}"),
        }
    }
}
