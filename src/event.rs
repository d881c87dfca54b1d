//! Contains the events and functionality for monitoring the commands a [`Dispatcher`] runs.
//!
//! [`Dispatcher`]: crate::Dispatcher

pub mod command;

use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
        PoisonError,
        RwLock,
    },
};

use derive_where::derive_where;

use crate::event::command::CommandEvent;

/// A destination for events.  Allows implicit conversion via [`From`] for concrete types for
/// convenience with [`EventBus::subscribe`]:
///
/// ```rust
/// # use mongodb_dispatch::event::{command::CommandEvent, EventBus};
/// let bus = EventBus::<CommandEvent>::new();
/// let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
/// bus.subscribe(tx);
/// ```
///
/// or explicit construction for `Fn` traits:
///
/// ```rust
/// # use mongodb_dispatch::event::{command::CommandEvent, EventBus, EventHandler};
/// let bus = EventBus::<CommandEvent>::new();
/// bus.subscribe(EventHandler::callback(|ev| println!("{:?}", ev)));
/// ```
#[derive(Clone)]
#[non_exhaustive]
pub enum EventHandler<T> {
    /// A callback, invoked on the publishing task.
    Callback(Arc<dyn Fn(T) + Sync + Send>),
    /// A `tokio` channel sender. Events are dropped once the receiver is closed.
    TokioMpsc(tokio::sync::mpsc::UnboundedSender<T>),
}

impl<T> std::fmt::Debug for EventHandler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("EventHandler").finish()
    }
}

impl<T> From<tokio::sync::mpsc::UnboundedSender<T>> for EventHandler<T> {
    fn from(value: tokio::sync::mpsc::UnboundedSender<T>) -> Self {
        Self::TokioMpsc(value)
    }
}

impl<T: crate::event::command::CommandEventHandler + 'static> From<Arc<T>>
    for EventHandler<CommandEvent>
{
    fn from(value: Arc<T>) -> Self {
        Self::callback(move |ev| match ev {
            CommandEvent::Started(e) => value.handle_command_started_event(e),
            CommandEvent::Succeeded(e) => value.handle_command_succeeded_event(e),
            CommandEvent::Failed(e) => value.handle_command_failed_event(e),
        })
    }
}

impl<T: Send + Sync + 'static> EventHandler<T> {
    /// Construct a new event handler with a callback.
    pub fn callback(f: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self::Callback(Arc::new(f))
    }

    pub(crate) fn handle(&self, event: T) {
        match self {
            Self::Callback(cb) => (cb)(event),
            Self::TokioMpsc(sender) => {
                let _ = sender.send(event);
            }
        }
    }
}

/// Identifies a handler registered with an [`EventBus`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Delivers events to every registered handler.
///
/// `publish` is synchronous: it returns once every handler registered at the time of the call has
/// been given the event, in the order the handlers were subscribed. A handler that panics is
/// skipped and the remaining handlers still receive the event. Events published while no handler
/// is registered are dropped.
#[derive_where(Debug)]
pub struct EventBus<T> {
    next_handler_id: AtomicU64,

    #[derive_where(skip)]
    handlers: RwLock<Vec<(HandlerId, EventHandler<T>)>>,
}

impl<T> Default for EventBus<T> {
    fn default() -> Self {
        Self {
            next_handler_id: AtomicU64::new(0),
            handlers: RwLock::new(Vec::new()),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> EventBus<T> {
    /// Creates a bus with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler to receive every subsequently published event.
    pub fn subscribe(&self, handler: impl Into<EventHandler<T>>) -> HandlerId {
        let id = HandlerId(self.next_handler_id.fetch_add(1, Ordering::SeqCst));
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, handler.into()));
        id
    }

    /// Unregisters a handler. Returns whether the handler was registered.
    pub fn unsubscribe(&self, id: HandlerId) -> bool {
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        handlers.len() != before
    }

    /// The number of handlers currently registered.
    pub fn handler_count(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Delivers `event` to every registered handler.
    pub fn publish(&self, event: T) {
        let handlers: Vec<EventHandler<T>> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();

        for handler in handlers {
            let event = event.clone();
            if catch_unwind(AssertUnwindSafe(|| handler.handle(event))).is_err() {
                tracing::warn!(
                    target: crate::trace::EVENT_TRACING_EVENT_TARGET,
                    "event handler panicked; continuing delivery to remaining handlers"
                );
            }
        }
    }
}
