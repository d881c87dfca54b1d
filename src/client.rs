pub(crate) mod executor;
pub mod options;

use std::sync::Arc;

use derive_where::derive_where;

use crate::{
    event::{command::CommandEvent, EventBus},
    sdam::TopologyClassifier,
    trace::{command::CommandTracingEventEmitter, COMMAND_TRACING_EVENT_TARGET},
};

pub use self::executor::CommandRequest;
use self::options::DispatcherOptions;

/// Runs commands over [`Connection`](crate::Connection)s and reports every step to an
/// [`EventBus`].
///
/// Each command is decorated with a read preference appropriate for the current topology, sent,
/// and its reply translated into either the reply document or a structured [`Error`]. A
/// `CommandStartedEvent` is published before anything is sent, followed by exactly one
/// `CommandSucceededEvent` or `CommandFailedEvent`.
///
/// `Dispatcher` uses [`std::sync::Arc`] internally, so it can safely be shared across threads or
/// async tasks. For example:
///
/// ```rust
/// # use std::sync::Arc;
/// # use mongodb_dispatch::{
/// #     event::{command::CommandEvent, EventBus, EventHandler},
/// #     Dispatcher,
/// #     ServerRole,
/// #     TopologySnapshot,
/// #     TopologyType,
/// # };
/// let bus = Arc::new(EventBus::<CommandEvent>::new());
/// bus.subscribe(EventHandler::callback(|event: CommandEvent| {
///     println!("{} {}", event.request_id(), event.command_name())
/// }));
///
/// let topology = TopologySnapshot::new(TopologyType::ReplicaSet, ServerRole::Primary);
/// let dispatcher = Dispatcher::new(topology, bus, None);
/// ```
///
/// [`Error`]: crate::error::Error
#[derive(Clone, Debug)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

#[derive_where(Debug)]
struct DispatcherInner {
    #[derive_where(skip)]
    topology: Arc<dyn TopologyClassifier>,

    event_bus: Arc<EventBus<CommandEvent>>,

    tracing_emitter: Option<CommandTracingEventEmitter>,

    options: DispatcherOptions,
}

impl Dispatcher {
    /// Creates a new `Dispatcher` that classifies the deployment with `topology` and publishes
    /// command monitoring events to `event_bus`.
    pub fn new(
        topology: impl TopologyClassifier + 'static,
        event_bus: Arc<EventBus<CommandEvent>>,
        options: impl Into<Option<DispatcherOptions>>,
    ) -> Self {
        let options = options.into().unwrap_or_default();
        let tracing_emitter = if options.tracing_enabled.unwrap_or(true) {
            Some(CommandTracingEventEmitter::new(
                options.max_document_length_bytes,
            ))
        } else {
            None
        };

        Self {
            inner: Arc::new(DispatcherInner {
                topology: Arc::new(topology),
                event_bus,
                tracing_emitter,
                options,
            }),
        }
    }

    /// The bus this dispatcher publishes command monitoring events to.
    pub fn event_bus(&self) -> &Arc<EventBus<CommandEvent>> {
        &self.inner.event_bus
    }

    /// The options this dispatcher was created with.
    pub fn options(&self) -> &DispatcherOptions {
        &self.inner.options
    }

    pub(crate) fn emit_command_event(&self, event: CommandEvent) {
        if let Some(ref emitter) = self.inner.tracing_emitter {
            if tracing::enabled!(target: COMMAND_TRACING_EVENT_TARGET, tracing::Level::DEBUG) {
                emitter.handle(event.clone());
            }
        }
        self.inner.event_bus.publish(event);
    }
}
