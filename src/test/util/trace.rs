use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tracing::{field::Field, span, Level, Metadata};

/// Models the data reported in a tracing event.
#[derive(Debug, Clone)]
pub(crate) struct TracingEvent {
    pub(crate) level: Level,
    pub(crate) target: String,
    pub(crate) fields: HashMap<String, String>,
}

impl TracingEvent {
    pub(crate) fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// A `tracing` subscriber for tests that records every event up to a maximum verbosity (`DEBUG`
/// by default). Install it with `set_as_default`, which only affects the current thread, so tests
/// using it must run on a current-thread runtime.
#[derive(Clone, Debug)]
pub(crate) struct TracingHandler {
    max_verbosity_level: Level,
    events: Arc<Mutex<Vec<TracingEvent>>>,
}

impl TracingHandler {
    pub(crate) fn new() -> Self {
        Self::with_max_level(Level::DEBUG)
    }

    pub(crate) fn with_max_level(max_verbosity_level: Level) -> Self {
        Self {
            max_verbosity_level,
            events: Default::default(),
        }
    }

    /// Installs this as the default subscriber until the returned guard is dropped.
    pub(crate) fn set_as_default(&self) -> tracing::subscriber::DefaultGuard {
        tracing::subscriber::set_default(self.clone())
    }

    /// Every recorded event with the given target.
    pub(crate) fn events_for(&self, target: &str) -> Vec<TracingEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.target == target)
            .cloned()
            .collect()
    }
}

impl tracing::Subscriber for TracingHandler {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= &self.max_verbosity_level
    }

    fn event(&self, event: &tracing::Event<'_>) {
        let mut test_event = TracingEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields: HashMap::new(),
        };
        event.record(&mut TracingEventVisitor {
            event: &mut test_event,
        });
        self.events.lock().unwrap().push(test_event);
    }

    // No spans are created by the code under test.
    fn new_span(&self, _span: &span::Attributes<'_>) -> span::Id {
        span::Id::from_u64(1)
    }
    fn record(&self, _span: &span::Id, _values: &span::Record<'_>) {}
    fn record_follows_from(&self, _span: &span::Id, _follows: &span::Id) {}
    fn enter(&self, _span: &span::Id) {}
    fn exit(&self, _span: &span::Id) {}
}

/// Stores every field of an event as a string.
struct TracingEventVisitor<'a> {
    event: &'a mut TracingEvent,
}

impl tracing::field::Visit for TracingEventVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.event
            .fields
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.event
            .fields
            .insert(field.name().to_string(), format!("{:?}", value));
    }
}
