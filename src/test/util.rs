pub(crate) mod event_buffer;
mod trace;
mod transport;

use std::sync::Arc;

use crate::{
    event::{command::CommandEvent, EventBus},
    options::DispatcherOptions,
    Connection,
    Dispatcher,
    ServerRole,
    TopologySnapshot,
    TopologyType,
};

pub(crate) use self::{
    event_buffer::EventBuffer,
    trace::TracingHandler,
    transport::{ScriptedReply, ScriptedTransport},
};

/// A dispatcher wired to a fresh bus with an [`EventBuffer`] subscribed.
pub(crate) fn dispatcher_with_buffer(
    topology: TopologySnapshot,
    options: impl Into<Option<DispatcherOptions>>,
) -> (Dispatcher, EventBuffer) {
    let bus = Arc::new(EventBus::<CommandEvent>::new());
    let buffer = EventBuffer::new();
    bus.subscribe(buffer.handler());
    (Dispatcher::new(topology, bus, options), buffer)
}

pub(crate) fn sharded() -> TopologySnapshot {
    TopologySnapshot::new(TopologyType::Sharded, ServerRole::Mongos)
}

pub(crate) fn replica_set_primary() -> TopologySnapshot {
    TopologySnapshot::new(TopologyType::ReplicaSet, ServerRole::Primary)
}

/// A connection backed by a [`ScriptedTransport`], along with a handle to inspect what it sent.
pub(crate) fn scripted_connection(
    id: u32,
    replies: impl IntoIterator<Item = ScriptedReply>,
) -> (Connection, ScriptedTransport) {
    let transport = ScriptedTransport::new(replies);
    (
        Connection::new(id, format!("localhost:{}", 27017 + id), transport.clone()),
        transport,
    )
}
