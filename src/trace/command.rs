use crate::{
    event::command::CommandEvent,
    trace::{
        serialize_command_or_reply,
        truncate_on_char_boundary,
        TracingRepresentation,
        COMMAND_TRACING_EVENT_TARGET,
        DEFAULT_MAX_DOCUMENT_LENGTH_BYTES,
    },
};

/// Type responsible for listening for command monitoring events and converting them to
/// and emitting them as tracing events.
#[derive(Clone, Debug)]
pub(crate) struct CommandTracingEventEmitter {
    max_document_length_bytes: usize,
}

impl CommandTracingEventEmitter {
    pub(crate) fn new(max_document_length_bytes: Option<usize>) -> CommandTracingEventEmitter {
        CommandTracingEventEmitter {
            max_document_length_bytes: max_document_length_bytes
                .unwrap_or(DEFAULT_MAX_DOCUMENT_LENGTH_BYTES),
        }
    }

    pub(crate) fn handle(&self, event: CommandEvent) {
        match event {
            CommandEvent::Started(event) => {
                tracing::debug!(
                    target: COMMAND_TRACING_EVENT_TARGET,
                    command = serialize_command_or_reply(event.command, self.max_document_length_bytes),
                    databaseName = event.db,
                    commandName = event.command_name,
                    requestId = event.request_id,
                    driverConnectionId = event.connection.id,
                    serverHost = event.connection.address,
                    "Command started"
                );
            }
            CommandEvent::Succeeded(event) => {
                tracing::debug!(
                    target: COMMAND_TRACING_EVENT_TARGET,
                    reply = serialize_command_or_reply(event.reply, self.max_document_length_bytes),
                    commandName = event.command_name,
                    requestId = event.request_id,
                    driverConnectionId = event.connection.id,
                    serverHost = event.connection.address,
                    durationMS = event.duration.as_millis(),
                    "Command succeeded"
                );
            }
            CommandEvent::Failed(event) => {
                let mut failure = event.failure.tracing_representation();
                truncate_on_char_boundary(&mut failure, self.max_document_length_bytes);
                tracing::debug!(
                    target: COMMAND_TRACING_EVENT_TARGET,
                    failure,
                    commandName = event.command_name,
                    requestId = event.request_id,
                    driverConnectionId = event.connection.id,
                    serverHost = event.connection.address,
                    durationMS = event.duration.as_millis(),
                    "Command failed"
                );
            }
        }
    }
}
