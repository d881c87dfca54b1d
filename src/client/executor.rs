use std::time::{Duration, Instant};

use typed_builder::TypedBuilder;

use super::Dispatcher;
use crate::{
    bson::Document,
    bson_util,
    cmap::{next_request_id, Command, Connection, ConnectionInfo},
    error::{Error, ErrorKind, Result},
    event::command::{
        CommandEvent,
        CommandFailedEvent,
        CommandStartedEvent,
        CommandSucceededEvent,
    },
    operation::{translate, OperationKind, ReplyVerdict},
    read_preference::ReadPreference,
    runtime,
    trace::COMMAND_TRACING_EVENT_TARGET,
};

/// A command to run with [`Dispatcher::dispatch`].
///
/// ```rust
/// # use mongodb_dispatch::{bson::doc, options::ReadPreference, CommandRequest};
/// let request = CommandRequest::builder()
///     .target_db("inventory")
///     .body(doc! { "find": "items", "filter": { "qty": { "$gt": 4 } } })
///     .read_preference(ReadPreference::SecondaryPreferred { options: None })
///     .build();
/// ```
#[derive(Clone, Debug, TypedBuilder)]
#[builder(field_defaults(default, setter(into)))]
#[non_exhaustive]
pub struct CommandRequest {
    /// The database to run the command against.
    #[builder(!default)]
    pub target_db: String,

    /// The command document. Its first key names the command.
    #[builder(!default)]
    pub body: Document,

    /// The read preference the caller requested. Whether it is sent depends on the operation kind
    /// and the topology. Defaults to primary.
    pub read_preference: Option<ReadPreference>,

    /// Declares the command a write. A command whose body is recognized as a write is always
    /// treated as one, even when this is set to [`OperationKind::Read`].
    pub operation_kind: Option<OperationKind>,

    /// The name reported in monitoring events. Defaults to the first key of the body.
    pub command_name: Option<String>,
}

impl Dispatcher {
    /// Runs `request` on `connection` and returns the server's reply.
    ///
    /// A `CommandStartedEvent` is published before the command is sent, and exactly one
    /// `CommandSucceededEvent` or `CommandFailedEvent` with the same request id once it completes.
    /// A reply with `ok: 1` publishes a succeeded event even if it reports write errors or a write
    /// concern error; this method still returns those as an [`ErrorKind::Write`] error.
    ///
    /// If the returned future is dropped after the command was started, a `CommandFailedEvent`
    /// whose failure is [`ErrorKind::Cancelled`] is published.
    ///
    /// Errors that occur before the command is started (an empty body, or a body that can't be
    /// serialized) are returned without publishing any events.
    ///
    /// [`ErrorKind::Write`]: crate::error::ErrorKind::Write
    /// [`ErrorKind::Cancelled`]: crate::error::ErrorKind::Cancelled
    pub async fn dispatch(
        &self,
        connection: &mut Connection,
        request: CommandRequest,
    ) -> Result<Document> {
        let kind = OperationKind::resolve(request.operation_kind, &request.body);
        let name = match request.command_name {
            Some(name) => name,
            None => bson_util::first_key(&request.body)
                .map(String::from)
                .ok_or_else(|| Error::invalid_argument("cannot dispatch an empty command"))?,
        };

        let mut command = Command::new(name, request.target_db, request.body);
        self.inner
            .topology
            .current_topology()
            .update_command_with_read_pref(&mut command, request.read_preference.as_ref(), kind);
        command.stamp_db();
        let message = command.to_bytes()?;

        let request_id = next_request_id();
        let connection_info = connection.info().clone();
        let should_redact = command.should_redact();

        self.emit_command_event(
            CommandStartedEvent {
                command: if should_redact {
                    Document::new()
                } else {
                    command.body
                },
                db: command.target_db,
                command_name: command.name.clone(),
                request_id,
                connection: connection_info.clone(),
            }
            .into(),
        );

        let completion = CommandCompletion {
            dispatcher: self,
            command_name: command.name,
            request_id,
            connection: connection_info,
            should_redact,
            start_time: Instant::now(),
            completed: false,
        };

        let round_trip = async {
            let reply = runtime::timeout(
                self.inner.options.command_timeout,
                connection.send_and_receive(message),
            )
            .await??;
            let reply = bson_util::from_bson_bytes(&reply)?;
            translate(&reply)
        };

        let verdict = match round_trip.await {
            Ok(verdict) => verdict,
            Err(error) => {
                completion.failed(&error);
                return Err(error);
            }
        };

        match verdict {
            ReplyVerdict::Success(ref reply) | ReplyVerdict::WriteFailure { ref reply, .. } => {
                completion.succeeded(reply.clone());
                verdict.into_result()
            }
            ReplyVerdict::CommandFailure(command_error) => {
                let error = Error::from(ErrorKind::Command(command_error));
                completion.failed(&error);
                Err(error)
            }
        }
    }
}

/// Publishes the event that completes a started command. If dropped before either `succeeded` or
/// `failed` is called, the command was cancelled and a failed event is published instead.
struct CommandCompletion<'a> {
    dispatcher: &'a Dispatcher,
    command_name: String,
    request_id: i32,
    connection: ConnectionInfo,
    should_redact: bool,
    start_time: Instant,
    completed: bool,
}

impl CommandCompletion<'_> {
    fn succeeded(mut self, reply: Document) {
        self.completed = true;
        let reply = if self.should_redact {
            Document::new()
        } else {
            reply
        };
        self.dispatcher.emit_command_event(
            CommandSucceededEvent {
                duration: self.elapsed(),
                reply,
                command_name: std::mem::take(&mut self.command_name),
                request_id: self.request_id,
                connection: self.connection.clone(),
            }
            .into(),
        );
    }

    fn failed(mut self, error: &Error) {
        self.completed = true;
        let failure = if self.should_redact {
            error.redacted()
        } else {
            error.clone()
        };
        self.emit_failed(failure);
    }

    fn emit_failed(&mut self, failure: Error) {
        self.dispatcher.emit_command_event(CommandEvent::Failed(CommandFailedEvent {
            duration: self.elapsed(),
            command_name: std::mem::take(&mut self.command_name),
            failure,
            request_id: self.request_id,
            connection: self.connection.clone(),
        }));
    }

    fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Drop for CommandCompletion<'_> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        tracing::debug!(
            target: COMMAND_TRACING_EVENT_TARGET,
            commandName = self.command_name,
            requestId = self.request_id,
            driverConnectionId = self.connection.id,
            "Command cancelled before completion"
        );
        self.emit_failed(Error::cancelled(
            "the command future was dropped before a reply was received",
        ));
    }
}
