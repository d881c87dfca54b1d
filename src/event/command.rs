//! Contains the events and functionality for monitoring the commands sent to the server.

use std::time::Duration;

use derive_more::From;

use crate::{bson::Document, cmap::ConnectionInfo, error::Error};

/// An event that triggers when a database command is initiated.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct CommandStartedEvent {
    /// The command being run, exactly as it will be sent (including any `$readPreference`). Empty
    /// for sensitive commands.
    pub command: Document,

    /// The name of the database the command is being run against.
    pub db: String,

    /// The type of command being run, e.g. "find" or "hello".
    pub command_name: String,

    /// The driver-generated identifier for the request. Applications can use this to identify the
    /// corresponding event triggered by the completion of this command (i.e. either
    /// `CommandSucceededEvent` or `CommandFailedEvent`).
    pub request_id: i32,

    /// Information about the connection the command will be run on.
    pub connection: ConnectionInfo,
}

/// An event that triggers when a database command completes without an error.
///
/// A write command that the server acknowledged with `ok: 1` succeeds even when its reply carries
/// write errors or a write concern error.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct CommandSucceededEvent {
    /// The total execution time of the command (including the network round-trip).
    pub duration: Duration,

    /// The server's reply to the command. Empty for sensitive commands.
    pub reply: Document,

    /// The type of command that was run, e.g. "find" or "hello".
    pub command_name: String,

    /// The driver-generated identifier for the request. Applications can use this to identify the
    /// corresponding `CommandStartedEvent` that triggered earlier.
    pub request_id: i32,

    /// Information about the connection the command was run on.
    pub connection: ConnectionInfo,
}

/// An event that triggers when a command failed to complete successfully.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct CommandFailedEvent {
    /// The total execution time of the command (including the network round-trip).
    pub duration: Duration,

    /// The type of command that was run, e.g. "find" or "hello".
    pub command_name: String,

    /// The error that the driver returned due to the event failing.
    pub failure: Error,

    /// The driver-generated identifier for the request. Applications can use this to identify the
    /// corresponding `CommandStartedEvent` that triggered earlier.
    pub request_id: i32,

    /// Information about the connection the command was run on.
    pub connection: ConnectionInfo,
}

/// A command monitoring event.
#[allow(missing_docs)]
#[derive(Clone, Debug, From)]
#[non_exhaustive]
pub enum CommandEvent {
    Started(CommandStartedEvent),
    Succeeded(CommandSucceededEvent),
    Failed(CommandFailedEvent),
}

impl CommandEvent {
    /// The name of the command this event describes.
    pub fn command_name(&self) -> &str {
        match self {
            Self::Started(e) => e.command_name.as_str(),
            Self::Succeeded(e) => e.command_name.as_str(),
            Self::Failed(e) => e.command_name.as_str(),
        }
    }

    /// The request id of the command this event describes.
    pub fn request_id(&self) -> i32 {
        match self {
            Self::Started(e) => e.request_id,
            Self::Succeeded(e) => e.request_id,
            Self::Failed(e) => e.request_id,
        }
    }

    /// The connection the command described by this event was run on.
    pub fn connection(&self) -> &ConnectionInfo {
        match self {
            Self::Started(e) => &e.connection,
            Self::Succeeded(e) => &e.connection,
            Self::Failed(e) => &e.connection,
        }
    }
}

/// Applications can implement this trait to specify custom logic to run on each command event sent
/// by the dispatcher.
///
/// ```rust
/// # use std::sync::Arc;
/// # use mongodb_dispatch::event::{command::{CommandEvent, CommandEventHandler, CommandFailedEvent}, EventBus};
/// struct FailedCommandLogger;
///
/// impl CommandEventHandler for FailedCommandLogger {
///     fn handle_command_failed_event(&self, event: CommandFailedEvent) {
///         eprintln!("Failed command: {:?}", event);
///     }
/// }
///
/// let bus = EventBus::<CommandEvent>::new();
/// bus.subscribe(Arc::new(FailedCommandLogger));
/// ```
pub trait CommandEventHandler: Send + Sync {
    /// Called on each registered handler whenever a database command is initiated.
    fn handle_command_started_event(&self, _event: CommandStartedEvent) {}

    /// Called on each registered handler whenever a database command successfully completes.
    fn handle_command_succeeded_event(&self, _event: CommandSucceededEvent) {}

    /// Called on each registered handler whenever a database command fails to complete
    /// successfully.
    fn handle_command_failed_event(&self, _event: CommandFailedEvent) {}
}
