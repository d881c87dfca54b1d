mod command;

use std::sync::atomic::{AtomicI32, Ordering};

use derive_where::derive_where;
use futures_core::future::BoxFuture;

use crate::error::Result;

pub(crate) use command::Command;

/// Returns a process-wide unique request id.
pub(crate) fn next_request_id() -> i32 {
    static REQUEST_ID: AtomicI32 = AtomicI32::new(0);

    REQUEST_ID.fetch_add(1, Ordering::SeqCst)
}

/// The byte-level channel a [`Connection`] sends commands over and receives replies from.
///
/// Message framing is the transport's responsibility: `send` receives one BSON-encoded command
/// document and `receive` yields one BSON-encoded reply document. Failures should be reported as
/// [`ErrorKind::Io`](crate::error::ErrorKind::Io).
pub trait Transport: Send {
    /// Transmits one encoded command.
    fn send(&mut self, bytes: Vec<u8>) -> BoxFuture<'_, Result<()>>;

    /// Waits for the encoded reply to the last command sent.
    fn receive(&mut self) -> BoxFuture<'_, Result<Vec<u8>>>;
}

/// User-facing information about a connection to the database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// A driver-generated identifier that uniquely identifies the connection.
    pub id: u32,

    /// The address of the server that the connection is connected to, in `host:port` form.
    pub address: String,
}

/// A connection to a single server. Commands are dispatched over a connection one at a time,
/// which keeps each connection's monitoring events in order.
#[derive_where(Debug)]
pub struct Connection {
    info: ConnectionInfo,

    #[derive_where(skip)]
    transport: Box<dyn Transport>,
}

impl Connection {
    /// Constructs a new connection over `transport`.
    pub fn new(id: u32, address: impl Into<String>, transport: impl Transport + 'static) -> Self {
        Self {
            info: ConnectionInfo {
                id,
                address: address.into(),
            },
            transport: Box::new(transport),
        }
    }

    /// Information about this connection.
    pub fn info(&self) -> &ConnectionInfo {
        &self.info
    }

    /// Sends an encoded command and waits for the encoded reply.
    pub(crate) async fn send_and_receive(&mut self, message: Vec<u8>) -> Result<Vec<u8>> {
        self.transport.send(message).await?;
        self.transport.receive().await
    }
}
