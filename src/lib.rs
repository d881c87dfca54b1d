//! This crate contains the command dispatch layer of a MongoDB client: the piece that sits between
//! an operation and a connection. It uses the [`bson`] crate for BSON support and [`tokio`] for
//! async timeouts and event channels.
//!
//! For each command, a [`Dispatcher`]:
//!
//! 1. decides whether the caller's read preference must be embedded in the command as
//!    `$readPreference`, based on whether the command reads or writes and on the
//!    [`TopologyType`] of the deployment;
//! 2. publishes a [`CommandStartedEvent`](event::command::CommandStartedEvent);
//! 3. sends the command over a [`Connection`] and waits for the reply;
//! 4. translates the reply into either the reply document or a structured
//!    [`Error`](error::Error) that preserves the server's `codeName` verbatim;
//! 5. publishes exactly one [`CommandSucceededEvent`](event::command::CommandSucceededEvent) or
//!    [`CommandFailedEvent`](event::command::CommandFailedEvent).
//!
//! # Example
//!
//! ```rust
//! # use std::sync::Arc;
//! # use mongodb_dispatch::{
//! #     bson::doc,
//! #     error::Result,
//! #     event::{command::CommandEvent, EventBus},
//! #     options::ReadPreference,
//! #     CommandRequest,
//! #     Connection,
//! #     Dispatcher,
//! #     ServerRole,
//! #     TopologySnapshot,
//! #     TopologyType,
//! # };
//! # async fn run(mut connection: Connection) -> Result<()> {
//! let bus = Arc::new(EventBus::<CommandEvent>::new());
//! let (tx, mut events) = tokio::sync::mpsc::unbounded_channel();
//! bus.subscribe(tx);
//!
//! let topology = TopologySnapshot::new(TopologyType::Sharded, ServerRole::Mongos);
//! let dispatcher = Dispatcher::new(topology, bus, None);
//!
//! let reply = dispatcher
//!     .dispatch(
//!         &mut connection,
//!         CommandRequest::builder()
//!             .target_db("inventory")
//!             .body(doc! { "find": "items" })
//!             .read_preference(ReadPreference::Nearest { options: None })
//!             .build(),
//!     )
//!     .await?;
//! println!("{}", reply);
//!
//! while let Ok(event) = events.try_recv() {
//!     println!("{} #{}", event.command_name(), event.request_id());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! Every command monitoring event is also emitted as a [`tracing`](https://docs.rs/tracing) event
//! at the `DEBUG` level under the `mongodb_dispatch::command` target, with commands and replies
//! rendered as relaxed extended JSON and truncated to
//! [`max_document_length_bytes`](options::DispatcherOptions::max_document_length_bytes).

#![warn(missing_docs)]

pub mod options;

pub use ::bson;

mod bson_util;
mod client;
mod cmap;
pub mod error;
pub mod event;
mod operation;
mod read_preference;
pub(crate) mod runtime;
mod sdam;
mod trace;

pub use crate::{
    client::{CommandRequest, Dispatcher},
    cmap::{Connection, ConnectionInfo, Transport},
    operation::{translate, OperationKind, ReplyVerdict},
    sdam::{ServerRole, TopologyClassifier, TopologySnapshot, TopologyType},
};
