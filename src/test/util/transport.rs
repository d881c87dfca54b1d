use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use futures_core::future::BoxFuture;

use crate::{
    bson::Document,
    bson_util,
    error::{Error, Result},
    Transport,
};

/// What a [`ScriptedTransport`] does when asked for the next reply.
#[derive(Clone, Debug)]
pub(crate) enum ScriptedReply {
    /// Replies with the document.
    Reply(Document),

    /// Replies with the document after waiting.
    Delayed(Duration, Document),

    /// Replies with bytes that may not be a valid document.
    Raw(Vec<u8>),

    /// Fails the receive.
    Error(Error),

    /// Never replies.
    Pending,
}

/// An in-memory transport that records every command sent over it and replies from a script.
/// Clones share the same script and record.
#[derive(Clone, Debug, Default)]
pub(crate) struct ScriptedTransport {
    inner: Arc<Mutex<ScriptedTransportInner>>,
}

#[derive(Debug, Default)]
struct ScriptedTransportInner {
    replies: VecDeque<ScriptedReply>,
    sent: Vec<Document>,
}

impl ScriptedTransport {
    pub(crate) fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ScriptedTransportInner {
                replies: replies.into_iter().collect(),
                sent: Vec::new(),
            })),
        }
    }

    /// Every command sent so far, decoded.
    pub(crate) fn sent(&self) -> Vec<Document> {
        self.inner.lock().unwrap().sent.clone()
    }
}

impl Transport for ScriptedTransport {
    fn send(&mut self, bytes: Vec<u8>) -> BoxFuture<'_, Result<()>> {
        let result = bson_util::from_bson_bytes(&bytes).map(|command| {
            self.inner.lock().unwrap().sent.push(command);
        });
        Box::pin(async move { result })
    }

    fn receive(&mut self) -> BoxFuture<'_, Result<Vec<u8>>> {
        let next = self.inner.lock().unwrap().replies.pop_front();
        Box::pin(async move {
            match next {
                Some(ScriptedReply::Reply(reply)) => bson_util::to_bson_bytes(&reply),
                Some(ScriptedReply::Delayed(delay, reply)) => {
                    tokio::time::sleep(delay).await;
                    bson_util::to_bson_bytes(&reply)
                }
                Some(ScriptedReply::Raw(bytes)) => Ok(bytes),
                Some(ScriptedReply::Error(error)) => Err(error),
                Some(ScriptedReply::Pending) => std::future::pending().await,
                None => Err(std::io::ErrorKind::UnexpectedEof.into()),
            }
        })
    }
}
