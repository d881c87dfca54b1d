use std::{future::Future, time::Duration};

use crate::error::Result;

/// Awaits `future`, failing with an I/O error of kind `TimedOut` if it does not complete within
/// `timeout`. A `timeout` of `None` waits indefinitely.
pub(crate) async fn timeout<F: Future>(timeout: Option<Duration>, future: F) -> Result<F::Output> {
    match timeout {
        Some(timeout) => tokio::time::timeout(timeout, future)
            .await
            .map_err(|_| std::io::ErrorKind::TimedOut.into()),
        None => Ok(future.await),
    }
}
