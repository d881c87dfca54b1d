//! Contains the `Error` and `Result` types that `mongodb-dispatch` uses.

use std::{collections::HashSet, fmt, sync::Arc};

use serde::Deserialize;
use thiserror::Error;

use crate::bson::Document;

/// The code reported for a command error whose reply carried no `code` field.
pub const UNKNOWN_ERROR_CODE: i32 = -1;

/// The result type for all methods that can return an error in the `mongodb-dispatch` crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur in the `mongodb-dispatch` crate. The inner [`ErrorKind`] is boxed so
/// that `Result`s stay small.
#[derive(Clone, Debug, Error)]
#[error("Kind: {kind}, labels: {labels:?}")]
#[non_exhaustive]
pub struct Error {
    /// The type of error that occurred.
    pub kind: Box<ErrorKind>,

    labels: HashSet<String>,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, labels: Option<impl IntoIterator<Item = String>>) -> Self {
        let mut labels: HashSet<String> = labels
            .map(|labels| labels.into_iter().collect())
            .unwrap_or_default();
        match &kind {
            ErrorKind::Command(err) => labels.extend(err.labels.iter().cloned()),
            ErrorKind::Write(WriteException {
                write_concern_error: Some(wc_error),
                ..
            }) => labels.extend(wc_error.labels.iter().cloned()),
            _ => {}
        }
        Self {
            kind: Box::new(kind),
            labels,
        }
    }

    pub(crate) fn invalid_response(message: impl Into<String>) -> Self {
        ErrorKind::InvalidResponse {
            message: message.into(),
        }
        .into()
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        ErrorKind::InvalidArgument {
            message: message.into(),
        }
        .into()
    }

    pub(crate) fn cancelled(message: impl Into<String>) -> Self {
        ErrorKind::Cancelled {
            message: message.into(),
        }
        .into()
    }

    /// Returns the labels for this error.
    pub fn labels(&self) -> &HashSet<String> {
        &self.labels
    }

    /// Whether this error contains the specified label.
    pub fn contains_label<T: AsRef<str>>(&self, label: T) -> bool {
        self.labels.contains(label.as_ref())
    }

    /// Whether this error was raised by the transport while sending or receiving.
    pub fn is_network_error(&self) -> bool {
        matches!(self.kind.as_ref(), ErrorKind::Io(..))
    }

    /// Whether this error originated from the server.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self.kind.as_ref(),
            ErrorKind::Command(_) | ErrorKind::Write(_)
        )
    }

    /// Whether this error was produced by the cancellation of an in-flight command.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind.as_ref(), ErrorKind::Cancelled { .. })
    }

    /// Gets the code from this error. For write exceptions, the code of the write concern error is
    /// preferred over the code of the first write error.
    pub fn code(&self) -> Option<i32> {
        match self.kind.as_ref() {
            ErrorKind::Command(err) => Some(err.code),
            ErrorKind::Write(exception) => exception
                .write_concern_error
                .as_ref()
                .map(|wce| wce.code)
                .or_else(|| exception.write_errors.first().map(|we| we.code)),
            _ => None,
        }
    }

    /// Gets the code name from this error, exactly as the server reported it.
    pub fn code_name(&self) -> Option<&str> {
        match self.kind.as_ref() {
            ErrorKind::Command(err) => Some(err.code_name.as_str()),
            ErrorKind::Write(exception) => match exception.write_concern_error {
                Some(ref wce) => Some(wce.code_name.as_str()),
                None => exception
                    .write_errors
                    .first()
                    .and_then(|we| we.code_name.as_deref()),
            },
            _ => None,
        }
    }

    /// Returns a copy of this error suitable for events about sensitive commands: server-provided
    /// details are stripped, only the code and code name remain.
    pub(crate) fn redacted(&self) -> Self {
        match self.kind.as_ref() {
            ErrorKind::Command(err) => ErrorKind::Command(CommandError {
                code: err.code,
                code_name: err.code_name.clone(),
                message: String::new(),
                labels: err.labels.clone(),
            })
            .into(),
            ErrorKind::Write(_) | ErrorKind::InvalidResponse { .. } => {
                Error::invalid_response("REDACTED")
            }
            _ => self.clone(),
        }
    }
}

impl<E> From<E> for Error
where
    ErrorKind: From<E>,
{
    fn from(err: E) -> Self {
        Self::new(err.into(), None::<Option<String>>)
    }
}

impl From<std::io::Error> for ErrorKind {
    fn from(err: std::io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

impl From<std::io::ErrorKind> for ErrorKind {
    fn from(err: std::io::ErrorKind) -> Self {
        Self::Io(Arc::new(err.into()))
    }
}

/// The types of errors that can occur.
#[allow(missing_docs)]
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An invalid argument was provided.
    #[error("An invalid argument was provided: {message}")]
    #[non_exhaustive]
    InvalidArgument { message: String },

    /// Wrapper around `bson::de::Error`.
    #[error("{0}")]
    BsonDeserialization(crate::bson::de::Error),

    /// Wrapper around `bson::ser::Error`.
    #[error("{0}")]
    BsonSerialization(crate::bson::ser::Error),

    /// The command was cancelled after it had been started.
    #[error("The command was cancelled: {message}")]
    #[non_exhaustive]
    Cancelled { message: String },

    /// The server returned an error to an attempted command.
    #[error("Command failed: {0}")]
    Command(CommandError),

    /// An internal invariant of the dispatcher was violated.
    #[error("Internal error: {message}")]
    #[non_exhaustive]
    Internal { message: String },

    /// The server returned an invalid reply to a command.
    #[error("The server returned an invalid reply to a command: {message}")]
    #[non_exhaustive]
    InvalidResponse { message: String },

    /// Wrapper around [`std::io::Error`]. The transport reports every send or receive failure
    /// as this kind.
    #[error("I/O error: {0}")]
    Io(Arc<std::io::Error>),

    /// The server acknowledged a write command but reported per-document write errors and/or a
    /// write concern error.
    #[error("An error occurred when trying to execute a write operation: {0:?}")]
    Write(WriteException),
}

impl From<crate::bson::de::Error> for ErrorKind {
    fn from(err: crate::bson::de::Error) -> Self {
        Self::BsonDeserialization(err)
    }
}

impl From<crate::bson::ser::Error> for ErrorKind {
    fn from(err: crate::bson::ser::Error) -> Self {
        Self::BsonSerialization(err)
    }
}

fn default_error_code() -> i32 {
    UNKNOWN_ERROR_CODE
}

/// An error that occurred due to a database command failing.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[non_exhaustive]
pub struct CommandError {
    /// Identifies the type of error.
    #[serde(default = "default_error_code")]
    pub code: i32,

    /// The name associated with the error code, exactly as the server reported it. Empty if the
    /// server omitted it.
    #[serde(rename = "codeName", default)]
    pub code_name: String,

    /// A description of the error that occurred.
    #[serde(rename = "errmsg", default)]
    pub message: String,

    /// The error labels that the server returned.
    #[serde(rename = "errorLabels", default)]
    pub labels: Vec<String>,
}

impl fmt::Display for CommandError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "Error code {} ({}): {}", self.code, self.code_name, self.message)
    }
}

/// An error that occurred due to not being able to satisfy a write concern.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[non_exhaustive]
pub struct WriteConcernError {
    /// Identifies the type of write concern error.
    #[serde(default = "default_error_code")]
    pub code: i32,

    /// The name associated with the error code, exactly as the server reported it. Empty if the
    /// server omitted it.
    #[serde(rename = "codeName", default)]
    pub code_name: String,

    /// A description of the error that occurred.
    #[serde(rename = "errmsg", default)]
    pub message: String,

    /// A document identifying the write concern setting related to the error.
    #[serde(rename = "errInfo")]
    pub details: Option<Document>,

    /// The error labels that the server returned.
    #[serde(rename = "errorLabels", default)]
    pub labels: Vec<String>,
}

/// An error that occurred while writing a single document, not caused by the write concern.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[non_exhaustive]
pub struct WriteError {
    /// Index into the list of documents that this error corresponds to.
    pub index: usize,

    /// Identifies the type of write error.
    #[serde(default = "default_error_code")]
    pub code: i32,

    /// The name associated with the error code.
    ///
    /// Note that the server will not return this in some cases, hence `code_name` being an
    /// `Option`.
    #[serde(rename = "codeName", default)]
    pub code_name: Option<String>,

    /// A description of the error that occurred.
    #[serde(rename = "errmsg", default)]
    pub message: String,

    /// A document providing more information about the write error (e.g. details
    /// pertaining to document validation).
    #[serde(rename = "errInfo")]
    pub details: Option<Document>,
}

/// The set of errors reported by an otherwise successful write command.
///
/// A `WriteException` always carries at least one write error or a write concern error.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct WriteException {
    /// The per-document errors that occurred, in the order the server reported them.
    pub write_errors: Vec<WriteError>,

    /// The error that occurred on account of write concern failure.
    pub write_concern_error: Option<WriteConcernError>,
}

impl WriteException {
    /// Returns `None` when there is nothing to report, since a write without errors is a
    /// success.
    pub(crate) fn new(
        write_errors: Vec<WriteError>,
        write_concern_error: Option<WriteConcernError>,
    ) -> Option<Self> {
        if write_errors.is_empty() && write_concern_error.is_none() {
            return None;
        }
        Some(Self {
            write_errors,
            write_concern_error,
        })
    }
}
