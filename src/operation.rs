
use serde::Deserialize;

use crate::{
    bson::{Bson, Document},
    bson_util,
    error::{CommandError, Error, ErrorKind, Result, WriteConcernError, WriteError, WriteException},
};

/// Commands that modify data or metadata and therefore must always be routed to a primary.
/// Names are lowercase.
const WRITE_COMMAND_NAMES: &[&str] = &[
    "insert",
    "update",
    "delete",
    "findandmodify",
    "bulkwrite",
    "create",
    "drop",
    "collmod",
    "renamecollection",
    "converttocapped",
    "clonecollectionascapped",
    "createindexes",
    "dropindexes",
    "dropdatabase",
    "createuser",
    "updateuser",
    "dropuser",
    "dropallusersfromdatabase",
    "grantrolestouser",
    "revokerolesfromuser",
    "createrole",
    "updaterole",
    "droprole",
    "dropallrolesfromdatabase",
    "grantprivilegestorole",
    "revokeprivilegesfromrole",
    "grantrolestorole",
    "revokerolesfromrole",
    "createsearchindexes",
    "updatesearchindex",
    "dropsearchindex",
];

/// Whether an operation reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// An operation that only reads data. Reads may be routed according to a read preference.
    Read,

    /// An operation that modifies data. Writes are always routed to the primary and never carry a
    /// read preference.
    Write,
}

impl OperationKind {
    /// Classifies a command document by its first key. Aggregations whose final stage is `$out`
    /// or `$merge`, and map-reduces that don't return their results inline, are writes.
    pub fn of(command: &Document) -> Self {
        let name = match bson_util::first_key(command) {
            Some(name) => name.to_lowercase(),
            None => return Self::Read,
        };
        if WRITE_COMMAND_NAMES.contains(&name.as_str()) {
            return Self::Write;
        }
        if name == "aggregate" && is_out_or_merge(command) {
            return Self::Write;
        }
        if name == "mapreduce" && !is_inline_out(command) {
            return Self::Write;
        }
        Self::Read
    }

    /// Combines a caller-declared kind with the kind inferred from the command. Either one being
    /// a write makes the operation a write.
    pub(crate) fn resolve(declared: Option<Self>, command: &Document) -> Self {
        match declared {
            Some(Self::Write) => Self::Write,
            _ => Self::of(command),
        }
    }
}

/// Returns whether the pipeline of an aggregate command ends in a `$out` or `$merge` stage.
fn is_out_or_merge(command: &Document) -> bool {
    command
        .get_array("pipeline")
        .ok()
        .and_then(|pipeline| pipeline.last())
        .and_then(Bson::as_document)
        .map(|stage| {
            let stage = bson_util::first_key(stage);
            stage == Some("$out") || stage == Some("$merge")
        })
        .unwrap_or(false)
}

/// Returns whether a map-reduce command returns its results inline (`out: { inline: 1 }`) rather
/// than writing them to a collection. A command without `out` is treated as writing.
fn is_inline_out(command: &Document) -> bool {
    command
        .get_document("out")
        .map(|out| out.contains_key("inline"))
        .unwrap_or(false)
}

/// The classification of a server reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyVerdict {
    /// The command succeeded.
    Success(Document),

    /// The command failed (`ok: 0`).
    CommandFailure(CommandError),

    /// The command succeeded (`ok: 1`) but the reply reports per-document write errors and/or a
    /// write concern error.
    WriteFailure {
        /// The full reply.
        reply: Document,
        /// The errors the reply reported.
        exception: WriteException,
        /// The top-level `errorLabels` of the reply.
        labels: Vec<String>,
    },
}

impl ReplyVerdict {
    /// Whether the server reported `ok: 1`.
    pub fn is_command_success(&self) -> bool {
        !matches!(self, Self::CommandFailure(_))
    }

    /// Converts this verdict into the reply or the error it describes.
    pub fn into_result(self) -> Result<Document> {
        match self {
            Self::Success(reply) => Ok(reply),
            Self::CommandFailure(command_error) => Err(ErrorKind::Command(command_error).into()),
            Self::WriteFailure {
                exception, labels, ..
            } => Err(Error::new(ErrorKind::Write(exception), Some(labels))),
        }
    }
}

/// A reply body useful for deserializing write errors and write concern errors. Fields of the
/// reply that aren't errors are ignored.
#[derive(Debug, Deserialize)]
struct WriteResponseBody {
    #[serde(rename = "writeErrors")]
    write_errors: Option<Vec<WriteError>>,

    #[serde(rename = "writeConcernError")]
    write_concern_error: Option<WriteConcernError>,

    #[serde(rename = "errorLabels")]
    labels: Option<Vec<String>>,
}

/// Classifies a raw server reply.
///
/// Code names are passed through exactly as the server reported them, and are empty when the
/// server omitted them. A reply without a numeric `ok` field, or with error fields of the wrong
/// type, is an invalid response.
pub fn translate(reply: &Document) -> Result<ReplyVerdict> {
    let ok = reply
        .get("ok")
        .ok_or_else(|| Error::invalid_response("reply is missing the \"ok\" field"))?;
    let ok = bson_util::is_truthy(ok).ok_or_else(|| {
        Error::invalid_response(format!("reply has a non-numeric \"ok\" field: {}", ok))
    })?;

    if !ok {
        let command_error: CommandError = crate::bson::from_document(reply.clone())
            .map_err(|e| Error::invalid_response(format!("malformed command error: {}", e)))?;
        return Ok(ReplyVerdict::CommandFailure(command_error));
    }

    if !reply.contains_key("writeErrors") && !reply.contains_key("writeConcernError") {
        return Ok(ReplyVerdict::Success(reply.clone()));
    }

    let body: WriteResponseBody = crate::bson::from_document(reply.clone())
        .map_err(|e| Error::invalid_response(format!("malformed write errors: {}", e)))?;
    match WriteException::new(body.write_errors.unwrap_or_default(), body.write_concern_error) {
        Some(exception) => Ok(ReplyVerdict::WriteFailure {
            reply: reply.clone(),
            exception,
            labels: body.labels.unwrap_or_default(),
        }),
        None => Ok(ReplyVerdict::Success(reply.clone())),
    }
}
