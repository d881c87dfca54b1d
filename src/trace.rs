use crate::bson::{Bson, Document};

pub(crate) mod command;

pub(crate) const COMMAND_TRACING_EVENT_TARGET: &str = "mongodb_dispatch::command";
pub(crate) const EVENT_TRACING_EVENT_TARGET: &str = "mongodb_dispatch::event";
pub(crate) const DEFAULT_MAX_DOCUMENT_LENGTH_BYTES: usize = 1000;

pub(crate) trait TracingRepresentation {
    type Representation;

    fn tracing_representation(&self) -> Self::Representation;
}

impl TracingRepresentation for Document {
    type Representation = String;

    fn tracing_representation(&self) -> String {
        Bson::Document(self.clone())
            .into_relaxed_extjson()
            .to_string()
    }
}

impl TracingRepresentation for crate::error::Error {
    type Representation = String;

    fn tracing_representation(&self) -> String {
        self.to_string()
    }
}

/// Serializes a command or reply to extended JSON, truncated to at most `max_length_bytes` bytes
/// (plus a trailing "...").
pub(crate) fn serialize_command_or_reply(doc: Document, max_length_bytes: usize) -> String {
    let mut ext_json = doc.tracing_representation();
    truncate_on_char_boundary(&mut ext_json, max_length_bytes);
    ext_json
}

pub(crate) fn truncate_on_char_boundary(s: &mut String, new_len: usize) {
    let original_len = s.len();
    if original_len > new_len {
        let mut truncate_index = new_len;
        while !s.is_char_boundary(truncate_index) {
            truncate_index -= 1;
        }
        s.truncate(truncate_index);
        if s.len() < original_len {
            s.push_str("...");
        }
    }
}
