use crate::{
    bson::{Bson, Document},
    error::{ErrorKind, Result},
};

/// Interprets the `ok` field of a reply. Any nonzero number (or `true`) counts as success.
/// Returns `None` if the value is not numeric or boolean.
pub(crate) fn is_truthy(val: &Bson) -> Option<bool> {
    match *val {
        Bson::Boolean(b) => Some(b),
        Bson::Int32(i) => Some(i != 0),
        Bson::Int64(i) => Some(i != 0),
        Bson::Double(f) => Some(f != 0.0),
        _ => None,
    }
}

pub(crate) fn first_key(document: &Document) -> Option<&str> {
    document.keys().next().map(String::as_str)
}

pub(crate) fn to_bson_bytes(doc: &Document) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    doc.to_writer(&mut bytes).map_err(ErrorKind::BsonSerialization)?;
    Ok(bytes)
}

pub(crate) fn from_bson_bytes(bytes: &[u8]) -> Result<Document> {
    let mut reader = bytes;
    Document::from_reader(&mut reader).map_err(|e| {
        ErrorKind::InvalidResponse {
            message: format!("reply is not a valid BSON document: {}", e),
        }
        .into()
    })
}
