use crate::{
    bson::{Bson, Document},
    bson_util,
    error::Result,
    read_preference::ReadPreference,
};

/// Commands whose bodies and replies must never be exposed through monitoring.
pub(crate) const REDACTED_COMMANDS: [&str; 9] = [
    "authenticate",
    "saslstart",
    "saslcontinue",
    "getnonce",
    "createuser",
    "updateuser",
    "copydbgetnonce",
    "copydbsaslstart",
    "copydb",
];

/// Handshake commands, which are only sensitive when they carry speculative authentication.
pub(crate) const HELLO_COMMAND_NAMES: [&str; 3] = ["hello", "ismaster", "legacy hello"];

const READ_PREFERENCE_KEY: &str = "$readPreference";

/// `Command` is a driver side abstraction of a server command containing all the information
/// necessary to serialize it to a wire message.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Command {
    pub(crate) name: String,
    pub(crate) target_db: String,
    pub(crate) read_pref: Option<ReadPreference>,
    pub(crate) body: Document,
}

impl Command {
    /// Constructs a new command.
    pub(crate) fn new(
        name: impl Into<String>,
        target_db: impl Into<String>,
        body: Document,
    ) -> Self {
        Self {
            name: name.into(),
            target_db: target_db.into(),
            read_pref: None,
            body,
        }
    }

    pub(crate) fn set_read_preference(&mut self, read_preference: ReadPreference) {
        // `ReadPreference` always serializes to a document, so this cannot fail.
        if let Ok(doc) = crate::bson::to_document(&read_preference) {
            self.body.insert(READ_PREFERENCE_KEY, doc);
            self.read_pref = Some(read_preference);
        }
    }

    /// Removes any read preference the caller may have placed in the body.
    pub(crate) fn clear_read_preference(&mut self) {
        self.body.remove(READ_PREFERENCE_KEY);
        self.read_pref = None;
    }

    pub(crate) fn should_redact(&self) -> bool {
        let name = self.name.to_lowercase();
        REDACTED_COMMANDS.contains(&name.as_str())
            || (HELLO_COMMAND_NAMES.contains(&name.as_str())
                && self.body.contains_key("speculativeAuthenticate"))
    }

    /// Stamps the target database onto the body, as required for every command sent with
    /// `OP_MSG`.
    pub(crate) fn stamp_db(&mut self) {
        self.body.insert("$db", Bson::String(self.target_db.clone()));
    }

    /// Serializes the body to BSON bytes.
    pub(crate) fn to_bytes(&self) -> Result<Vec<u8>> {
        bson_util::to_bson_bytes(&self.body)
    }

    /// The names of the fields in the body.
    #[cfg(test)]
    pub(crate) fn keys(&self) -> std::collections::HashSet<&str> {
        self.body.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod test {
    use super::Command;
    use crate::{bson::doc, read_preference::ReadPreference};

    #[test]
    fn read_preference_inserted_and_cleared() {
        let mut command = Command::new("find", "db", doc! { "find": "coll" });
        command.set_read_preference(ReadPreference::Nearest { options: None });
        assert_eq!(
            command.body.get_document("$readPreference").unwrap(),
            &doc! { "mode": "nearest" }
        );

        command.clear_read_preference();
        assert!(!command.keys().contains("$readPreference"));
        assert!(command.read_pref.is_none());
    }

    #[test]
    fn sensitive_commands_are_redacted() {
        let sasl = Command::new("saslStart", "admin", doc! { "saslStart": 1 });
        assert!(sasl.should_redact());

        let hello = Command::new(
            "hello",
            "admin",
            doc! { "hello": 1, "speculativeAuthenticate": {} },
        );
        assert!(hello.should_redact());

        let plain_hello = Command::new("hello", "admin", doc! { "hello": 1 });
        assert!(!plain_hello.should_redact());
    }

    #[test]
    fn db_is_stamped_last() {
        let mut command = Command::new("ping", "admin", doc! { "ping": 1 });
        command.stamp_db();
        assert_eq!(command.body, doc! { "ping": 1, "$db": "admin" });
    }
}
