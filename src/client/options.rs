//! Contains the options for configuring a [`Dispatcher`](crate::Dispatcher).

use std::time::Duration;

use serde::Deserialize;
use typed_builder::TypedBuilder;

/// Contains the options that can be used to create a new [`Dispatcher`](crate::Dispatcher).
#[derive(Clone, Debug, Default, Deserialize, PartialEq, TypedBuilder)]
#[builder(field_defaults(default, setter(into)))]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct DispatcherOptions {
    /// The amount of time to wait for a reply after a command has been started. A command that
    /// exceeds it fails with an I/O error of kind [`TimedOut`](std::io::ErrorKind::TimedOut).
    ///
    /// The default is no timeout.
    #[serde(default, rename = "commandTimeoutMS", with = "duration_option_as_int_millis")]
    pub command_timeout: Option<Duration>,

    /// The maximum length, in bytes, of commands and replies included in tracing events. Longer
    /// documents are truncated.
    ///
    /// The default is 1000.
    pub max_document_length_bytes: Option<usize>,

    /// Whether command monitoring events are also emitted as `tracing` events at the `DEBUG`
    /// level, under the `mongodb_dispatch::command` target.
    ///
    /// The default is `true`.
    pub tracing_enabled: Option<bool>,
}

mod duration_option_as_int_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub(super) fn deserialize<'de, D>(
        deserializer: D,
    ) -> std::result::Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}
