//! Contains all of the types needed to specify options to `mongodb-dispatch` methods.
//!
//! Most of the options structs in this module use the
//! [`typed-builder`](https://crates.io/crates/typed-builder) crate to derive a type-safe builder
//! API on them. For example, to create an instance of
//! [`DispatcherOptions`](struct.DispatcherOptions.html) with only `command_timeout` specified:
//!
//! ```rust
//! # use std::time::Duration;
//! # use mongodb_dispatch::options::DispatcherOptions;
//! let options = DispatcherOptions::builder()
//!     .command_timeout(Duration::from_secs(5))
//!     .build();
//! ```

pub use crate::{
    client::options::DispatcherOptions,
    read_preference::{ReadPreference, ReadPreferenceOptions, TagSet},
};
