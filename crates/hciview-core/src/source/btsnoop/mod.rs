//! btsnoop capture-container source.
//!
//! Handles file I/O and the container framing only: header validation,
//! record headers, payload extraction, timestamp rebasing. The HCI bytes
//! inside each record are opaque at this layer; classification happens in
//! `crate::hci`.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use error::BtsnoopError;
pub use parser::BtsnoopReader;
