//! HCI packet classification and decoding.
//!
//! Layered structure:
//! - `layout`: H4 framing constants (source of truth)
//! - `reader`: forward-only bounds-checked byte cursor
//! - `packet`: opcode/event-code value types and the classified packet
//! - `parser`: payload classification (no direct byte indexing)
//! - `decoder`: dispatch tables, decode routines, formatting, vendor seam
//!
//! Everything here is pure and I/O-free; container access lives in
//! `source`. Classification and decoding are stateless apart from the
//! static dispatch tables, so records can be processed concurrently.

pub mod decoder;
pub mod layout;
pub mod packet;
pub mod parser;
pub mod reader;

pub use decoder::{DecodeStatus, DecodedResult, HciDecoder, HciField};
pub use decoder::vendor::{UnknownVendorDecoder, VendorDecoder};
pub use packet::{
    HciCommandPacket, HciEventCode, HciEventPacket, HciOpcode, HciPacket, HciPacketType,
    HciUnknownPacket,
};
pub use parser::parse_packet;
pub use reader::HciReader;
