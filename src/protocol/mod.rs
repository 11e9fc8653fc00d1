//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (V1 - Simple Binary)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Tag (1)  │ Len (4)  │   Payload (bincode)         │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! Each operation has one fixed tag (see [`MessageTag`]). Argument-free
//! operations are bodyless: `Len` is 0 and a payload on such a tag is a
//! protocol error. All other tags carry the bincode encoding of their
//! argument type.
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │   Payload                   │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK       - payload is the bincode result value (absent for unit)
//! - 0x01: REJECTED - payload is the bincode `CatalogError`
//! - 0x02: FAILED   - payload is a UTF-8 diagnostic message
//!
//! ### Connection Handshake
//!
//! Every connection opens with a 9-byte hello preamble carrying the
//! protocol magic, version, and the CRC32 fingerprint of the wire-type
//! manifest (see [`contract`]). Contract mismatches surface at connection
//! startup as typed protocol errors instead of opaque decode failures
//! mid-stream.

pub mod contract;

mod codec;
mod message;
mod response;

pub use codec::{
    decode_request, decode_response, encode_request, encode_response, read_request, read_response,
    write_request, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
pub use message::{MessageTag, Request};
pub use response::{Response, Status};
