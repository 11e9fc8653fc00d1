//! Response definitions
//!
//! The response envelope carries either a success payload or one embedded
//! application error, decoded and re-raised by the client in its original
//! kind.

use crate::error::CatalogError;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    /// Success; payload is the bincode result value, absent for unit results
    Ok = 0x00,

    /// The server rejected the operation; payload is the bincode
    /// `CatalogError`
    Rejected = 0x01,

    /// Server-side protocol or internal failure; payload is a UTF-8
    /// diagnostic message
    Failed = 0x02,
}

impl Status {
    /// Parse a status byte
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Ok),
            0x01 => Some(Self::Rejected),
            0x02 => Some(Self::Failed),
            _ => None,
        }
    }
}

/// A response envelope to send to the client
#[derive(Debug, Clone)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload; meaning depends on the status
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create a REJECTED response embedding an application error.
    ///
    /// Falls back to a FAILED envelope in the (unreachable in practice)
    /// case that the error itself does not serialize.
    pub fn rejected(error: &CatalogError) -> Self {
        match bincode::serialize(error) {
            Ok(bytes) => Self {
                status: Status::Rejected,
                payload: Some(bytes),
            },
            Err(e) => Self::failed(&format!("failed to encode error: {}", e)),
        }
    }

    /// Create a FAILED response with a diagnostic message
    pub fn failed(message: &str) -> Self {
        Self {
            status: Status::Failed,
            payload: Some(message.as_bytes().to_vec()),
        }
    }
}
