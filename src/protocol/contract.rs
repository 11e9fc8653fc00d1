//! Versioned wire contract
//!
//! Client and server must agree in advance on the exact set of concrete
//! types the serializer can produce and consume. That agreement is made
//! explicit here: an ordered manifest of every wire-representable type,
//! fingerprinted with CRC32 together with the protocol version.
//!
//! Every connection opens with a hello preamble carrying the magic bytes,
//! the protocol version, and the fingerprint:
//!
//! ```text
//! ┌───────────────┬──────────────┬─────────────────────┐
//! │ Magic "FDB1"  │ Version (1)  │ Fingerprint u32 BE  │
//! └───────────────┴──────────────┴─────────────────────┘
//! ```
//!
//! The server validates all three before serving a single request, so a
//! contract mismatch (stale peer, reordered manifest, new wire type on one
//! side only) fails at connection startup with a typed protocol error
//! instead of an opaque decode failure mid-stream.
//!
//! Adding a wire type means appending it to [`WIRE_TYPES`] on both ends
//! and bumping [`PROTOCOL_VERSION`]; manifest order is part of the
//! contract, never an implementation detail.

use crate::error::{FolioError, Result};

/// Magic bytes identifying a FolioDB connection
pub const MAGIC: &[u8; 4] = b"FDB1";

/// Current protocol version
pub const PROTOCOL_VERSION: u8 = 1;

/// Hello preamble size: Magic (4) + Version (1) + Fingerprint (4)
pub const HELLO_SIZE: usize = 9;

/// Ordered manifest of every type the protocol can carry.
///
/// Order matters: the fingerprint hashes the entries in sequence.
pub const WIRE_TYPES: &[&str] = &[
    "catalog::Book",
    "catalog::StockBook",
    "catalog::BookSpec",
    "error::CatalogError",
    "batch::HashMap<Isbn, u32>",
    "batch::HashMap<Isbn, i32>",
    "batch::HashMap<Isbn, bool>",
    "batch::HashSet<Isbn>",
    "scalar::i64",
];

/// CRC32 fingerprint of the wire contract (version + manifest)
pub fn fingerprint() -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&[PROTOCOL_VERSION]);
    for name in WIRE_TYPES {
        hasher.update(name.as_bytes());
        hasher.update(b"\n");
    }
    hasher.finalize()
}

/// Build the hello preamble this end sends when opening a connection
pub fn encode_hello() -> [u8; HELLO_SIZE] {
    let mut hello = [0u8; HELLO_SIZE];
    hello[..4].copy_from_slice(MAGIC);
    hello[4] = PROTOCOL_VERSION;
    hello[5..].copy_from_slice(&fingerprint().to_be_bytes());
    hello
}

/// Validate a peer's hello preamble against this end's contract
pub fn validate_hello(hello: &[u8; HELLO_SIZE]) -> Result<()> {
    if &hello[..4] != MAGIC {
        return Err(FolioError::Protocol(format!(
            "Bad protocol magic: {:02x?}",
            &hello[..4]
        )));
    }

    let version = hello[4];
    if version != PROTOCOL_VERSION {
        return Err(FolioError::Protocol(format!(
            "Protocol version mismatch: peer {} vs local {}",
            version, PROTOCOL_VERSION
        )));
    }

    let peer_fingerprint = u32::from_be_bytes([hello[5], hello[6], hello[7], hello[8]]);
    let local_fingerprint = fingerprint();
    if peer_fingerprint != local_fingerprint {
        return Err(FolioError::Protocol(format!(
            "Wire contract mismatch: peer fingerprint {:08x} vs local {:08x}",
            peer_fingerprint, local_fingerprint
        )));
    }

    Ok(())
}
