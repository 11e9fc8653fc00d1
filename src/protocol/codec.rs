//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Tag (1)  │ Len (4)  │   Payload (bincode)         │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Tag
//! - AddBooks:          bincode `Vec<BookSpec>`
//! - AddCopies/BuyBooks: bincode `HashMap<Isbn, u32>`
//! - GetBooks/GetBooksByIsbn/RemoveBooks: bincode `HashSet<Isbn>`
//! - UpdateEditorPicks: bincode `HashMap<Isbn, bool>`
//! - RateBooks:         bincode `HashMap<Isbn, i32>`
//! - GetEditorPicks/GetTopRatedBooks: bincode `i64`
//! - ListBooks/RemoveAllBooks/GetBooksInDemand/Ping: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │   Payload                   │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```

use std::io::{Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FolioError, Result};

use super::{MessageTag, Request, Response, Status};

/// Header size: 1 byte tag/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request to bytes
///
/// Format: tag (1) + payload_len (4) + payload
pub fn encode_request(request: &Request) -> Result<Bytes> {
    let payload = match request {
        Request::AddBooks(specs) => bincode::serialize(specs)?,
        Request::AddCopies(requests) => bincode::serialize(requests)?,
        Request::GetBooks(isbns) => bincode::serialize(isbns)?,
        Request::BuyBooks(requests) => bincode::serialize(requests)?,
        Request::UpdateEditorPicks(picks) => bincode::serialize(picks)?,
        Request::GetEditorPicks(count) => bincode::serialize(count)?,
        Request::RemoveBooks(isbns) => bincode::serialize(isbns)?,
        Request::GetBooksByIsbn(isbns) => bincode::serialize(isbns)?,
        Request::RateBooks(ratings) => bincode::serialize(ratings)?,
        Request::GetTopRatedBooks(count) => bincode::serialize(count)?,
        // Bodyless operations
        Request::ListBooks
        | Request::RemoveAllBooks
        | Request::GetBooksInDemand
        | Request::Ping => Vec::new(),
    };

    Ok(frame(request.tag() as u8, &payload))
}

/// Decode a request from bytes
pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    let (tag_byte, payload) = split_frame(bytes, "request")?;

    let tag = MessageTag::from_u8(tag_byte)
        .ok_or_else(|| FolioError::Protocol(format!("Unknown message tag: 0x{:02x}", tag_byte)))?;

    if tag.is_bodyless() && !payload.is_empty() {
        return Err(FolioError::Protocol(format!(
            "{:?} request: unexpected payload of {} bytes",
            tag,
            payload.len()
        )));
    }

    let request = match tag {
        MessageTag::AddBooks => Request::AddBooks(bincode::deserialize(payload)?),
        MessageTag::ListBooks => Request::ListBooks,
        MessageTag::AddCopies => Request::AddCopies(bincode::deserialize(payload)?),
        MessageTag::GetBooks => Request::GetBooks(bincode::deserialize(payload)?),
        MessageTag::BuyBooks => Request::BuyBooks(bincode::deserialize(payload)?),
        MessageTag::UpdateEditorPicks => Request::UpdateEditorPicks(bincode::deserialize(payload)?),
        MessageTag::GetEditorPicks => Request::GetEditorPicks(bincode::deserialize(payload)?),
        MessageTag::RemoveAllBooks => Request::RemoveAllBooks,
        MessageTag::RemoveBooks => Request::RemoveBooks(bincode::deserialize(payload)?),
        MessageTag::GetBooksByIsbn => Request::GetBooksByIsbn(bincode::deserialize(payload)?),
        MessageTag::RateBooks => Request::RateBooks(bincode::deserialize(payload)?),
        MessageTag::GetTopRatedBooks => Request::GetTopRatedBooks(bincode::deserialize(payload)?),
        MessageTag::GetBooksInDemand => Request::GetBooksInDemand,
        MessageTag::Ping => Request::Ping,
    };

    Ok(request)
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Bytes {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    frame(response.status as u8, payload)
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = split_frame(bytes, "response")?;

    let status = Status::from_u8(status_byte).ok_or_else(|| {
        FolioError::Protocol(format!("Unknown response status: 0x{:02x}", status_byte))
    })?;

    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete request from a stream
///
/// Blocks until a complete request is received or an error occurs
pub fn read_request<R: Read>(reader: &mut R) -> Result<Request> {
    let frame = read_frame(reader, "request")?;
    decode_request(&frame)
}

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    let bytes = encode_request(request)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let frame = read_frame(reader, "response")?;
    decode_response(&frame)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Private Helpers
// =============================================================================

/// Assemble a frame: lead byte + length + payload
fn frame(lead: u8, payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    buf.put_u8(lead);
    buf.put_u32(payload.len() as u32);
    buf.put_slice(payload);
    buf.freeze()
}

/// Split a frame into its lead byte and payload, validating the header
fn split_frame<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(FolioError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let lead = bytes[0];
    let payload_len = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);

    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(FolioError::Protocol(format!(
            "{} payload too large: {} bytes (max {})",
            what, payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let total_len = HEADER_SIZE + payload_len as usize;
    if bytes.len() < total_len {
        return Err(FolioError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((lead, &bytes[HEADER_SIZE..total_len]))
}

/// Read one complete frame (header + payload) from a stream
fn read_frame<R: Read>(reader: &mut R, what: &str) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]);
    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(FolioError::Protocol(format!(
            "{} payload too large: {} bytes (max {})",
            what, payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let mut frame = vec![0u8; HEADER_SIZE + payload_len as usize];
    frame[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut frame[HEADER_SIZE..])?;
    }

    Ok(frame)
}
