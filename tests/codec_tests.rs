//! Codec Tests
//!
//! Tests for request and response encoding/decoding, the wire framing
//! rules, and the connection-handshake contract.

use std::collections::{HashMap, HashSet};
use std::io::Cursor;

use foliodb::protocol::contract::{encode_hello, validate_hello, HELLO_SIZE, MAGIC};
use foliodb::protocol::{
    decode_request, decode_response, encode_request, encode_response, read_request, read_response,
    write_request, write_response, MessageTag, Request, Response, Status, HEADER_SIZE,
};
use foliodb::{BookSpec, CatalogError, FolioError};

// =============================================================================
// Helper Functions
// =============================================================================

fn spec(isbn: u64) -> BookSpec {
    BookSpec {
        isbn,
        title: format!("Book {}", isbn),
        author: "Author".to_string(),
        price: 19.99,
        num_copies: 3,
        editor_pick: true,
    }
}

fn roundtrip(request: &Request) -> Request {
    let encoded = encode_request(request).unwrap();
    decode_request(&encoded).unwrap()
}

// =============================================================================
// Request Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_add_books() {
    let specs = vec![spec(1), spec(2)];
    match roundtrip(&Request::AddBooks(specs.clone())) {
        Request::AddBooks(decoded) => assert_eq!(decoded, specs),
        other => panic!("Expected AddBooks, got {:?}", other),
    }
}

#[test]
fn test_encode_decode_buy_books() {
    let batch: HashMap<u64, u32> = [(1, 2), (7, 1)].into_iter().collect();
    match roundtrip(&Request::BuyBooks(batch.clone())) {
        Request::BuyBooks(decoded) => assert_eq!(decoded, batch),
        other => panic!("Expected BuyBooks, got {:?}", other),
    }
}

#[test]
fn test_encode_decode_rate_books() {
    let batch: HashMap<u64, i32> = [(1, 5), (2, 0)].into_iter().collect();
    match roundtrip(&Request::RateBooks(batch.clone())) {
        Request::RateBooks(decoded) => assert_eq!(decoded, batch),
        other => panic!("Expected RateBooks, got {:?}", other),
    }
}

#[test]
fn test_encode_decode_get_books() {
    let isbns: HashSet<u64> = [3, 1, 4].into_iter().collect();
    match roundtrip(&Request::GetBooks(isbns.clone())) {
        Request::GetBooks(decoded) => assert_eq!(decoded, isbns),
        other => panic!("Expected GetBooks, got {:?}", other),
    }
}

#[test]
fn test_encode_decode_counted_queries() {
    match roundtrip(&Request::GetTopRatedBooks(7)) {
        Request::GetTopRatedBooks(count) => assert_eq!(count, 7),
        other => panic!("Expected GetTopRatedBooks, got {:?}", other),
    }
    // Negative counts must survive the wire so the server can reject them
    match roundtrip(&Request::GetEditorPicks(-2)) {
        Request::GetEditorPicks(count) => assert_eq!(count, -2),
        other => panic!("Expected GetEditorPicks, got {:?}", other),
    }
}

#[test]
fn test_bodyless_requests_have_empty_payload() {
    for request in [
        Request::ListBooks,
        Request::RemoveAllBooks,
        Request::GetBooksInDemand,
        Request::Ping,
    ] {
        let encoded = encode_request(&request).unwrap();
        assert_eq!(encoded.len(), HEADER_SIZE, "{:?} must be bodyless", request);
        assert_eq!(&encoded[1..5], &[0, 0, 0, 0]);
        assert_eq!(roundtrip(&request).tag(), request.tag());
    }
}

#[test]
fn test_tag_bytes_are_pinned() {
    // Tag values are the wire contract; a renumbering is a protocol break
    assert_eq!(MessageTag::AddBooks as u8, 0x01);
    assert_eq!(MessageTag::ListBooks as u8, 0x02);
    assert_eq!(MessageTag::AddCopies as u8, 0x03);
    assert_eq!(MessageTag::GetBooks as u8, 0x04);
    assert_eq!(MessageTag::BuyBooks as u8, 0x05);
    assert_eq!(MessageTag::UpdateEditorPicks as u8, 0x06);
    assert_eq!(MessageTag::GetEditorPicks as u8, 0x07);
    assert_eq!(MessageTag::RemoveAllBooks as u8, 0x08);
    assert_eq!(MessageTag::RemoveBooks as u8, 0x09);
    assert_eq!(MessageTag::GetBooksByIsbn as u8, 0x0A);
    assert_eq!(MessageTag::RateBooks as u8, 0x0B);
    assert_eq!(MessageTag::GetTopRatedBooks as u8, 0x0C);
    assert_eq!(MessageTag::GetBooksInDemand as u8, 0x0D);
    assert_eq!(MessageTag::Ping as u8, 0x0E);
}

// =============================================================================
// Malformed Request Tests
// =============================================================================

#[test]
fn test_unknown_tag_is_a_protocol_error() {
    let frame = [0xEEu8, 0, 0, 0, 0];
    assert!(matches!(
        decode_request(&frame),
        Err(FolioError::Protocol(_))
    ));
}

#[test]
fn test_truncated_header_rejected() {
    assert!(matches!(
        decode_request(&[0x01, 0, 0]),
        Err(FolioError::Protocol(_))
    ));
}

#[test]
fn test_truncated_payload_rejected() {
    // Header promises 10 payload bytes, only 2 follow
    let frame = [0x01u8, 0, 0, 0, 10, 0xAA, 0xBB];
    assert!(matches!(
        decode_request(&frame),
        Err(FolioError::Protocol(_))
    ));
}

#[test]
fn test_oversized_payload_rejected() {
    // Length field far beyond MAX_PAYLOAD_SIZE
    let frame = [0x01u8, 0xFF, 0xFF, 0xFF, 0xFF];
    assert!(matches!(
        decode_request(&frame),
        Err(FolioError::Protocol(_))
    ));
}

#[test]
fn test_payload_on_bodyless_tag_rejected() {
    // Ping with a 1-byte payload
    let frame = [MessageTag::Ping as u8, 0, 0, 0, 1, 0x42];
    assert!(matches!(
        decode_request(&frame),
        Err(FolioError::Protocol(_))
    ));
}

// =============================================================================
// Response Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_ok_response() {
    let response = Response::ok(Some(b"PONG".to_vec()));
    let decoded = decode_response(&encode_response(&response)).unwrap();
    assert_eq!(decoded.status, Status::Ok);
    assert_eq!(decoded.payload, Some(b"PONG".to_vec()));
}

#[test]
fn test_encode_decode_unit_ok_response() {
    let decoded = decode_response(&encode_response(&Response::ok(None))).unwrap();
    assert_eq!(decoded.status, Status::Ok);
    assert_eq!(decoded.payload, None);
}

#[test]
fn test_rejected_response_preserves_error_kind() {
    let error = CatalogError::InsufficientStock {
        isbn: 42,
        requested: 9,
        available: 3,
    };
    let decoded = decode_response(&encode_response(&Response::rejected(&error))).unwrap();
    assert_eq!(decoded.status, Status::Rejected);

    let embedded: CatalogError = bincode::deserialize(&decoded.payload.unwrap()).unwrap();
    assert_eq!(embedded, error);
}

#[test]
fn test_failed_response_carries_diagnostic() {
    let decoded = decode_response(&encode_response(&Response::failed("boom"))).unwrap();
    assert_eq!(decoded.status, Status::Failed);
    assert_eq!(decoded.payload, Some(b"boom".to_vec()));
}

#[test]
fn test_unknown_status_rejected() {
    let frame = [0x07u8, 0, 0, 0, 0];
    assert!(matches!(
        decode_response(&frame),
        Err(FolioError::Protocol(_))
    ));
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_request_stream_roundtrip() {
    let batch: HashMap<u64, u32> = [(5, 2)].into_iter().collect();
    let request = Request::AddCopies(batch.clone());

    let mut buf = Vec::new();
    write_request(&mut buf, &request).unwrap();

    let mut cursor = Cursor::new(buf);
    match read_request(&mut cursor).unwrap() {
        Request::AddCopies(decoded) => assert_eq!(decoded, batch),
        other => panic!("Expected AddCopies, got {:?}", other),
    }
}

#[test]
fn test_response_stream_roundtrip() {
    let mut buf = Vec::new();
    write_response(&mut buf, &Response::ok(Some(vec![1, 2, 3]))).unwrap();

    let mut cursor = Cursor::new(buf);
    let decoded = read_response(&mut cursor).unwrap();
    assert_eq!(decoded.status, Status::Ok);
    assert_eq!(decoded.payload, Some(vec![1, 2, 3]));
}

#[test]
fn test_back_to_back_requests_on_one_stream() {
    let mut buf = Vec::new();
    write_request(&mut buf, &Request::Ping).unwrap();
    write_request(&mut buf, &Request::ListBooks).unwrap();

    let mut cursor = Cursor::new(buf);
    assert!(matches!(read_request(&mut cursor).unwrap(), Request::Ping));
    assert!(matches!(
        read_request(&mut cursor).unwrap(),
        Request::ListBooks
    ));
}

#[test]
fn test_read_from_empty_stream_is_io_error() {
    let mut cursor = Cursor::new(Vec::<u8>::new());
    assert!(matches!(
        read_request(&mut cursor),
        Err(FolioError::Io(_))
    ));
}

// =============================================================================
// Handshake Tests
// =============================================================================

#[test]
fn test_hello_roundtrip() {
    let hello = encode_hello();
    assert_eq!(hello.len(), HELLO_SIZE);
    assert_eq!(&hello[..4], MAGIC);
    assert!(validate_hello(&hello).is_ok());
}

#[test]
fn test_hello_rejects_foreign_magic() {
    let mut hello = encode_hello();
    hello[..4].copy_from_slice(b"HTTP");
    assert!(matches!(
        validate_hello(&hello),
        Err(FolioError::Protocol(_))
    ));
}

#[test]
fn test_hello_rejects_contract_mismatch() {
    // A peer with a different wire-type manifest has a different fingerprint
    let mut hello = encode_hello();
    hello[5] ^= 0x01;
    assert!(matches!(
        validate_hello(&hello),
        Err(FolioError::Protocol(_))
    ));
}
