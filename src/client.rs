//! Remote catalog client
//!
//! `CatalogClient` speaks the binary protocol to a FolioDB server and
//! implements the same `BookStore`/`StockManager` traits as the local
//! store, so callers cannot tell the two apart.
//!
//! ## Error Discipline
//!
//! The client inspects the response status before ever touching the
//! success path:
//! - `Rejected` envelopes decode the embedded `CatalogError` and re-raise
//!   it locally in its original kind
//! - `Failed` envelopes and malformed responses raise `Protocol`
//! - Connect, read, write, and timeout failures raise `Network`
//!
//! The client never retries implicitly. A call that fails on the
//! transport drops the connection; the *next* call re-establishes it.

use std::collections::{HashMap, HashSet};
use std::io::{BufReader, BufWriter, Write};
use std::net::TcpStream;
use std::time::Duration;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;

use crate::api::{BookStore, StockManager};
use crate::catalog::{Book, BookSpec, Isbn, StockBook};
use crate::error::{FolioError, Result};
use crate::protocol::contract::encode_hello;
use crate::protocol::{read_response, write_request, Request, Response, Status};

/// One established connection to the server
struct Wire {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

/// Client for a remote FolioDB server.
///
/// Holds one persistent connection, guarded by a mutex so calls from
/// multiple threads serialize cleanly over it.
pub struct CatalogClient {
    /// Server address (host:port)
    addr: String,

    /// Per-call timeout in milliseconds (0 disables)
    timeout_ms: u64,

    /// Established connection, or `None` after a transport failure
    wire: Mutex<Option<Wire>>,
}

impl CatalogClient {
    /// Default per-call timeout
    pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

    /// Connect to a server and perform the contract handshake
    pub fn connect(addr: impl Into<String>) -> Result<Self> {
        Self::connect_with_timeout(addr, Self::DEFAULT_TIMEOUT_MS)
    }

    /// Connect with an explicit per-call timeout (0 disables)
    pub fn connect_with_timeout(addr: impl Into<String>, timeout_ms: u64) -> Result<Self> {
        let client = Self {
            addr: addr.into(),
            timeout_ms,
            wire: Mutex::new(None),
        };

        // Fail fast on an unreachable server or contract mismatch
        let mut slot = client.wire.lock();
        *slot = Some(client.open_wire()?);
        drop(slot);

        Ok(client)
    }

    /// Ping the server, returning its reply payload
    pub fn ping(&self) -> Result<Vec<u8>> {
        match self.call(Request::Ping)? {
            Some(payload) => Ok(payload),
            None => Err(FolioError::Protocol(
                "Ping response carried no payload".to_string(),
            )),
        }
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Establish a fresh connection and run the hello handshake
    fn open_wire(&self) -> Result<Wire> {
        let stream = TcpStream::connect(&self.addr)
            .map_err(|e| FolioError::Network(format!("connect to {} failed: {}", self.addr, e)))?;
        stream.set_nodelay(true).map_err(setup_failed)?;

        if self.timeout_ms > 0 {
            let timeout = Some(Duration::from_millis(self.timeout_ms));
            stream.set_read_timeout(timeout).map_err(setup_failed)?;
            stream.set_write_timeout(timeout).map_err(setup_failed)?;
        }

        let read_stream = stream.try_clone().map_err(setup_failed)?;
        let mut wire = Wire {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        };

        // Hello preamble; the server answers with an empty success envelope
        wire.writer
            .write_all(&encode_hello())
            .and_then(|_| wire.writer.flush())
            .map_err(|e| FolioError::Network(format!("handshake send failed: {}", e)))?;

        let response = read_response(&mut wire.reader).map_err(map_transport)?;
        match response.status {
            Status::Ok => Ok(wire),
            Status::Failed => Err(FolioError::Protocol(format!(
                "server refused handshake: {}",
                diagnostic(&response)
            ))),
            Status::Rejected => Err(FolioError::Protocol(
                "unexpected Rejected envelope during handshake".to_string(),
            )),
        }
    }

    /// Perform one request/response exchange.
    ///
    /// On a transport failure the connection is dropped and the error
    /// surfaces as `Network`; the next call reconnects lazily.
    fn call(&self, request: Request) -> Result<Option<Vec<u8>>> {
        let mut slot = self.wire.lock();

        let mut wire = match slot.take() {
            Some(wire) => wire,
            None => self.open_wire()?,
        };

        let exchange = write_request(&mut wire.writer, &request)
            .and_then(|_| read_response(&mut wire.reader));

        let response = match exchange {
            Ok(response) => {
                // Exchange completed, keep the connection for the next call
                *slot = Some(wire);
                response
            }
            Err(e) => {
                // Connection state is unknown after a failed exchange; it
                // stays dropped and the next call reconnects
                return Err(map_transport(e));
            }
        };

        // Inspect the embedded error before the success path
        match response.status {
            Status::Ok => Ok(response.payload),
            Status::Rejected => {
                let payload = response.payload.ok_or_else(|| {
                    FolioError::Protocol("Rejected envelope carried no error".to_string())
                })?;
                let error = bincode::deserialize(&payload).map_err(|e| {
                    FolioError::Protocol(format!("undecodable embedded error: {}", e))
                })?;
                Err(FolioError::Catalog(error))
            }
            Status::Failed => Err(FolioError::Protocol(format!(
                "server failure: {}",
                diagnostic(&response)
            ))),
        }
    }

    /// Exchange expecting a unit result
    fn call_unit(&self, request: Request) -> Result<()> {
        self.call(request)?;
        Ok(())
    }

    /// Exchange expecting a bincode-decodable result value
    fn call_value<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        let payload = self.call(request)?.ok_or_else(|| {
            FolioError::Protocol("response carried no payload where one was expected".to_string())
        })?;
        bincode::deserialize(&payload)
            .map_err(|e| FolioError::Protocol(format!("undecodable response payload: {}", e)))
    }
}

impl BookStore for CatalogClient {
    fn buy_books(&self, requests: &HashMap<Isbn, u32>) -> Result<()> {
        self.call_unit(Request::BuyBooks(requests.clone()))
    }

    fn get_books(&self, isbns: &HashSet<Isbn>) -> Result<Vec<Book>> {
        self.call_value(Request::GetBooks(isbns.clone()))
    }

    fn get_editor_picks(&self, count: i64) -> Result<Vec<Book>> {
        self.call_value(Request::GetEditorPicks(count))
    }

    fn rate_books(&self, ratings: &HashMap<Isbn, i32>) -> Result<()> {
        self.call_unit(Request::RateBooks(ratings.clone()))
    }

    fn get_top_rated_books(&self, count: i64) -> Result<Vec<Book>> {
        self.call_value(Request::GetTopRatedBooks(count))
    }
}

impl StockManager for CatalogClient {
    fn add_books(&self, specs: &[BookSpec]) -> Result<()> {
        self.call_unit(Request::AddBooks(specs.to_vec()))
    }

    fn add_copies(&self, requests: &HashMap<Isbn, u32>) -> Result<()> {
        self.call_unit(Request::AddCopies(requests.clone()))
    }

    fn list_books(&self) -> Result<Vec<StockBook>> {
        self.call_value(Request::ListBooks)
    }

    fn get_books_by_isbn(&self, isbns: &HashSet<Isbn>) -> Result<Vec<StockBook>> {
        self.call_value(Request::GetBooksByIsbn(isbns.clone()))
    }

    fn get_books_in_demand(&self) -> Result<Vec<StockBook>> {
        self.call_value(Request::GetBooksInDemand)
    }

    fn update_editor_picks(&self, picks: &HashMap<Isbn, bool>) -> Result<()> {
        self.call_unit(Request::UpdateEditorPicks(picks.clone()))
    }

    fn remove_books(&self, isbns: &HashSet<Isbn>) -> Result<()> {
        self.call_unit(Request::RemoveBooks(isbns.clone()))
    }

    fn remove_all_books(&self) -> Result<()> {
        self.call_unit(Request::RemoveAllBooks)
    }
}

/// Map a socket setup failure to `Network`
fn setup_failed(err: std::io::Error) -> FolioError {
    FolioError::Network(format!("connection setup failed: {}", err))
}

/// Map transport-level failures to `Network`, leaving protocol and
/// application errors in their own kinds
fn map_transport(err: FolioError) -> FolioError {
    match err {
        FolioError::Io(e) => match e.kind() {
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => {
                FolioError::Network(format!("request timed out: {}", e))
            }
            _ => FolioError::Network(format!("connection failed: {}", e)),
        },
        other => other,
    }
}

/// Human-readable excerpt of a FAILED envelope's payload
fn diagnostic(response: &Response) -> String {
    match &response.payload {
        Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        None => "(no diagnostic)".to_string(),
    }
}
