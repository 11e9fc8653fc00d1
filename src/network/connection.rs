//! Connection Handler
//!
//! Handles individual client connections: hello handshake first, then the
//! read-dispatch-respond loop until the client disconnects.

use std::io::{BufReader, BufWriter, Read};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::CatalogStore;
use crate::error::{FolioError, Result};
use crate::protocol::contract::{validate_hello, HELLO_SIZE};
use crate::protocol::{read_request, write_response, Response};

use super::dispatch;

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Reference to the shared catalog
    store: Arc<CatalogStore>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O; timeouts are configured separately
    pub fn new(stream: TcpStream, store: Arc<CatalogStore>) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            store,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 disables a timeout)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let read_stream = self.reader.get_ref();
        let write_stream = self.writer.get_ref();

        if read_ms > 0 {
            read_stream.set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            write_stream.set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Validates the hello preamble, then reads requests in a loop and
    /// sends responses. Returns when the client disconnects or an error
    /// occurs.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        if let Err(e) = self.handshake() {
            tracing::warn!("Handshake failed for {}: {}", self.peer_addr, e);
            let _ = self.send_response(Response::failed(&e.to_string()));
            return Err(e);
        }

        loop {
            // Read next request
            let request = match read_request(&mut self.reader) {
                Ok(req) => req,
                Err(FolioError::Io(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    // Client disconnected gracefully
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(FolioError::Io(ref e)) if e.kind() == std::io::ErrorKind::ConnectionReset => {
                    tracing::debug!("Connection reset by client {}", self.peer_addr);
                    return Ok(());
                }
                Err(FolioError::Io(ref e)) if e.kind() == std::io::ErrorKind::ConnectionAborted => {
                    tracing::debug!("Connection aborted by client {}", self.peer_addr);
                    return Ok(());
                }
                Err(FolioError::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    // Read timeout - close the idle connection
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(FolioError::Io(ref e)) if e.kind() == std::io::ErrorKind::TimedOut => {
                    // Read timeout (Windows uses TimedOut instead of WouldBlock)
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    // Send error response if possible
                    let _ = self.send_response(Response::failed(&e.to_string()));
                    return Err(e);
                }
            };

            tracing::trace!("Received request from {}: {:?}", self.peer_addr, request);

            // Execute against the shared catalog
            let response = dispatch::execute(&self.store, request);

            // Send response
            if let Err(e) = self.send_response(response) {
                // If the client disconnected before we could send the response
                // (e.g. connection abort/reset/broken pipe), log and exit gracefully
                // rather than treating it as a server error.
                if let FolioError::Io(ref io_err) = e {
                    match io_err.kind() {
                        std::io::ErrorKind::ConnectionAborted
                        | std::io::ErrorKind::ConnectionReset
                        | std::io::ErrorKind::BrokenPipe => {
                            tracing::debug!(
                                "Client {} disconnected before response could be sent: {}",
                                self.peer_addr,
                                e
                            );
                            return Ok(());
                        }
                        _ => {}
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Read and validate the client's hello preamble, answering with an
    /// empty success envelope
    fn handshake(&mut self) -> Result<()> {
        let mut hello = [0u8; HELLO_SIZE];
        self.reader.read_exact(&mut hello)?;
        validate_hello(&hello)?;
        self.send_response(Response::ok(None))
    }

    /// Send a response to the client
    fn send_response(&mut self, response: Response) -> Result<()> {
        write_response(&mut self.writer, &response)?;
        Ok(())
    }
}
