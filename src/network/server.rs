//! TCP Server
//!
//! Accepts connections and dispatches them to a worker thread pool.
//!
//! ## Shape
//! - The acceptor runs on the caller's thread (`run` blocks)
//! - Accepted streams go through a bounded crossbeam channel; a full queue
//!   drops the connection with a warning
//! - Workers pull streams, run the handshake and request loop, and go back
//!   for the next connection
//! - A shared atomic flag stops the accept loop; workers drain and exit
//!   when the channel closes

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{bounded, Sender, TrySendError};

use crate::catalog::CatalogStore;
use crate::config::Config;
use crate::error::{FolioError, Result};

use super::connection::Connection;

/// Poll interval for the non-blocking accept loop
const ACCEPT_POLL: Duration = Duration::from_millis(50);

/// TCP server for FolioDB
pub struct Server {
    config: Config,
    store: Arc<CatalogStore>,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
}

/// Handle for stopping a running server from another thread
#[derive(Clone)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    /// Signal the server to stop accepting and wind down
    pub fn shutdown(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

impl Server {
    /// Bind the listening socket.
    ///
    /// Binding is separate from `run` so callers (and tests, with port 0)
    /// can learn the actual address before serving.
    pub fn bind(config: Config, store: Arc<CatalogStore>) -> Result<Self> {
        if config.worker_threads == 0 {
            return Err(FolioError::Config(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        if config.max_connections == 0 {
            // bounded(0) is a rendezvous channel; every accepted connection
            // would be dropped as queue-full unless a worker is already parked
            return Err(FolioError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }

        let listener = TcpListener::bind(&config.listen_addr)?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            store,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// The address the server is actually listening on
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Get a handle that can stop this server from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle(Arc::clone(&self.shutdown))
    }

    /// Run the accept loop (blocking until shutdown)
    pub fn run(&mut self) -> Result<()> {
        let (tx, rx) = bounded::<TcpStream>(self.config.max_connections);

        // Worker pool: each worker serves one connection at a time
        let mut workers = Vec::with_capacity(self.config.worker_threads);
        for id in 0..self.config.worker_threads {
            let rx = rx.clone();
            let store = Arc::clone(&self.store);
            let config = self.config.clone();

            let handle = thread::Builder::new()
                .name(format!("foliodb-worker-{}", id))
                .spawn(move || {
                    while let Ok(stream) = rx.recv() {
                        if let Err(e) = serve_connection(stream, &store, &config) {
                            tracing::warn!("Worker {}: connection ended with error: {}", id, e);
                        }
                    }
                })?;
            workers.push(handle);
        }
        drop(rx);

        tracing::info!(
            "Listening on {} with {} workers",
            self.config.listen_addr,
            self.config.worker_threads
        );

        self.accept_loop(&tx);

        // Close the channel so idle workers exit, then wait for in-flight
        // connections to finish
        drop(tx);
        for handle in workers {
            let _ = handle.join();
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Non-blocking accept loop, polled against the shutdown flag
    fn accept_loop(&self, tx: &Sender<TcpStream>) {
        loop {
            if self.shutdown.load(Ordering::Relaxed) {
                tracing::debug!("Shutdown flag set, leaving accept loop");
                return;
            }

            match self.listener.accept() {
                Ok((stream, addr)) => {
                    tracing::trace!("Accepted connection from {}", addr);
                    match tx.try_send(stream) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            // Queue full: drop the connection, the client
                            // sees a network error
                            tracing::warn!("Connection queue full, dropping {}", addr);
                        }
                        Err(TrySendError::Disconnected(_)) => return,
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                }
            }
        }
    }
}

/// Serve one accepted connection to completion
fn serve_connection(stream: TcpStream, store: &Arc<CatalogStore>, config: &Config) -> Result<()> {
    let mut connection = Connection::new(stream, Arc::clone(store))?;
    connection.set_timeouts(config.read_timeout_ms, config.write_timeout_ms)?;
    connection.handle()
}
