//! Client/Server Integration Tests
//!
//! These tests run a real server on an ephemeral port and verify:
//! - Error kinds survive the RPC boundary in their original form
//! - Transport and protocol failures are distinguished from rejections
//! - The same scenarios pass against the local store and the remote
//!   client through the shared traits

use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::thread::JoinHandle;

use foliodb::network::{Server, ShutdownHandle};
use foliodb::protocol::{read_response, Status};
use foliodb::{
    BookSpec, BookStore, CatalogClient, CatalogError, CatalogStore, Config, FolioError, Isbn,
    StockManager,
};

// =============================================================================
// Helper Functions
// =============================================================================

struct TestServer {
    addr: String,
    shutdown: ShutdownHandle,
    thread: JoinHandle<()>,
}

impl TestServer {
    /// Start a server on an ephemeral port with a fresh catalog
    fn start() -> Self {
        let config = Config::builder()
            .listen_addr("127.0.0.1:0")
            .worker_threads(6)
            // Tests drive connections at their own pace
            .read_timeout_ms(0)
            .write_timeout_ms(0)
            .build();

        let store = Arc::new(CatalogStore::new());
        let mut server = Server::bind(config, store).unwrap();
        let addr = server.local_addr().unwrap().to_string();
        let shutdown = server.shutdown_handle();

        let thread = std::thread::spawn(move || {
            server.run().unwrap();
        });

        Self {
            addr,
            shutdown,
            thread,
        }
    }

    fn client(&self) -> CatalogClient {
        CatalogClient::connect(&self.addr).unwrap()
    }

    /// Stop the server. Callers drop their clients first: workers finish
    /// serving their current connection before exiting.
    fn stop(self) {
        self.shutdown.shutdown();
        self.thread.join().unwrap();
    }
}

fn spec(isbn: Isbn, copies: u32) -> BookSpec {
    BookSpec {
        isbn,
        title: format!("Book {}", isbn),
        author: format!("Author {}", isbn),
        price: 15.0,
        num_copies: copies,
        editor_pick: false,
    }
}

fn map<V: Copy>(pairs: &[(Isbn, V)]) -> HashMap<Isbn, V> {
    pairs.iter().copied().collect()
}

fn set(isbns: &[Isbn]) -> HashSet<Isbn> {
    isbns.iter().copied().collect()
}

// =============================================================================
// Basic RPC Tests
// =============================================================================

#[test]
fn test_ping() {
    let server = TestServer::start();
    let client = server.client();

    assert_eq!(client.ping().unwrap(), b"PONG");

    drop(client);
    server.stop();
}

#[test]
fn test_full_operation_surface_over_the_wire() {
    let server = TestServer::start();
    let client = server.client();

    client.add_books(&[spec(1, 4), spec(2, 2)]).unwrap();
    client.add_copies(&map(&[(1, 1u32)])).unwrap();
    client.buy_books(&map(&[(1, 2u32)])).unwrap();
    client.rate_books(&map(&[(1, 5i32), (2, 3i32)])).unwrap();
    client.update_editor_picks(&map(&[(2, true)])).unwrap();

    let books = client.get_books(&set(&[1, 2])).unwrap();
    assert_eq!(books.len(), 2);

    let stock = client.get_books_by_isbn(&set(&[1])).unwrap();
    assert_eq!(stock[0].num_copies, 3);
    assert_eq!(stock[0].total_rating, 5);

    let all = client.list_books().unwrap();
    assert_eq!(all.len(), 2);

    let picks = client.get_editor_picks(5).unwrap();
    assert_eq!(picks.len(), 1);
    assert_eq!(picks[0].isbn, 2);

    let top = client.get_top_rated_books(1).unwrap();
    assert_eq!(top[0].isbn, 1);

    client.remove_books(&set(&[2])).unwrap();
    assert_eq!(client.list_books().unwrap().len(), 1);

    client.remove_all_books().unwrap();
    assert!(client.list_books().unwrap().is_empty());

    drop(client);
    server.stop();
}

// =============================================================================
// Error Propagation Tests
// =============================================================================

#[test]
fn test_error_kinds_survive_the_rpc_boundary() {
    let server = TestServer::start();
    let client = server.client();

    client.add_books(&[spec(1, 2)]).unwrap();

    // UnknownIsbn with its field intact
    match client.buy_books(&map(&[(9, 1u32)])) {
        Err(FolioError::Catalog(CatalogError::UnknownIsbn(9))) => {}
        other => panic!("Expected UnknownIsbn(9), got {:?}", other),
    }

    // InsufficientStock with all fields intact
    match client.buy_books(&map(&[(1, 5u32)])) {
        Err(FolioError::Catalog(CatalogError::InsufficientStock {
            isbn: 1,
            requested: 5,
            available: 2,
        })) => {}
        other => panic!("Expected InsufficientStock, got {:?}", other),
    }

    // InvalidRating
    match client.rate_books(&map(&[(1, 6i32)])) {
        Err(FolioError::Catalog(CatalogError::InvalidRating { isbn: 1, rating: 6 })) => {}
        other => panic!("Expected InvalidRating, got {:?}", other),
    }

    // NegativeBookCount
    match client.get_top_rated_books(-1) {
        Err(FolioError::Catalog(CatalogError::NegativeBookCount(-1))) => {}
        other => panic!("Expected NegativeBookCount, got {:?}", other),
    }

    drop(client);
    server.stop();
}

#[test]
fn test_demand_side_effect_visible_over_the_wire() {
    let server = TestServer::start();
    let client = server.client();

    client.add_books(&[spec(1, 2)]).unwrap();
    assert!(client.buy_books(&map(&[(1, 3u32)])).is_err());

    let in_demand = client.get_books_in_demand().unwrap();
    assert_eq!(in_demand.len(), 1);
    assert_eq!(in_demand[0].isbn, 1);
    assert_eq!(in_demand[0].num_sale_misses, 1);
    assert_eq!(in_demand[0].num_copies, 2);

    drop(client);
    server.stop();
}

#[test]
fn test_bind_rejects_degenerate_pool_configs() {
    // A zero-capacity connection queue would drop every accepted
    // connection as queue-full, so bind refuses it up front
    for config in [
        Config::builder()
            .listen_addr("127.0.0.1:0")
            .worker_threads(0)
            .build(),
        Config::builder()
            .listen_addr("127.0.0.1:0")
            .max_connections(0)
            .build(),
    ] {
        match Server::bind(config, Arc::new(CatalogStore::new())) {
            Err(FolioError::Config(_)) => {}
            other => panic!("Expected Config error, got {:?}", other.map(|_| ())),
        }
    }
}

#[test]
fn test_unreachable_server_is_a_network_error() {
    // Port 1 is never listening
    match CatalogClient::connect("127.0.0.1:1") {
        Err(FolioError::Network(_)) => {}
        other => panic!("Expected Network error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_malformed_envelope_is_a_protocol_error() {
    // A fake server that answers the handshake with an unknown status byte
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let fake = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut hello = [0u8; 9];
        stream.read_exact(&mut hello).unwrap();
        stream.write_all(&[0x07, 0, 0, 0, 0]).unwrap();
    });

    match CatalogClient::connect(&addr) {
        Err(FolioError::Protocol(_)) => {}
        other => panic!("Expected Protocol error, got {:?}", other.map(|_| ())),
    }

    fake.join().unwrap();
}

#[test]
fn test_bad_hello_is_refused_at_startup() {
    let server = TestServer::start();

    // Speak garbage instead of the hello preamble
    let mut stream = TcpStream::connect(&server.addr).unwrap();
    stream.write_all(b"GET / HTT").unwrap();

    let response = read_response(&mut stream).unwrap();
    assert_eq!(response.status, Status::Failed);

    // The server closes the connection after a failed handshake
    let mut rest = Vec::new();
    assert_eq!(stream.read_to_end(&mut rest).unwrap(), 0);

    drop(stream);
    server.stop();
}

// =============================================================================
// Substitutability Tests
// =============================================================================

/// The rating scenario, written against the traits only
fn rating_scenario<S: BookStore + StockManager>(catalog: &S) {
    catalog.add_books(&[spec(1, 1), spec(2, 1)]).unwrap();

    catalog.rate_books(&map(&[(1, 3i32)])).unwrap();
    catalog.rate_books(&map(&[(1, 5i32)])).unwrap();
    catalog.rate_books(&map(&[(1, 4i32)])).unwrap();

    // One bad entry leaves everything unchanged
    assert!(catalog.rate_books(&map(&[(1, 4i32), (9, 4i32)])).is_err());

    let stock = catalog.get_books_by_isbn(&set(&[1])).unwrap();
    assert_eq!(stock[0].total_rating, 12);
    assert_eq!(stock[0].num_times_rated, 3);
    assert_eq!(stock[0].average_rating(), 4.0);

    let top = catalog.get_top_rated_books(2).unwrap();
    assert_eq!(top[0].isbn, 1);
    assert_eq!(top[1].isbn, 2);
}

#[test]
fn test_scenario_against_local_store() {
    let store = CatalogStore::new();
    rating_scenario(&store);
}

#[test]
fn test_scenario_against_remote_client() {
    let server = TestServer::start();
    let client = server.client();

    rating_scenario(&client);

    drop(client);
    server.stop();
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_clients_conserve_stock() {
    const CLIENTS: u32 = 4;
    const BUYS_PER_CLIENT: u32 = 25;

    let server = TestServer::start();
    let admin = server.client();
    admin.add_books(&[spec(1, 60)]).unwrap();

    let handles: Vec<_> = (0..CLIENTS)
        .map(|_| {
            let addr = server.addr.clone();
            std::thread::spawn(move || {
                let client = CatalogClient::connect(&addr).unwrap();
                let mut bought = 0u32;
                for _ in 0..BUYS_PER_CLIENT {
                    if client.buy_books(&map(&[(1, 1u32)])).is_ok() {
                        bought += 1;
                    }
                }
                bought
            })
        })
        .collect();

    let total_bought: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();

    let stock = admin.get_books_by_isbn(&set(&[1])).unwrap();
    assert_eq!(stock[0].num_copies, 60 - total_bought);
    assert_eq!(stock[0].num_sale_misses, CLIENTS * BUYS_PER_CLIENT - total_bought);

    drop(admin);
    server.stop();
}
