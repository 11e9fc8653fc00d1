//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread (non-blocking accept + shutdown flag)
//! - Worker thread pool fed by a bounded crossbeam channel
//! - Requests routed through `dispatch` onto the shared `CatalogStore`

mod connection;
mod dispatch;
mod server;

pub use connection::Connection;
pub use dispatch::execute;
pub use server::{Server, ShutdownHandle};
