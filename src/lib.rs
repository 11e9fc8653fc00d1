//! # FolioDB
//!
//! A concurrent in-memory bookstore catalog with:
//! - Atomic validate-then-commit batch mutations
//! - Rating aggregates, top-k ranking, and sale-miss demand tracking
//! - A binary TCP protocol with a versioned wire contract
//! - Typed error propagation across the RPC boundary
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Request Dispatcher                           │
//! │             (one tag per operation)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  CatalogStore                                │
//! │          RwLock<BTreeMap<Isbn, StockBook>>                   │
//! │     (validate-then-commit, all-or-nothing batches)           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The same `BookStore`/`StockManager` traits are implemented by the local
//! `CatalogStore` and the remote `CatalogClient`, so callers can swap one
//! for the other.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod api;
pub mod catalog;
pub mod client;
pub mod network;
pub mod protocol;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use api::{BookStore, StockManager};
pub use catalog::{Book, BookSpec, CatalogStore, Isbn, StockBook};
pub use client::CatalogClient;
pub use config::Config;
pub use error::{CatalogError, FolioError, Result};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of FolioDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
