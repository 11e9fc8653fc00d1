//! Error types for FolioDB
//!
//! Two layers: `CatalogError` is the serializable application error that
//! crosses the wire inside a response envelope; `FolioError` is the unified
//! crate error that adds transport-side failure kinds on top of it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Isbn;

/// Result type alias using FolioError
pub type Result<T> = std::result::Result<T, FolioError>;

/// Application-level catalog errors.
///
/// Every variant is serializable so the server can embed the error in a
/// `Rejected` response envelope and the client can re-raise it in its
/// original kind. Variant order is part of the wire contract (see
/// `protocol::contract`).
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum CatalogError {
    // -------------------------------------------------------------------------
    // ISBN Errors
    // -------------------------------------------------------------------------
    #[error("invalid ISBN: {0}")]
    InvalidIsbn(Isbn),

    #[error("no book with ISBN {0} in the catalog")]
    UnknownIsbn(Isbn),

    #[error("book with ISBN {0} already exists")]
    DuplicateIsbn(Isbn),

    // -------------------------------------------------------------------------
    // Field Validation Errors
    // -------------------------------------------------------------------------
    #[error("rating {rating} for ISBN {isbn} is outside [0, 5]")]
    InvalidRating { isbn: Isbn, rating: i32 },

    #[error("invalid quantity {quantity} for ISBN {isbn}")]
    InvalidQuantity { isbn: Isbn, quantity: u32 },

    #[error("invalid book {isbn}: {reason}")]
    InvalidBook { isbn: Isbn, reason: String },

    #[error("book count must be non-negative, got {0}")]
    NegativeBookCount(i64),

    // -------------------------------------------------------------------------
    // Batch Errors
    // -------------------------------------------------------------------------
    #[error("{0} must be non-empty")]
    EmptyInput(String),

    #[error("insufficient stock for ISBN {isbn}: requested {requested}, available {available}")]
    InsufficientStock {
        isbn: Isbn,
        requested: u32,
        available: u32,
    },
}

/// Unified error type for FolioDB operations
#[derive(Debug, Error)]
pub enum FolioError {
    // -------------------------------------------------------------------------
    // Application Errors
    // -------------------------------------------------------------------------
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<bincode::Error> for FolioError {
    fn from(err: bincode::Error) -> Self {
        FolioError::Serialization(err.to_string())
    }
}
