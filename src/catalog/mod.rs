//! Catalog Module
//!
//! The in-memory bookstore catalog.
//!
//! ## Architecture
//! - `book`: entity definitions (`Book`, `StockBook`, `BookSpec`)
//! - `store`: the atomic store with validate-then-commit batch semantics
//! - `ranking`: bounded top-k selection by average rating

mod book;
mod ranking;
mod store;

pub use book::{Book, BookSpec, Isbn, StockBook};
pub use store::CatalogStore;
