//! Operation traits
//!
//! The seam between callers and the catalog: `BookStore` covers customer
//! operations, `StockManager` the administrative ones. `CatalogStore`
//! implements both locally; `CatalogClient` implements both over the wire,
//! so callers and tests can swap one for the other.

use std::collections::{HashMap, HashSet};

use crate::catalog::{Book, BookSpec, CatalogStore, Isbn, StockBook};
use crate::error::Result;

/// Customer-facing operations
pub trait BookStore {
    /// Buy copies of books as one atomic batch
    fn buy_books(&self, requests: &HashMap<Isbn, u32>) -> Result<()>;

    /// Public snapshots of the named books; any unknown isbn fails the call
    fn get_books(&self, isbns: &HashSet<Isbn>) -> Result<Vec<Book>>;

    /// Up to `count` editor picks
    fn get_editor_picks(&self, count: i64) -> Result<Vec<Book>>;

    /// Apply a batch of ratings atomically
    fn rate_books(&self, ratings: &HashMap<Isbn, i32>) -> Result<()>;

    /// The `count` books with the highest average rating, best first
    fn get_top_rated_books(&self, count: i64) -> Result<Vec<Book>>;
}

/// Administrative operations
pub trait StockManager {
    /// Add a batch of new books atomically
    fn add_books(&self, specs: &[BookSpec]) -> Result<()>;

    /// Add copies to existing books atomically
    fn add_copies(&self, requests: &HashMap<Isbn, u32>) -> Result<()>;

    /// Administrative snapshot of the whole catalog
    fn list_books(&self) -> Result<Vec<StockBook>>;

    /// Administrative snapshots of the named books
    fn get_books_by_isbn(&self, isbns: &HashSet<Isbn>) -> Result<Vec<StockBook>>;

    /// Books whose sale-miss counter is positive
    fn get_books_in_demand(&self) -> Result<Vec<StockBook>>;

    /// Set or clear editor-pick flags atomically
    fn update_editor_picks(&self, picks: &HashMap<Isbn, bool>) -> Result<()>;

    /// Remove the named books, clearing their rating and demand state
    fn remove_books(&self, isbns: &HashSet<Isbn>) -> Result<()>;

    /// Clear the whole catalog
    fn remove_all_books(&self) -> Result<()>;
}

// =============================================================================
// Local Implementations
// =============================================================================

impl BookStore for CatalogStore {
    fn buy_books(&self, requests: &HashMap<Isbn, u32>) -> Result<()> {
        Ok(CatalogStore::buy_books(self, requests)?)
    }

    fn get_books(&self, isbns: &HashSet<Isbn>) -> Result<Vec<Book>> {
        Ok(CatalogStore::get_books(self, isbns)?)
    }

    fn get_editor_picks(&self, count: i64) -> Result<Vec<Book>> {
        Ok(CatalogStore::get_editor_picks(self, count)?)
    }

    fn rate_books(&self, ratings: &HashMap<Isbn, i32>) -> Result<()> {
        Ok(CatalogStore::rate_books(self, ratings)?)
    }

    fn get_top_rated_books(&self, count: i64) -> Result<Vec<Book>> {
        Ok(CatalogStore::get_top_rated_books(self, count)?)
    }
}

impl StockManager for CatalogStore {
    fn add_books(&self, specs: &[BookSpec]) -> Result<()> {
        Ok(CatalogStore::add_books(self, specs)?)
    }

    fn add_copies(&self, requests: &HashMap<Isbn, u32>) -> Result<()> {
        Ok(CatalogStore::add_copies(self, requests)?)
    }

    fn list_books(&self) -> Result<Vec<StockBook>> {
        Ok(CatalogStore::list_books(self)?)
    }

    fn get_books_by_isbn(&self, isbns: &HashSet<Isbn>) -> Result<Vec<StockBook>> {
        Ok(CatalogStore::get_books_by_isbn(self, isbns)?)
    }

    fn get_books_in_demand(&self) -> Result<Vec<StockBook>> {
        Ok(CatalogStore::get_books_in_demand(self)?)
    }

    fn update_editor_picks(&self, picks: &HashMap<Isbn, bool>) -> Result<()> {
        Ok(CatalogStore::update_editor_picks(self, picks)?)
    }

    fn remove_books(&self, isbns: &HashSet<Isbn>) -> Result<()> {
        Ok(CatalogStore::remove_books(self, isbns)?)
    }

    fn remove_all_books(&self) -> Result<()> {
        Ok(CatalogStore::remove_all_books(self)?)
    }
}
