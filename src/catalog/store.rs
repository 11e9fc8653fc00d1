//! Catalog Store
//!
//! The shared in-memory catalog with atomic batch mutations.
//!
//! ## Concurrency Model
//!
//! One `RwLock` guards the whole catalog. Every mutating batch takes the
//! write lock for its entire validate-then-commit sequence, so batches
//! never interleave and readers never observe a half-applied batch.
//! Queries take the read lock and run concurrently between writes.
//!
//! ## Batch Semantics
//!
//! Every batch operation validates all items before mutating anything and
//! rejects the whole batch on the first failure, with one documented
//! exception: a purchase that fails on insufficient stock still records
//! the shortfall of each understocked isbn as sale misses.
//!
//! Map/set batches are validated in ascending isbn order so the error
//! surfaced for a given invalid batch is deterministic.

use std::collections::{BTreeMap, HashMap, HashSet};

use parking_lot::RwLock;

use crate::error::CatalogError;

use super::book::{Book, BookSpec, Isbn, StockBook, MAX_RATING, MIN_RATING};
use super::ranking;

/// The atomic bookstore catalog.
///
/// All methods take `&self`; the store is shared across connection
/// handlers behind an `Arc`.
pub struct CatalogStore {
    /// Every stock book keyed by isbn, ordered for deterministic snapshots
    books: RwLock<BTreeMap<Isbn, StockBook>>,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            books: RwLock::new(BTreeMap::new()),
        }
    }

    // =========================================================================
    // Stock Management Operations
    // =========================================================================

    /// Add a batch of new books.
    ///
    /// Fails without inserting anything if the batch is empty, any field is
    /// invalid, or any isbn already exists in the catalog or appears twice
    /// in the batch. New books start with zero ratings and zero sale misses.
    pub fn add_books(&self, specs: &[BookSpec]) -> Result<(), CatalogError> {
        if specs.is_empty() {
            return Err(CatalogError::EmptyInput("book specs".to_string()));
        }

        let mut books = self.books.write();

        // Validate every spec before touching the catalog
        let mut batch_isbns = HashSet::with_capacity(specs.len());
        for spec in specs {
            spec.validate()?;
            if books.contains_key(&spec.isbn) || !batch_isbns.insert(spec.isbn) {
                return Err(CatalogError::DuplicateIsbn(spec.isbn));
            }
        }

        // Commit
        for spec in specs {
            books.insert(spec.isbn, StockBook::from_spec(spec));
        }
        Ok(())
    }

    /// Add copies to existing books.
    ///
    /// All increments apply atomically, or none do. An increment that would
    /// overflow a book's copy counter rejects the whole batch.
    pub fn add_copies(&self, requests: &HashMap<Isbn, u32>) -> Result<(), CatalogError> {
        if requests.is_empty() {
            return Err(CatalogError::EmptyInput("copy requests".to_string()));
        }

        let mut books = self.books.write();
        Self::validate_quantities(&books, requests)?;

        for &isbn in sorted_keys(requests) {
            let quantity = requests[&isbn];
            if books[&isbn].num_copies.checked_add(quantity).is_none() {
                return Err(CatalogError::InvalidQuantity { isbn, quantity });
            }
        }

        for (&isbn, &quantity) in requests {
            if let Some(book) = books.get_mut(&isbn) {
                book.num_copies += quantity;
            }
        }
        Ok(())
    }

    /// Set or clear the editor-pick flag for existing books.
    ///
    /// An empty map is a no-op success.
    pub fn update_editor_picks(&self, picks: &HashMap<Isbn, bool>) -> Result<(), CatalogError> {
        let mut books = self.books.write();

        for &isbn in sorted_keys(picks) {
            Self::require_known(&books, isbn)?;
        }

        for (&isbn, &flag) in picks {
            if let Some(book) = books.get_mut(&isbn) {
                book.editor_pick = flag;
            }
        }
        Ok(())
    }

    /// Remove the named books, clearing their rating and demand state.
    ///
    /// Any invalid or unknown isbn rejects the whole batch. An empty set is
    /// a no-op success.
    pub fn remove_books(&self, isbns: &HashSet<Isbn>) -> Result<(), CatalogError> {
        let mut books = self.books.write();

        let mut sorted: Vec<Isbn> = isbns.iter().copied().collect();
        sorted.sort_unstable();
        for &isbn in &sorted {
            Self::require_known(&books, isbn)?;
        }

        for isbn in sorted {
            books.remove(&isbn);
        }
        Ok(())
    }

    /// Remove every book from the catalog
    pub fn remove_all_books(&self) -> Result<(), CatalogError> {
        self.books.write().clear();
        Ok(())
    }

    // =========================================================================
    // Customer Operations
    // =========================================================================

    /// Buy copies of books as one atomic batch.
    ///
    /// Hard validation first (empty batch, invalid isbn or quantity, unknown
    /// isbn) fails with no side effect. Then stock sufficiency is checked
    /// for every item: if all are in stock the decrements commit together;
    /// if any item is understocked the whole purchase fails with copy
    /// counts untouched, but each understocked isbn's sale-miss counter
    /// grows by exactly its shortfall. That recording is the one documented
    /// exception to all-or-nothing.
    pub fn buy_books(&self, requests: &HashMap<Isbn, u32>) -> Result<(), CatalogError> {
        if requests.is_empty() {
            return Err(CatalogError::EmptyInput("purchase requests".to_string()));
        }

        let mut books = self.books.write();
        Self::validate_quantities(&books, requests)?;

        // Sufficiency pass over every item, lowest isbn first
        let mut understocked: Vec<(Isbn, u32)> = Vec::new();
        for &isbn in sorted_keys(requests) {
            let requested = requests[&isbn];
            let available = books[&isbn].num_copies;
            if requested > available {
                understocked.push((isbn, requested - available));
            }
        }

        if let Some(&(first_isbn, _)) = understocked.first() {
            // Record the unmet demand, then fail the purchase as a whole
            for (isbn, shortfall) in &understocked {
                if let Some(book) = books.get_mut(isbn) {
                    book.record_sale_misses(*shortfall);
                }
            }
            return Err(CatalogError::InsufficientStock {
                isbn: first_isbn,
                requested: requests[&first_isbn],
                available: books[&first_isbn].num_copies,
            });
        }

        for (&isbn, &quantity) in requests {
            if let Some(book) = books.get_mut(&isbn) {
                book.num_copies -= quantity;
            }
        }
        Ok(())
    }

    /// Apply a batch of ratings.
    ///
    /// An empty map is a no-op success. Any invalid isbn, unknown isbn, or
    /// out-of-range rating rejects the whole batch; on success every
    /// entry's rating aggregates advance together.
    pub fn rate_books(&self, ratings: &HashMap<Isbn, i32>) -> Result<(), CatalogError> {
        let mut books = self.books.write();

        for &isbn in sorted_keys(ratings) {
            Self::require_known(&books, isbn)?;
            let rating = ratings[&isbn];
            if !(MIN_RATING..=MAX_RATING).contains(&rating) {
                return Err(CatalogError::InvalidRating { isbn, rating });
            }
        }

        for (&isbn, &rating) in ratings {
            if let Some(book) = books.get_mut(&isbn) {
                book.apply_rating(rating);
            }
        }
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Public snapshots of the named books.
    ///
    /// An isbn absent from the catalog fails the whole call; an empty set
    /// yields an empty result. Snapshots are ordered by ascending isbn.
    pub fn get_books(&self, isbns: &HashSet<Isbn>) -> Result<Vec<Book>, CatalogError> {
        let books = self.books.read();
        let selected = Self::select(&books, isbns)?;
        Ok(selected.iter().map(|b| b.to_book()).collect())
    }

    /// Administrative snapshots of the named books (same contract as
    /// [`CatalogStore::get_books`])
    pub fn get_books_by_isbn(&self, isbns: &HashSet<Isbn>) -> Result<Vec<StockBook>, CatalogError> {
        let books = self.books.read();
        let selected = Self::select(&books, isbns)?;
        Ok(selected.into_iter().cloned().collect())
    }

    /// Administrative snapshot of the whole catalog, ascending isbn
    pub fn list_books(&self) -> Result<Vec<StockBook>, CatalogError> {
        Ok(self.books.read().values().cloned().collect())
    }

    /// Up to `count` editor picks, ascending isbn.
    ///
    /// Fails if `count` is negative.
    pub fn get_editor_picks(&self, count: i64) -> Result<Vec<Book>, CatalogError> {
        let count = non_negative(count)?;
        let books = self.books.read();
        Ok(books
            .values()
            .filter(|b| b.editor_pick)
            .take(count)
            .map(|b| b.to_book())
            .collect())
    }

    /// The `count` books with the highest average rating, best first.
    ///
    /// Ties break by ascending isbn; never-rated books participate with
    /// average 0. Fails if `count` is negative; if `count` exceeds the
    /// catalog size the whole catalog comes back fully ordered.
    pub fn get_top_rated_books(&self, count: i64) -> Result<Vec<Book>, CatalogError> {
        let count = non_negative(count)?;
        let books = self.books.read();
        // Clamp so an oversized count never preallocates beyond the catalog
        let top = ranking::top_rated_isbns(books.values(), count.min(books.len()));
        Ok(top.into_iter().map(|isbn| books[&isbn].to_book()).collect())
    }

    /// Snapshot of exactly the books with a positive sale-miss counter,
    /// ascending isbn
    pub fn get_books_in_demand(&self) -> Result<Vec<StockBook>, CatalogError> {
        Ok(self
            .books
            .read()
            .values()
            .filter(|b| b.num_sale_misses > 0)
            .cloned()
            .collect())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Reject an invalid or unknown isbn
    fn require_known(books: &BTreeMap<Isbn, StockBook>, isbn: Isbn) -> Result<(), CatalogError> {
        if isbn == 0 {
            return Err(CatalogError::InvalidIsbn(isbn));
        }
        if !books.contains_key(&isbn) {
            return Err(CatalogError::UnknownIsbn(isbn));
        }
        Ok(())
    }

    /// Hard validation shared by buy and restock: every isbn known, every
    /// quantity positive. Checked in ascending isbn order.
    fn validate_quantities(
        books: &BTreeMap<Isbn, StockBook>,
        requests: &HashMap<Isbn, u32>,
    ) -> Result<(), CatalogError> {
        for &isbn in sorted_keys(requests) {
            Self::require_known(books, isbn)?;
            let quantity = requests[&isbn];
            if quantity == 0 {
                return Err(CatalogError::InvalidQuantity { isbn, quantity });
            }
        }
        Ok(())
    }

    /// Resolve a set of isbns to their stock books, ascending isbn,
    /// failing the whole lookup on the first invalid or unknown isbn
    fn select<'a>(
        books: &'a BTreeMap<Isbn, StockBook>,
        isbns: &HashSet<Isbn>,
    ) -> Result<Vec<&'a StockBook>, CatalogError> {
        let mut sorted: Vec<Isbn> = isbns.iter().copied().collect();
        sorted.sort_unstable();

        let mut selected = Vec::with_capacity(sorted.len());
        for isbn in sorted {
            Self::require_known(books, isbn)?;
            selected.push(&books[&isbn]);
        }
        Ok(selected)
    }
}

/// Map keys in ascending order, for deterministic validation
fn sorted_keys<V>(map: &HashMap<Isbn, V>) -> impl Iterator<Item = &Isbn> {
    let mut keys: Vec<&Isbn> = map.keys().collect();
    keys.sort_unstable();
    keys.into_iter()
}

/// Convert a client-supplied count, rejecting negatives
fn non_negative(count: i64) -> Result<usize, CatalogError> {
    if count < 0 {
        return Err(CatalogError::NegativeBookCount(count));
    }
    Ok(count as usize)
}
