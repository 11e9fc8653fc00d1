//! Book entity definitions
//!
//! Defines the catalog's data model: the public `Book` view, the
//! administrative `StockBook` aggregate, and the `BookSpec` item used to
//! add books to the catalog.

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Unique book identifier.
///
/// Zero is the only invalid value; every book in the catalog has a
/// positive ISBN.
pub type Isbn = u64;

/// Ratings are integers in `[MIN_RATING, MAX_RATING]`.
pub const MIN_RATING: i32 = 0;
pub const MAX_RATING: i32 = 5;

/// Public view of a book, as handed to customers.
///
/// An immutable snapshot - never a reference into the live catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identity, immutable for the book's lifetime
    pub isbn: Isbn,

    /// Title of the book
    pub title: String,

    /// Author of the book
    pub author: String,

    /// Price per copy, strictly positive
    pub price: f32,
}

/// Specification for a book to be added to the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSpec {
    /// Unique identity for the new book
    pub isbn: Isbn,

    /// Title of the book
    pub title: String,

    /// Author of the book
    pub author: String,

    /// Price per copy, strictly positive
    pub price: f32,

    /// Initial number of copies, at least 1
    pub num_copies: u32,

    /// Whether the book starts out flagged as an editor pick
    pub editor_pick: bool,
}

impl BookSpec {
    /// Validate the spec's fields in isolation.
    ///
    /// Duplicate checks against the catalog and within a batch are the
    /// store's responsibility; this covers everything knowable from the
    /// spec alone.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.isbn == 0 {
            return Err(CatalogError::InvalidIsbn(self.isbn));
        }
        if self.title.trim().is_empty() {
            return Err(CatalogError::InvalidBook {
                isbn: self.isbn,
                reason: "title must not be blank".to_string(),
            });
        }
        if self.author.trim().is_empty() {
            return Err(CatalogError::InvalidBook {
                isbn: self.isbn,
                reason: "author must not be blank".to_string(),
            });
        }
        if !(self.price > 0.0) {
            // Also catches NaN, which fails every comparison
            return Err(CatalogError::InvalidBook {
                isbn: self.isbn,
                reason: format!("price must be positive, got {}", self.price),
            });
        }
        if self.num_copies == 0 {
            return Err(CatalogError::InvalidQuantity {
                isbn: self.isbn,
                quantity: self.num_copies,
            });
        }
        Ok(())
    }
}

/// Administrative record for a book in stock.
///
/// Owned exclusively by the catalog store; the public view is produced
/// by [`StockBook::to_book`]. Rating aggregates and the sale-miss counter
/// always start at zero for a freshly added book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockBook {
    /// Unique identity, immutable for the book's lifetime
    pub isbn: Isbn,

    /// Title of the book
    pub title: String,

    /// Author of the book
    pub author: String,

    /// Price per copy, strictly positive
    pub price: f32,

    /// Copies currently in stock
    pub num_copies: u32,

    /// Units of unmet demand; grows only on failed purchases,
    /// cleared only by removing the book
    pub num_sale_misses: u32,

    /// Sum of all ratings received
    pub total_rating: u64,

    /// Number of ratings received
    pub num_times_rated: u64,

    /// Editor pick flag
    pub editor_pick: bool,
}

impl StockBook {
    /// Create a stock book from a validated spec.
    ///
    /// Ratings and sale misses start at zero regardless of the spec.
    pub fn from_spec(spec: &BookSpec) -> Self {
        Self {
            isbn: spec.isbn,
            title: spec.title.clone(),
            author: spec.author.clone(),
            price: spec.price,
            num_copies: spec.num_copies,
            num_sale_misses: 0,
            total_rating: 0,
            num_times_rated: 0,
            editor_pick: spec.editor_pick,
        }
    }

    /// Average rating: `total_rating / num_times_rated`, or 0 if never rated
    pub fn average_rating(&self) -> f32 {
        if self.num_times_rated == 0 {
            0.0
        } else {
            self.total_rating as f32 / self.num_times_rated as f32
        }
    }

    /// Apply a single rating (caller has validated the range)
    pub fn apply_rating(&mut self, rating: i32) {
        self.total_rating += rating as u64;
        self.num_times_rated += 1;
    }

    /// Record units of unmet demand from a failed purchase.
    ///
    /// The counter saturates at `u32::MAX` so repeated huge failed
    /// purchases never wrap it back down.
    pub fn record_sale_misses(&mut self, shortfall: u32) {
        self.num_sale_misses = self.num_sale_misses.saturating_add(shortfall);
    }

    /// Project the read-only public view
    pub fn to_book(&self) -> Book {
        Book {
            isbn: self.isbn,
            title: self.title.clone(),
            author: self.author.clone(),
            price: self.price,
        }
    }
}
