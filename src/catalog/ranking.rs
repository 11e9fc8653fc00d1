//! Top-k ranking by average rating
//!
//! Bounded selection over the catalog: a size-k min-heap keeps the k best
//! books seen so far, giving O(n log k) instead of a full sort. Average
//! ratings are compared by exact cross-multiplication in `u128`, so the
//! ordering is total and repeated calls against an unchanged catalog
//! return identical results.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use super::book::{Isbn, StockBook};

/// Ranking key for one book: rating aggregates plus the tie-breaking isbn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ranked {
    total_rating: u64,
    num_times_rated: u64,
    isbn: Isbn,
}

impl Ranked {
    fn new(book: &StockBook) -> Self {
        Self {
            total_rating: book.total_rating,
            num_times_rated: book.num_times_rated,
            isbn: book.isbn,
        }
    }

    /// Aggregates normalized so a never-rated book compares as average 0
    fn as_fraction(&self) -> (u64, u64) {
        if self.num_times_rated == 0 {
            (0, 1)
        } else {
            (self.total_rating, self.num_times_rated)
        }
    }
}

impl Ord for Ranked {
    /// `Greater` means "ranks better": higher average rating, then lower isbn.
    ///
    /// `a/b > c/d  <=>  a*d > c*b` for positive denominators; `u128` keeps
    /// the products exact, so no floating point enters the ordering.
    fn cmp(&self, other: &Self) -> Ordering {
        let (lhs_total, lhs_count) = self.as_fraction();
        let (rhs_total, rhs_count) = other.as_fraction();

        let lhs = lhs_total as u128 * rhs_count as u128;
        let rhs = rhs_total as u128 * lhs_count as u128;

        lhs.cmp(&rhs).then_with(|| other.isbn.cmp(&self.isbn))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Select the isbns of the top `k` books by average rating, best first.
///
/// Ties break by ascending isbn. Returns fewer than `k` isbns only when
/// the catalog itself holds fewer books.
pub(super) fn top_rated_isbns<'a, I>(books: I, k: usize) -> Vec<Isbn>
where
    I: Iterator<Item = &'a StockBook>,
{
    if k == 0 {
        return Vec::new();
    }

    // Min-heap of the best k seen so far; the worst of them sits on top
    // and is evicted whenever a better candidate arrives.
    let mut heap: BinaryHeap<Reverse<Ranked>> = BinaryHeap::with_capacity(k + 1);

    for book in books {
        heap.push(Reverse(Ranked::new(book)));
        if heap.len() > k {
            heap.pop();
        }
    }

    // Ascending `Reverse` order is best-first for the inner value
    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(ranked)| ranked.isbn)
        .collect()
}
