//! Request dispatcher
//!
//! Routes a decoded request to its store operation and packs the result
//! into a response envelope.

use serde::Serialize;

use crate::catalog::CatalogStore;
use crate::error::CatalogError;
use crate::protocol::{Request, Response};

/// Execute a request against the store and build the response envelope.
///
/// Application rejections become `Rejected` envelopes carrying the typed
/// error; serialization failures on the result become `Failed` envelopes.
pub fn execute(store: &CatalogStore, request: Request) -> Response {
    match request {
        Request::AddBooks(specs) => unit(store.add_books(&specs)),
        Request::ListBooks => value(store.list_books()),
        Request::AddCopies(requests) => unit(store.add_copies(&requests)),
        Request::GetBooks(isbns) => value(store.get_books(&isbns)),
        Request::BuyBooks(requests) => unit(store.buy_books(&requests)),
        Request::UpdateEditorPicks(picks) => unit(store.update_editor_picks(&picks)),
        Request::GetEditorPicks(count) => value(store.get_editor_picks(count)),
        Request::RemoveAllBooks => unit(store.remove_all_books()),
        Request::RemoveBooks(isbns) => unit(store.remove_books(&isbns)),
        Request::GetBooksByIsbn(isbns) => value(store.get_books_by_isbn(&isbns)),
        Request::RateBooks(ratings) => unit(store.rate_books(&ratings)),
        Request::GetTopRatedBooks(count) => value(store.get_top_rated_books(count)),
        Request::GetBooksInDemand => value(store.get_books_in_demand()),
        Request::Ping => Response::ok(Some(b"PONG".to_vec())),
    }
}

/// Envelope for a unit-result operation
fn unit(result: Result<(), CatalogError>) -> Response {
    match result {
        Ok(()) => Response::ok(None),
        Err(err) => Response::rejected(&err),
    }
}

/// Envelope for a value-result operation
fn value<T: Serialize>(result: Result<T, CatalogError>) -> Response {
    match result {
        Ok(value) => match bincode::serialize(&value) {
            Ok(bytes) => Response::ok(Some(bytes)),
            Err(e) => Response::failed(&format!("failed to encode result: {}", e)),
        },
        Err(err) => Response::rejected(&err),
    }
}
