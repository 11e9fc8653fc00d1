//! Request definitions
//!
//! Every RPC operation maps to one fixed message tag; the tag routes a
//! decoded request to its handler on the server.

use std::collections::{HashMap, HashSet};

use crate::catalog::{BookSpec, Isbn};

/// Message tags, one per operation.
///
/// Tag values are part of the wire contract and must never be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageTag {
    AddBooks = 0x01,
    ListBooks = 0x02,
    AddCopies = 0x03,
    GetBooks = 0x04,
    BuyBooks = 0x05,
    UpdateEditorPicks = 0x06,
    GetEditorPicks = 0x07,
    RemoveAllBooks = 0x08,
    RemoveBooks = 0x09,
    GetBooksByIsbn = 0x0A,
    RateBooks = 0x0B,
    GetTopRatedBooks = 0x0C,
    GetBooksInDemand = 0x0D,
    Ping = 0x0E,
}

impl MessageTag {
    /// Parse a tag byte; an unrecognized value is a protocol error at the
    /// call site, never silently ignored
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::AddBooks),
            0x02 => Some(Self::ListBooks),
            0x03 => Some(Self::AddCopies),
            0x04 => Some(Self::GetBooks),
            0x05 => Some(Self::BuyBooks),
            0x06 => Some(Self::UpdateEditorPicks),
            0x07 => Some(Self::GetEditorPicks),
            0x08 => Some(Self::RemoveAllBooks),
            0x09 => Some(Self::RemoveBooks),
            0x0A => Some(Self::GetBooksByIsbn),
            0x0B => Some(Self::RateBooks),
            0x0C => Some(Self::GetTopRatedBooks),
            0x0D => Some(Self::GetBooksInDemand),
            0x0E => Some(Self::Ping),
            _ => None,
        }
    }

    /// Whether this tag carries no request payload on the wire
    pub fn is_bodyless(self) -> bool {
        matches!(
            self,
            Self::ListBooks | Self::RemoveAllBooks | Self::GetBooksInDemand | Self::Ping
        )
    }
}

/// A parsed request
#[derive(Debug, Clone)]
pub enum Request {
    /// Add a batch of new books
    AddBooks(Vec<BookSpec>),

    /// Full administrative snapshot of the catalog
    ListBooks,

    /// Add copies to existing books
    AddCopies(HashMap<Isbn, u32>),

    /// Public snapshots of the named books
    GetBooks(HashSet<Isbn>),

    /// Buy copies of books as one atomic batch
    BuyBooks(HashMap<Isbn, u32>),

    /// Set or clear editor-pick flags
    UpdateEditorPicks(HashMap<Isbn, bool>),

    /// Up to `count` editor picks
    GetEditorPicks(i64),

    /// Clear the whole catalog
    RemoveAllBooks,

    /// Remove the named books
    RemoveBooks(HashSet<Isbn>),

    /// Administrative snapshots of the named books
    GetBooksByIsbn(HashSet<Isbn>),

    /// Apply a batch of ratings
    RateBooks(HashMap<Isbn, i32>),

    /// The `count` books with the highest average rating
    GetTopRatedBooks(i64),

    /// Books whose sale-miss counter is positive
    GetBooksInDemand,

    /// Ping (health check)
    Ping,
}

impl Request {
    /// Get the message tag for this request
    pub fn tag(&self) -> MessageTag {
        match self {
            Request::AddBooks(_) => MessageTag::AddBooks,
            Request::ListBooks => MessageTag::ListBooks,
            Request::AddCopies(_) => MessageTag::AddCopies,
            Request::GetBooks(_) => MessageTag::GetBooks,
            Request::BuyBooks(_) => MessageTag::BuyBooks,
            Request::UpdateEditorPicks(_) => MessageTag::UpdateEditorPicks,
            Request::GetEditorPicks(_) => MessageTag::GetEditorPicks,
            Request::RemoveAllBooks => MessageTag::RemoveAllBooks,
            Request::RemoveBooks(_) => MessageTag::RemoveBooks,
            Request::GetBooksByIsbn(_) => MessageTag::GetBooksByIsbn,
            Request::RateBooks(_) => MessageTag::RateBooks,
            Request::GetTopRatedBooks(_) => MessageTag::GetTopRatedBooks,
            Request::GetBooksInDemand => MessageTag::GetBooksInDemand,
            Request::Ping => MessageTag::Ping,
        }
    }
}
