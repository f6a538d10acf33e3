use std::{io, path::PathBuf};

use thiserror::Error;

use crate::record::BookId;

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors and recoverable conditions reported by the catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A stored entry could not be turned into a book
    #[error("malformed record at position {position}: {source}")]
    MalformedRecord {
        /// Zero-based index of the entry in the store
        position: usize,
        /// What was wrong with the entry
        #[source]
        source: RecordError,
    },

    /// The store exists but does not hold a readable catalog
    #[error("store {} is corrupt: {reason}", .path.display())]
    CorruptStore {
        /// Location of the store
        path: PathBuf,
        /// Parser message or a description of the problem
        reason: String,
    },

    /// The store could not be read or written
    #[error("store {} is unavailable: {source}", .path.display())]
    StoreUnavailable {
        /// Location of the store
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// The requested status is not one of the recognized values
    #[error("unknown status {0:?}, expected Available or CheckedOut")]
    InvalidStatus(String),

    /// No book carries the requested id
    #[error("no book with id {0}")]
    NotFound(BookId),

    /// Every id up to the highest one is taken
    #[error("no ids left after {}", BookId::MAX)]
    IdsExhausted,
}

/// Problems with a single stored record
#[derive(Debug, Error)]
pub enum RecordError {
    /// A field is missing or has the wrong kind
    #[error("{0}")]
    Shape(#[from] serde_json::Error),

    /// The id is outside the range the catalog assigns
    #[error("id {0} is out of range")]
    InvalidId(u64),

    /// Another record already uses the id
    #[error("duplicate id {0}")]
    DuplicateId(BookId),
}
