//! Personal library catalog kept in a JSON file.
//!
//! This crate provides the book records, the catalog that owns them along
//! with its load/save round trip, and a console menu to drive it.

pub mod book_status;
pub mod catalog;
pub mod console;
pub mod error;
pub mod record;

pub use book_status::BookStatus;
pub use catalog::{Catalog, Loaded};
pub use console::Console;
pub use error::{CatalogError, RecordError, Result};
pub use record::{Book, BookId, Record, Year};
