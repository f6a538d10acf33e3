//! Book records and their stored form.
//!
//! A [`Book`] only leaves memory as a [`Record`], a plain JSON object, and only
//! comes back in through [`Book::from_record`], which checks every field.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{book_status::BookStatus, error::RecordError};

/// The stored form of a book: field name to JSON value
pub type Record = Map<String, Value>;

/// Catalog-assigned identifier of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct BookId(u64);

impl BookId {
    /// The id given to the first book of an empty catalog
    pub const FIRST: Self = Self(1);

    /// The largest id the catalog assigns or accepts from a store
    ///
    /// Kept within `i64` so every id is an exact JSON integer.
    pub const MAX: Self = Self(i64::MAX.unsigned_abs());

    /// Get the raw id value
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }

    /// Check whether the id lies in `FIRST..=MAX`
    #[must_use]
    pub fn is_valid(self) -> bool {
        (Self::FIRST..=Self::MAX).contains(&self)
    }

    /// The id following this one, or `None` past [`BookId::MAX`]
    #[must_use]
    pub(crate) fn successor(self) -> Option<Self> {
        Some(Self(self.0.checked_add(1)?)).filter(|next| next.is_valid())
    }
}

impl From<u64> for BookId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for BookId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Publication year exactly as it was entered or stored
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Year {
    /// Year stored as a JSON integer
    Number(i64),
    /// Year stored as text, unvalidated
    Text(String),
}

impl From<&str> for Year {
    fn from(year: &str) -> Self {
        Self::Text(year.to_string())
    }
}

impl From<String> for Year {
    fn from(year: String) -> Self {
        Self::Text(year)
    }
}

impl From<i64> for Year {
    fn from(year: i64) -> Self {
        Self::Number(year)
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(year) => write!(f, "{year}"),
            Self::Text(year) => f.write_str(year),
        }
    }
}

impl From<&Year> for Value {
    fn from(year: &Year) -> Self {
        match year {
            Year::Number(year) => Self::from(*year),
            Year::Text(year) => Self::from(year.as_str()),
        }
    }
}

/// A book in the catalog
///
/// Only the status can change once a book exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    /// Unique id within the catalog
    id: BookId,
    /// Title as entered
    title: String,
    /// Author as entered
    author: String,
    /// Publication year as entered
    year: Year,
    /// Current lending status
    status: BookStatus,
}

/// Shape a stored record must have
#[derive(Debug, Deserialize)]
struct RawRecord {
    /// Stored id, checked for range after parsing
    id: u64,
    /// Stored title
    title: String,
    /// Stored author
    author: String,
    /// Stored year
    year: Year,
    /// Older stores have no status field
    #[serde(default)]
    status: BookStatus,
}

impl Book {
    /// Create a book with the default status
    pub(crate) fn new(id: BookId, title: String, author: String, year: Year) -> Self {
        Self { id, title, author, year, status: BookStatus::default() }
    }

    /// Get the book id
    #[must_use]
    pub fn id(&self) -> BookId {
        self.id
    }

    /// Get the title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Get the author
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Get the publication year
    #[must_use]
    pub fn year(&self) -> &Year {
        &self.year
    }

    /// Get the lending status
    #[must_use]
    pub fn status(&self) -> BookStatus {
        self.status
    }

    /// Replace the lending status
    pub(crate) fn set_status(&mut self, status: BookStatus) {
        self.status = status;
    }

    /// Check whether `query` (already lowercased) matches this book
    ///
    /// Title and author match on substring, the year only on the whole value.
    pub(crate) fn matches(&self, query: &str) -> bool {
        self.title.to_lowercase().contains(query)
            || self.author.to_lowercase().contains(query)
            || self.year.to_string().to_lowercase() == query
    }

    /// Convert the book into its stored form
    #[must_use]
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("id".to_string(), Value::from(self.id.get()));
        record.insert("title".to_string(), Value::from(self.title.as_str()));
        record.insert("author".to_string(), Value::from(self.author.as_str()));
        record.insert("year".to_string(), Value::from(&self.year));
        record.insert("status".to_string(), Value::from(self.status.as_str()));
        record
    }

    /// Build a book from its stored form
    ///
    /// A missing `status` means [`BookStatus::Available`].
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Shape`] if the value is not an object, a required
    /// field is missing or has the wrong kind, or the status is unknown, and
    /// [`RecordError::InvalidId`] if the id is zero or above [`BookId::MAX`].
    pub fn from_record(record: Value) -> Result<Self, RecordError> {
        let raw: RawRecord = serde_json::from_value(record)?;
        let id = BookId(raw.id);
        if !id.is_valid() {
            return Err(RecordError::InvalidId(raw.id));
        }

        Ok(Self {
            id,
            title: raw.title,
            author: raw.author,
            year: raw.year,
            status: raw.status,
        })
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} \"{}\" by {} ({}) - {}",
            self.id, self.title, self.author, self.year, self.status
        )
    }
}
