use std::{collections::HashSet, fmt, fs, io, path::Path};

use serde::Serialize;
use serde_json::{Value, ser::PrettyFormatter};
use tracing::{debug, info, warn};

use crate::{
    book_status::BookStatus,
    error::{CatalogError, RecordError, Result},
    record::{Book, BookId, Year},
};

/// Indentation used when writing the store
const STORE_INDENT: &[u8] = b"    ";

/// A catalog read from disk together with the problems met while reading it
#[derive(Debug)]
pub struct Loaded {
    /// Every well-formed book from the store, in stored order
    pub catalog: Catalog,
    /// Conditions worth telling the operator about
    pub issues: Vec<CatalogError>,
}

/// The in-memory book collection and the operations on it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Books in the order they were added
    books: Vec<Book>,
}

impl Catalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the catalog stored at `path`
    ///
    /// This never fails. A missing file is an empty catalog. An empty or
    /// unparseable file, or one that cannot be read, also gives an empty
    /// catalog and is reported in [`Loaded::issues`]; the file itself is left
    /// alone until the next [`Catalog::save`]. Entries that are not valid
    /// books are skipped and reported one by one.
    pub fn load(path: impl AsRef<Path>) -> Loaded {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading catalog");

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no catalog file yet, starting empty");
                return Loaded { catalog: Self::new(), issues: Vec::new() };
            }
            Err(source) => {
                let issue = CatalogError::StoreUnavailable { path: path.to_path_buf(), source };
                warn!("{issue}");
                return Loaded { catalog: Self::new(), issues: vec![issue] };
            }
        };

        let entries = match parse_store(&bytes) {
            Ok(entries) => entries,
            Err(reason) => {
                let issue = CatalogError::CorruptStore { path: path.to_path_buf(), reason };
                warn!("{issue}");
                return Loaded { catalog: Self::new(), issues: vec![issue] };
            }
        };

        let mut catalog = Self::new();
        let mut issues = Vec::new();
        let mut seen = HashSet::new();
        for (position, entry) in entries.into_iter().enumerate() {
            let outcome = Book::from_record(entry).and_then(|book| {
                if seen.insert(book.id()) {
                    Ok(book)
                } else {
                    Err(RecordError::DuplicateId(book.id()))
                }
            });
            match outcome {
                Ok(book) => catalog.books.push(book),
                Err(source) => {
                    let issue = CatalogError::MalformedRecord { position, source };
                    warn!("skipping stored entry: {issue}");
                    issues.push(issue);
                }
            }
        }

        info!(
            path = %path.display(),
            books = catalog.len(),
            skipped = issues.len(),
            "catalog loaded"
        );
        Loaded { catalog, issues }
    }

    /// Write the whole catalog to `path`, replacing what was there
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError::StoreUnavailable` if the catalog cannot be
    /// encoded or the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let unavailable = |source: io::Error| CatalogError::StoreUnavailable {
            path: path.to_path_buf(),
            source,
        };

        let records: Vec<Value> =
            self.books.iter().map(|book| Value::Object(book.to_record())).collect();

        let mut serialized = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(
            &mut serialized,
            PrettyFormatter::with_indent(STORE_INDENT),
        );
        records.serialize(&mut serializer).map_err(|e| unavailable(e.into()))?;
        serialized.push(b'\n');

        fs::write(path, &serialized).map_err(unavailable)?;

        info!(path = %path.display(), books = self.len(), "catalog saved");
        Ok(())
    }

    /// The id the next added book will get
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError::IdsExhausted` if the highest id is already
    /// taken.
    pub fn next_id(&self) -> Result<BookId> {
        match self.books.iter().map(Book::id).max() {
            None => Ok(BookId::FIRST),
            Some(max) => max.successor().ok_or(CatalogError::IdsExhausted),
        }
    }

    /// Add a book and return a copy of it
    ///
    /// The book gets the next free id and starts out available. Title, author
    /// and year are stored as given.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError::IdsExhausted` if no id is left; nothing is
    /// added.
    pub fn add(
        &mut self,
        title: impl Into<String>,
        author: impl Into<String>,
        year: impl Into<Year>,
    ) -> Result<Book> {
        let book = Book::new(self.next_id()?, title.into(), author.into(), year.into());
        debug!(id = %book.id(), title = book.title(), "adding book");
        self.books.push(book.clone());
        Ok(book)
    }

    /// Remove the book with `id` and return it
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError::NotFound` if no book has that id; the catalog
    /// is left unchanged.
    pub fn delete(&mut self, id: BookId) -> Result<Book> {
        let position =
            self.books.iter().position(|b| b.id() == id).ok_or(CatalogError::NotFound(id))?;
        let removed = self.books.remove(position);
        debug!(%id, "deleted book");
        Ok(removed)
    }

    /// Find books matching `query`, in catalog order
    ///
    /// The query is compared case-insensitively: as a substring of the title
    /// or the author, or as the whole year.
    pub fn find(&self, query: &str) -> impl Iterator<Item = &Book> {
        let query = query.to_lowercase();
        self.books.iter().filter(move |book| book.matches(&query))
    }

    /// Set the status of the book with `id` from user-supplied text
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError::InvalidStatus` if `status` is not a recognized
    /// status, and a `CatalogError::NotFound` if no book has that id. Nothing
    /// changes in either case.
    pub fn change_status(&mut self, id: BookId, status: &str) -> Result<&Book> {
        let status = status.parse::<BookStatus>()?;
        self.set_status(id, status)
    }

    /// Set the status of the book with `id`
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError::NotFound` if no book has that id
    pub fn set_status(&mut self, id: BookId, status: BookStatus) -> Result<&Book> {
        let book =
            self.books.iter_mut().find(|b| b.id() == id).ok_or(CatalogError::NotFound(id))?;
        debug!(%id, from = %book.status(), to = %status, "changing status");
        book.set_status(status);
        Ok(&*book)
    }

    /// Get the book with `id`
    #[must_use]
    pub fn get(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|b| b.id() == id)
    }

    /// Get all books in catalog order
    #[must_use]
    pub fn list(&self) -> &[Book] {
        &self.books
    }

    /// Number of books in the catalog
    #[must_use]
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Check whether the catalog has no books
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

/// Split raw store content into its entries
///
/// Fails with a description when the content is blank, is not JSON, or is not
/// a JSON array.
fn parse_store(bytes: &[u8]) -> std::result::Result<Vec<Value>, String> {
    if bytes.trim_ascii().is_empty() {
        return Err("file is empty".to_string());
    }
    match serde_json::from_slice::<Value>(bytes).map_err(|e| e.to_string())? {
        Value::Array(entries) => Ok(entries),
        other => Err(format!("expected a list of books, found {}", json_kind(&other))),
    }
}

/// Name of the JSON kind of `value`, for messages
fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

// Implementing display for nicer output
impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let checked_out =
            self.books.iter().filter(|b| b.status() == BookStatus::CheckedOut).count();
        write!(f, "{} books, {checked_out} checked out", self.len())
    }
}

#[cfg(test)]
mod tests;
