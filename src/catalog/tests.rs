use std::{error::Error, fs};

use tempfile::tempdir;

use crate::{
    book_status::BookStatus,
    catalog::Catalog,
    error::{CatalogError, RecordError},
    record::{Book, BookId, Year},
};

/// Boxed error so tests can use `?` on anything
type TestResult = Result<(), Box<dyn Error>>;

/// Helper function to build a small catalog
fn setup_test_catalog() -> Result<Catalog, CatalogError> {
    let mut catalog = Catalog::new();
    catalog.add("Dune", "Herbert", "1965")?;
    catalog.add("1984", "Orwell", "1949")?;
    catalog.add("Animal Farm", "Orwell", Year::Number(19840))?;
    Ok(catalog)
}

/// Ids of the catalog in order
fn ids(catalog: &Catalog) -> Vec<u64> {
    catalog.list().iter().map(|b| b.id().get()).collect()
}

#[test]
fn test_add_assigns_sequential_ids() -> TestResult {
    let mut catalog = Catalog::new();
    for n in 1..=5_u64 {
        let book = catalog.add(format!("Book {n}"), "Author", "2000")?;
        assert_eq!(book.id().get(), n);
        assert_eq!(book.status(), BookStatus::Available);
    }
    assert_eq!(ids(&catalog), vec![1, 2, 3, 4, 5]);
    Ok(())
}

#[test]
fn test_ids_stay_distinct_after_deletes() -> TestResult {
    let mut catalog = setup_test_catalog()?;
    catalog.delete(BookId::from(2))?;
    catalog.add("Foundation", "Asimov", "1951")?;
    catalog.delete(BookId::from(1))?;
    catalog.add("Solaris", "Lem", "1961")?;

    let mut all = ids(&catalog);
    assert_eq!(all, vec![3, 4, 5]);
    all.dedup();
    assert_eq!(all.len(), catalog.len());
    Ok(())
}

#[test]
fn test_add_accepts_empty_fields() -> TestResult {
    let mut catalog = Catalog::new();
    let book = catalog.add("", "", "")?;
    assert_eq!(book.title(), "");
    assert_eq!(book.year(), &Year::Text(String::new()));
    Ok(())
}

#[test]
fn test_delete_missing_id_leaves_catalog_unchanged() -> TestResult {
    let mut catalog = setup_test_catalog()?;
    let before = catalog.clone();

    let result = catalog.delete(BookId::from(42));
    assert!(matches!(result, Err(CatalogError::NotFound(id)) if id.get() == 42));
    assert_eq!(catalog, before);
    Ok(())
}

#[test]
fn test_delete_returns_removed_book() -> TestResult {
    let mut catalog = setup_test_catalog()?;
    let removed = catalog.delete(BookId::from(1))?;
    assert_eq!(removed.title(), "Dune");
    assert!(catalog.get(BookId::from(1)).is_none());
    assert_eq!(catalog.len(), 2);
    Ok(())
}

#[test]
fn test_find_by_year_is_exact() -> TestResult {
    let catalog = setup_test_catalog()?;

    let titles: Vec<&str> = catalog.find("1949").map(Book::title).collect();
    assert_eq!(titles, vec!["1984"]);

    // "1984" is a title substring of book 2 but not the year of book 3 (19840)
    let titles: Vec<&str> = catalog.find("1984").map(Book::title).collect();
    assert_eq!(titles, vec!["1984"]);
    Ok(())
}

#[test]
fn test_find_is_case_insensitive_and_ordered() -> TestResult {
    let catalog = setup_test_catalog()?;
    let found: Vec<u64> = catalog.find("orw").map(|b| b.id().get()).collect();
    assert_eq!(found, vec![2, 3]);

    let found: Vec<u64> = catalog.find("DUNE").map(|b| b.id().get()).collect();
    assert_eq!(found, vec![1]);
    Ok(())
}

#[test]
fn test_find_without_matches_is_empty() -> TestResult {
    let catalog = setup_test_catalog()?;
    assert_eq!(catalog.find("tolkien").count(), 0);
    assert_eq!(Catalog::new().find("").count(), 0);
    Ok(())
}

#[test]
fn test_change_status() -> TestResult {
    let mut catalog = setup_test_catalog()?;
    let book = catalog.change_status(BookId::from(2), "CheckedOut")?;
    assert_eq!(book.status(), BookStatus::CheckedOut);
    assert_eq!(book.title(), "1984");

    let book = catalog.change_status(BookId::from(2), "Available")?;
    assert_eq!(book.status(), BookStatus::Available);
    Ok(())
}

#[test]
fn test_change_status_rejects_unknown_status() -> TestResult {
    let mut catalog = setup_test_catalog()?;
    let before = catalog.clone();

    let result = catalog.change_status(BookId::from(1), "Lost");
    assert!(matches!(result, Err(CatalogError::InvalidStatus(ref s)) if s == "Lost"));
    assert_eq!(catalog, before);
    Ok(())
}

#[test]
fn test_change_status_on_missing_id() -> TestResult {
    let mut catalog = setup_test_catalog()?;
    let before = catalog.clone();

    let result = catalog.change_status(BookId::from(9), "CheckedOut");
    assert!(matches!(result, Err(CatalogError::NotFound(id)) if id.get() == 9));
    assert_eq!(catalog, before);
    Ok(())
}

#[test]
fn test_load_missing_file_is_empty() -> TestResult {
    let dir = tempdir()?;
    let loaded = Catalog::load(dir.path().join("books.json"));
    assert!(loaded.catalog.is_empty());
    assert!(loaded.issues.is_empty());
    Ok(())
}

#[test]
fn test_save_then_load_round_trip() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("books.json");

    let mut catalog = setup_test_catalog()?;
    catalog.add("Мастер и Маргарита", "Булгаков", Year::Number(1967))?;
    catalog.set_status(BookId::from(4), BookStatus::CheckedOut)?;
    catalog.delete(BookId::from(1))?;
    catalog.save(&path)?;

    let loaded = Catalog::load(&path);
    assert!(loaded.issues.is_empty());
    assert_eq!(loaded.catalog, catalog);
    Ok(())
}

#[test]
fn test_save_writes_readable_utf8() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("books.json");

    let mut catalog = Catalog::new();
    catalog.add("Мастер и Маргарита", "Булгаков", "1967")?;
    catalog.save(&path)?;

    let content = fs::read_to_string(&path)?;
    assert!(content.contains("\"title\": \"Мастер и Маргарита\""));
    assert!(content.contains("\n    {\n        \"id\": 1,"));
    Ok(())
}

#[test]
fn test_save_is_idempotent() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("books.json");
    let catalog = setup_test_catalog()?;

    catalog.save(&path)?;
    let first = fs::read(&path)?;
    catalog.save(&path)?;
    let second = fs::read(&path)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_save_empty_catalog_round_trips() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("books.json");

    Catalog::new().save(&path)?;
    let loaded = Catalog::load(&path);
    assert!(loaded.catalog.is_empty());
    assert!(loaded.issues.is_empty());
    Ok(())
}

#[test]
fn test_load_empty_or_invalid_file_is_corrupt() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("books.json");

    for content in ["", "   \n", "{not json", "{\"id\": 1}", "42"] {
        fs::write(&path, content)?;
        let loaded = Catalog::load(&path);
        assert!(loaded.catalog.is_empty(), "content {content:?}");
        assert_eq!(loaded.issues.len(), 1);
        assert!(matches!(loaded.issues.first(), Some(CatalogError::CorruptStore { .. })));
        // The file is left for the next save to overwrite
        assert_eq!(fs::read_to_string(&path)?, content);
    }
    Ok(())
}

#[test]
fn test_load_unreadable_store_is_unavailable() -> TestResult {
    let dir = tempdir()?;
    // A directory cannot be read as a file
    let loaded = Catalog::load(dir.path());
    assert!(loaded.catalog.is_empty());
    assert!(matches!(loaded.issues.first(), Some(CatalogError::StoreUnavailable { .. })));
    Ok(())
}

#[test]
fn test_save_to_unwritable_path_is_unavailable() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("missing").join("books.json");

    let result = setup_test_catalog()?.save(&path);
    assert!(matches!(result, Err(CatalogError::StoreUnavailable { .. })));
    Ok(())
}

#[test]
fn test_load_skips_malformed_and_duplicate_entries() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("books.json");
    fs::write(
        &path,
        r#"[
            {"id": 1, "title": "Dune", "author": "Herbert", "year": "1965"},
            {"id": 2, "title": "No author", "year": "2000"},
            {"id": 1, "title": "Copy", "author": "Someone", "year": 2001},
            {"id": 5, "title": "1984", "author": "Orwell", "year": 1949,
             "status": "В наличии"}
        ]"#,
    )?;

    let loaded = Catalog::load(&path);
    assert_eq!(ids(&loaded.catalog), vec![1, 5]);
    assert_eq!(loaded.issues.len(), 2);
    assert!(matches!(
        loaded.issues.first(),
        Some(CatalogError::MalformedRecord { position: 1, source: RecordError::Shape(_) })
    ));
    assert!(matches!(
        loaded.issues.get(1),
        Some(CatalogError::MalformedRecord { position: 2, source: RecordError::DuplicateId(_) })
    ));
    assert_eq!(loaded.catalog.next_id()?.get(), 6);
    Ok(())
}

#[test]
fn test_end_to_end_session() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("books.json");

    let mut catalog = Catalog::load(&path).catalog;
    let dune = catalog.add("Dune", "Herbert", "1965")?;
    assert_eq!(dune.id().get(), 1);
    assert_eq!(dune.status(), BookStatus::Available);

    assert_eq!(catalog.add("1984", "Orwell", "1949")?.id().get(), 2);
    catalog.delete(BookId::from(1))?;
    assert_eq!(catalog.add("Foundation", "Asimov", "1951")?.id().get(), 3);
    assert_eq!(ids(&catalog), vec![2, 3]);

    catalog.save(&path)?;
    let reloaded = Catalog::load(&path).catalog;
    assert_eq!(ids(&reloaded), vec![2, 3]);
    assert_eq!(reloaded.to_string(), "2 books, 0 checked out");
    Ok(())
}

#[test]
fn test_add_stops_at_highest_id() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("books.json");
    let near_max = BookId::MAX.get().saturating_sub(1);
    fs::write(
        &path,
        format!(r#"[{{"id": {near_max}, "title": "Dune", "author": "Herbert", "year": "1965"}}]"#),
    )?;

    let mut catalog = Catalog::load(&path).catalog;
    let last = catalog.add("1984", "Orwell", "1949")?;
    assert_eq!(last.id(), BookId::MAX);

    let before = catalog.clone();
    let result = catalog.add("Foundation", "Asimov", "1951");
    assert!(matches!(result, Err(CatalogError::IdsExhausted)));
    assert_eq!(catalog, before);

    // Every id the catalog hands out survives a save and reload
    catalog.save(&path)?;
    let loaded = Catalog::load(&path);
    assert!(loaded.issues.is_empty());
    assert_eq!(loaded.catalog, catalog);
    Ok(())
}
