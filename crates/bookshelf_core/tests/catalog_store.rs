use bookshelf_core::db::open_db_in_memory;
use bookshelf_core::{
    AuthorId, CatalogRepository, NewAuthor, NewBook, RepoError, SortKey, SqliteCatalogRepository,
};
use chrono::NaiveDate;
use rusqlite::Connection;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn insert_author(repo: &SqliteCatalogRepository<'_>, name: &str) -> AuthorId {
    repo.insert_author(&NewAuthor::new(name, date(1900, 1, 1), None))
        .unwrap()
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn insert_author_roundtrips_dates_and_assigns_unique_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatalogRepository::try_new(&conn).unwrap();

    let first = repo
        .insert_author(&NewAuthor::new(
            "Tolkien",
            date(1892, 1, 3),
            Some(date(1973, 9, 2)),
        ))
        .unwrap();
    let second = repo
        .insert_author(&NewAuthor::new("Tolkien", date(1892, 1, 3), None))
        .unwrap();
    assert_ne!(first, second);

    let loaded = repo.get_author(first).unwrap().unwrap();
    assert_eq!(loaded.name, "Tolkien");
    assert_eq!(loaded.birth_date, date(1892, 1, 3));
    assert_eq!(loaded.date_of_death, Some(date(1973, 9, 2)));

    let living = repo.get_author(second).unwrap().unwrap();
    assert_eq!(living.date_of_death, None);
}

#[test]
fn insert_book_requires_existing_author() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatalogRepository::try_new(&conn).unwrap();

    let err = repo
        .insert_book(&NewBook::new("978-0", "Nowhere", 2001, 404))
        .unwrap_err();
    assert!(matches!(err, RepoError::AuthorNotFound(404)));
    assert_eq!(count(&conn, "books"), 0);
}

#[test]
fn find_books_joins_author_and_sorts_by_title_or_author() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatalogRepository::try_new(&conn).unwrap();
    let zola = insert_author(&repo, "Zola");
    let austen = insert_author(&repo, "Austen");

    repo.insert_book(&NewBook::new("1", "Germinal", 1885, zola))
        .unwrap();
    repo.insert_book(&NewBook::new("2", "Persuasion", 1817, austen))
        .unwrap();
    repo.insert_book(&NewBook::new("3", "Emma", 1815, austen))
        .unwrap();

    let by_title = repo.find_books(None, SortKey::Title).unwrap();
    let titles: Vec<&str> = by_title.iter().map(|e| e.book.title.as_str()).collect();
    assert_eq!(titles, vec!["Emma", "Germinal", "Persuasion"]);
    assert_eq!(by_title[1].author.name, "Zola");
    assert_eq!(by_title[1].book.author_id, zola);

    let by_author = repo.find_books(None, SortKey::Author).unwrap();
    let authors: Vec<&str> = by_author.iter().map(|e| e.author.name.as_str()).collect();
    assert_eq!(authors, vec!["Austen", "Austen", "Zola"]);
}

#[test]
fn find_books_filters_by_case_insensitive_title_substring() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatalogRepository::try_new(&conn).unwrap();
    let author = insert_author(&repo, "Tolkien");
    repo.insert_book(&NewBook::new("1", "The Hobbit", 1937, author))
        .unwrap();
    repo.insert_book(&NewBook::new("2", "The Silmarillion", 1977, author))
        .unwrap();

    let hits = repo.find_books(Some("HOBB"), SortKey::Title).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].book.title, "The Hobbit");

    let none = repo.find_books(Some("Dune"), SortKey::Title).unwrap();
    assert!(none.is_empty());
}

#[test]
fn find_books_case_folding_covers_ascii_letters_only() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatalogRepository::try_new(&conn).unwrap();
    let author = insert_author(&repo, "Rousseau");
    repo.insert_book(&NewBook::new("1", "Émile", 1762, author))
        .unwrap();

    assert_eq!(repo.find_books(Some("MILE"), SortKey::Title).unwrap().len(), 1);
    assert_eq!(repo.find_books(Some("Émile"), SortKey::Title).unwrap().len(), 1);
    assert!(repo
        .find_books(Some("émile"), SortKey::Title)
        .unwrap()
        .is_empty());
}

#[test]
fn find_books_matches_wildcard_characters_literally() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatalogRepository::try_new(&conn).unwrap();
    let author = insert_author(&repo, "Anon");
    repo.insert_book(&NewBook::new("1", "100% Pure", 2010, author))
        .unwrap();
    repo.insert_book(&NewBook::new("2", "1000 Ways", 2011, author))
        .unwrap();

    let hits = repo.find_books(Some("100%"), SortKey::Title).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].book.title, "100% Pure");

    let underscore = repo.find_books(Some("_"), SortKey::Title).unwrap();
    assert!(underscore.is_empty());
}

#[test]
fn delete_last_book_removes_orphaned_author() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatalogRepository::try_new(&conn).unwrap();
    let tolkien = insert_author(&repo, "Tolkien");
    let hobbit = repo
        .insert_book(&NewBook::new("978-0", "The Hobbit", 1937, tolkien))
        .unwrap();

    let deletion = repo.delete_book(hobbit).unwrap();
    assert_eq!(deletion.book.title, "The Hobbit");
    assert_eq!(
        deletion.removed_author.map(|a| a.name),
        Some("Tolkien".to_string())
    );

    assert!(repo.get_book(hobbit).unwrap().is_none());
    assert!(repo
        .list_authors()
        .unwrap()
        .iter()
        .all(|author| author.name != "Tolkien"));
}

#[test]
fn delete_book_keeps_author_with_remaining_books() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatalogRepository::try_new(&conn).unwrap();
    let austen = insert_author(&repo, "Austen");
    let emma = repo
        .insert_book(&NewBook::new("1", "Emma", 1815, austen))
        .unwrap();
    repo.insert_book(&NewBook::new("2", "Persuasion", 1817, austen))
        .unwrap();

    let deletion = repo.delete_book(emma).unwrap();
    assert!(deletion.removed_author.is_none());
    assert!(repo.get_author(austen).unwrap().is_some());
    assert_eq!(repo.count_books_by_author(austen).unwrap(), 1);
}

#[test]
fn delete_missing_book_returns_not_found_and_leaves_store_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatalogRepository::try_new(&conn).unwrap();
    let author = insert_author(&repo, "Austen");
    repo.insert_book(&NewBook::new("1", "Emma", 1815, author))
        .unwrap();

    let err = repo.delete_book(9999).unwrap_err();
    assert!(matches!(err, RepoError::BookNotFound(9999)));
    assert_eq!(count(&conn, "books"), 1);
    assert_eq!(count(&conn, "authors"), 1);
}

#[test]
fn failed_author_cleanup_rolls_back_book_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCatalogRepository::try_new(&conn).unwrap();
    let author = insert_author(&repo, "Tolkien");
    let book = repo
        .insert_book(&NewBook::new("1", "The Hobbit", 1937, author))
        .unwrap();

    conn.execute_batch(
        "CREATE TRIGGER block_author_delete BEFORE DELETE ON authors
         BEGIN
             SELECT RAISE(ABORT, 'author delete blocked');
         END;",
    )
    .unwrap();

    let err = repo.delete_book(book).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert!(repo.get_book(book).unwrap().is_some());
    assert!(repo.get_author(author).unwrap().is_some());
}

#[test]
fn read_paths_reject_malformed_persisted_dates() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO authors (name, birth_date) VALUES ('Broken', 'yesterday');",
        [],
    )
    .unwrap();
    let repo = SqliteCatalogRepository::try_new(&conn).unwrap();

    let err = repo.list_authors().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
