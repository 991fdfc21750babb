//! Catalog repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide author/book persistence over the `authors` and `books` tables.
//! - Own the cascading book delete (book, then orphaned author).
//!
//! # Invariants
//! - A book is only inserted when its author exists.
//! - Deleting a book and removing its orphaned author commit together.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::author::{Author, AuthorId, NewAuthor};
use crate::model::book::{Book, BookId, CatalogEntry, NewBook, SortKey};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DATE_FORMAT: &str = "%Y-%m-%d";

const ENTRY_SELECT_SQL: &str = "SELECT
    b.id AS book_id,
    b.isbn AS isbn,
    b.title AS title,
    b.publication_year AS publication_year,
    a.id AS author_id,
    a.name AS author_name,
    a.birth_date AS birth_date,
    a.date_of_death AS date_of_death
FROM books b
INNER JOIN authors a ON a.id = b.author_id";

const AUTHOR_SELECT_SQL: &str = "SELECT
    id AS author_id,
    name AS author_name,
    birth_date,
    date_of_death
FROM authors";

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("authors", &["id", "name", "birth_date", "date_of_death"]),
    (
        "books",
        &["id", "isbn", "title", "publication_year", "author_id"],
    ),
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for catalog persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    BookNotFound(BookId),
    AuthorNotFound(AuthorId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::BookNotFound(id) => write!(f, "book not found: {id}"),
            Self::AuthorNotFound(id) => write!(f, "author not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted catalog data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "database is missing required table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "table `{table}` is missing required column `{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Outcome of a cascading book delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDeletion {
    pub book: Book,
    /// Set when the book was the author's last one and the author was removed.
    pub removed_author: Option<Author>,
}

/// Repository interface for the catalog store.
pub trait CatalogRepository {
    /// Persists a new author and returns its assigned id.
    fn insert_author(&self, author: &NewAuthor) -> RepoResult<AuthorId>;
    /// Persists a new book; fails with `AuthorNotFound` for unknown authors.
    fn insert_book(&self, book: &NewBook) -> RepoResult<BookId>;
    /// Lists books joined with their author, optionally filtered by a
    /// case-insensitive title substring.
    ///
    /// Matching uses SQLite `LIKE`, which folds case for ASCII letters
    /// only: `hobbit` finds `The Hobbit`, but `émile` does not find `Émile`.
    fn find_books(&self, search_term: Option<&str>, sort: SortKey)
        -> RepoResult<Vec<CatalogEntry>>;
    /// Deletes a book and, in the same transaction, its orphaned author.
    fn delete_book(&self, id: BookId) -> RepoResult<BookDeletion>;
    /// Lists all authors ordered by name.
    fn list_authors(&self) -> RepoResult<Vec<Author>>;
    fn get_book(&self, id: BookId) -> RepoResult<Option<CatalogEntry>>;
    fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>>;
    fn count_books_by_author(&self, id: AuthorId) -> RepoResult<u64>;
}

/// SQLite-backed catalog repository.
pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - Returns `MissingRequiredTable`/`MissingRequiredColumn` when the
    ///   connection was not opened through `db::open_db*`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_catalog_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn insert_author(&self, author: &NewAuthor) -> RepoResult<AuthorId> {
        self.conn.execute(
            "INSERT INTO authors (name, birth_date, date_of_death)
             VALUES (?1, ?2, ?3);",
            params![
                author.name.as_str(),
                date_to_db(author.birth_date),
                author.date_of_death.map(date_to_db),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_book(&self, book: &NewBook) -> RepoResult<BookId> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !author_exists_in_tx(&tx, book.author_id)? {
            return Err(RepoError::AuthorNotFound(book.author_id));
        }

        tx.execute(
            "INSERT INTO books (isbn, title, publication_year, author_id)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                book.isbn.as_str(),
                book.title.as_str(),
                book.publication_year,
                book.author_id,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    fn find_books(
        &self,
        search_term: Option<&str>,
        sort: SortKey,
    ) -> RepoResult<Vec<CatalogEntry>> {
        let mut sql = format!("{ENTRY_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(term) = search_term {
            sql.push_str(" AND b.title LIKE ? ESCAPE '\\'");
            bind_values.push(Value::Text(like_contains_pattern(term)));
        }

        match sort {
            SortKey::Title => sql.push_str(" ORDER BY b.title ASC, b.id ASC"),
            SortKey::Author => sql.push_str(" ORDER BY a.name ASC, b.title ASC, b.id ASC"),
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }

        Ok(entries)
    }

    fn delete_book(&self, id: BookId) -> RepoResult<BookDeletion> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let entry = load_entry(&tx, id)?.ok_or(RepoError::BookNotFound(id))?;

        tx.execute("DELETE FROM books WHERE id = ?1;", [id])?;

        let remaining: i64 = tx.query_row(
            "SELECT COUNT(*) FROM books WHERE author_id = ?1;",
            [entry.author.id],
            |row| row.get(0),
        )?;

        let removed_author = if remaining == 0 {
            tx.execute("DELETE FROM authors WHERE id = ?1;", [entry.author.id])?;
            Some(entry.author)
        } else {
            None
        };

        tx.commit()?;
        Ok(BookDeletion {
            book: entry.book,
            removed_author,
        })
    }

    fn list_authors(&self) -> RepoResult<Vec<Author>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{AUTHOR_SELECT_SQL} ORDER BY name ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut authors = Vec::new();
        while let Some(row) = rows.next()? {
            authors.push(parse_author_row(row)?);
        }
        Ok(authors)
    }

    fn get_book(&self, id: BookId) -> RepoResult<Option<CatalogEntry>> {
        load_entry(self.conn, id)
    }

    fn get_author(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{AUTHOR_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_author_row(row)?));
        }
        Ok(None)
    }

    fn count_books_by_author(&self, id: AuthorId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM books WHERE author_id = ?1;",
            [id],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative book count `{count}`")))
    }
}

/// Builds a `LIKE` pattern matching `term` literally anywhere in a value.
///
/// `%`, `_` and `\` in the term are escaped with `\`.
fn like_contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn load_entry(conn: &Connection, id: BookId) -> RepoResult<Option<CatalogEntry>> {
    let mut stmt = conn.prepare(&format!("{ENTRY_SELECT_SQL} WHERE b.id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_entry_row(row)?));
    }
    Ok(None)
}

fn author_exists_in_tx(tx: &Transaction<'_>, id: AuthorId) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM authors WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<CatalogEntry> {
    let author = parse_author_row(row)?;
    let book = Book {
        id: row.get("book_id")?,
        isbn: row.get("isbn")?,
        title: row.get("title")?,
        publication_year: row.get("publication_year")?,
        author_id: author.id,
    };
    Ok(CatalogEntry { book, author })
}

fn parse_author_row(row: &Row<'_>) -> RepoResult<Author> {
    let birth_text: String = row.get("birth_date")?;
    let birth_date = parse_db_date(&birth_text, "authors.birth_date")?;
    let date_of_death = match row.get::<_, Option<String>>("date_of_death")? {
        Some(text) => Some(parse_db_date(&text, "authors.date_of_death")?),
        None => None,
    };

    Ok(Author {
        id: row.get("author_id")?,
        name: row.get("author_name")?,
        birth_date,
        date_of_death,
    })
}

fn date_to_db(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_db_date(value: &str, column: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| RepoError::InvalidData(format!("invalid date `{value}` in {column}")))
}

fn ensure_catalog_connection_ready(conn: &Connection) -> RepoResult<()> {
    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
