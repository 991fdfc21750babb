//! Catalog use-case service.
//!
//! # Responsibility
//! - Turn raw form-style text input into validated author/book records.
//! - Provide the listing use-case with its empty-search fallback.
//! - Report cascading deletes so callers can compose status notices.
//!
//! # Invariants
//! - Validation failures never touch storage.
//! - A non-empty search with no hits yields the full title-sorted catalog
//!   with `fallback = true`, never an empty listing.
//! - The service only talks to storage through `CatalogRepository`.

use crate::model::author::{Author, AuthorId, NewAuthor};
use crate::model::book::{Book, BookId, CatalogEntry, NewBook, SortKey};
use crate::repo::catalog_repo::{BookDeletion, CatalogRepository, RepoError};
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// User-correctable input problem. Storage is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field was absent or blank.
    MissingField(&'static str),
    /// Date field is not `YYYY-MM-DD`.
    InvalidDate { field: &'static str, value: String },
    /// Numeric field is not a valid integer.
    InvalidInteger { field: &'static str, value: String },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field `{field}`"),
            Self::InvalidDate { field, value } => {
                write!(f, "field `{field}` must be a YYYY-MM-DD date, got `{value}`")
            }
            Self::InvalidInteger { field, value } => {
                write!(f, "field `{field}` must be an integer, got `{value}`")
            }
        }
    }
}

impl ValidationError {
    /// Stable reason code for log events; never includes input text.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::InvalidDate { .. } => "invalid_date",
            Self::InvalidInteger { .. } => "invalid_integer",
        }
    }

    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField(field)
            | Self::InvalidDate { field, .. }
            | Self::InvalidInteger { field, .. } => *field,
        }
    }
}

impl Error for ValidationError {}

/// Service error for catalog use-cases.
#[derive(Debug)]
pub enum CatalogServiceError {
    Validation(ValidationError),
    /// Target book does not exist.
    BookNotFound(BookId),
    /// Referenced author does not exist.
    AuthorNotFound(AuthorId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl CatalogServiceError {
    /// Returns `true` for errors the caller can fix by changing input.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::BookNotFound(_) | Self::AuthorNotFound(_)
        )
    }
}

impl Display for CatalogServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::BookNotFound(id) => write!(f, "book not found: {id}"),
            Self::AuthorNotFound(id) => write!(f, "author not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent catalog state: {details}"),
        }
    }
}

impl Error for CatalogServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for CatalogServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for CatalogServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::BookNotFound(id) => Self::BookNotFound(id),
            RepoError::AuthorNotFound(id) => Self::AuthorNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, CatalogServiceError>;

/// Listing result envelope for the search/sort use-case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookListing {
    pub entries: Vec<CatalogEntry>,
    /// Order actually applied; `Title` whenever `fallback` is set.
    pub sort: SortKey,
    /// Normalized search term, `None` when absent or blank.
    pub search_term: Option<String>,
    /// The search matched nothing and `entries` holds the full catalog.
    pub fallback: bool,
}

/// Outcome of removing one book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRemoval {
    pub book: Book,
    pub removed_author: Option<Author>,
}

impl BookRemoval {
    pub fn author_removed(&self) -> bool {
        self.removed_author.is_some()
    }
}

impl From<BookDeletion> for BookRemoval {
    fn from(value: BookDeletion) -> Self {
        Self {
            book: value.book,
            removed_author: value.removed_author,
        }
    }
}

/// Catalog service facade over an injected repository.
pub struct CatalogService<R: CatalogRepository> {
    repo: R,
}

impl<R: CatalogRepository> CatalogService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates form-style author input and persists a new author.
    ///
    /// All three fields are mandatory. Dates must be `YYYY-MM-DD`.
    pub fn add_author(
        &self,
        name: &str,
        birth_date: &str,
        date_of_death: &str,
    ) -> ServiceResult<Author> {
        let new_author = match validate_author(name, birth_date, date_of_death) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "event=author_add module=service status=rejected reason={} field={}",
                    err.code(),
                    err.field()
                );
                return Err(err.into());
            }
        };

        let id = self.repo.insert_author(&new_author)?;
        info!("event=author_add module=service status=ok author_id={id}");
        Ok(new_author.into_author(id))
    }

    /// Validates form-style book input and persists a new book.
    ///
    /// Returns `AuthorNotFound` when `author_id` does not reference a stored
    /// author.
    pub fn add_book(
        &self,
        isbn: &str,
        title: &str,
        publication_year: &str,
        author_id: &str,
    ) -> ServiceResult<CatalogEntry> {
        let new_book = match validate_book(isbn, title, publication_year, author_id) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "event=book_add module=service status=rejected reason={} field={}",
                    err.code(),
                    err.field()
                );
                return Err(err.into());
            }
        };

        let id = match self.repo.insert_book(&new_book) {
            Ok(id) => id,
            Err(RepoError::AuthorNotFound(author_id)) => {
                warn!(
                    "event=book_add module=service status=rejected reason=author_not_found author_id={author_id}"
                );
                return Err(CatalogServiceError::AuthorNotFound(author_id));
            }
            Err(err) => return Err(err.into()),
        };
        info!(
            "event=book_add module=service status=ok book_id={id} author_id={}",
            new_book.author_id
        );

        self.repo
            .get_book(id)?
            .ok_or(CatalogServiceError::InconsistentState(
                "created book not found in read-back",
            ))
    }

    /// Lists books, optionally filtered by title substring and sorted.
    ///
    /// `sort_by` accepts `title|author`; absent or unknown keys sort by
    /// title. A blank `search_term` is treated as absent.
    pub fn search_and_sort(
        &self,
        search_term: Option<&str>,
        sort_by: Option<&str>,
    ) -> ServiceResult<BookListing> {
        let sort = match sort_by.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => SortKey::parse(value).unwrap_or_else(|| {
                warn!("event=book_list module=service status=sort_defaulted sort=title");
                SortKey::default()
            }),
            None => SortKey::default(),
        };
        let search_term = search_term
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        let entries = self.repo.find_books(search_term.as_deref(), sort)?;
        if search_term.is_some() && entries.is_empty() {
            let entries = self.repo.find_books(None, SortKey::Title)?;
            info!(
                "event=book_list module=service status=fallback sort=title count={}",
                entries.len()
            );
            return Ok(BookListing {
                entries,
                sort: SortKey::Title,
                search_term,
                fallback: true,
            });
        }

        info!(
            "event=book_list module=service status=ok sort={} filtered={} count={}",
            sort,
            search_term.is_some(),
            entries.len()
        );
        Ok(BookListing {
            entries,
            sort,
            search_term,
            fallback: false,
        })
    }

    /// Deletes a book and, atomically, its author when no books remain.
    pub fn remove_book(&self, book_id: BookId) -> ServiceResult<BookRemoval> {
        let removal = BookRemoval::from(self.repo.delete_book(book_id)?);
        info!(
            "event=book_delete module=service status=ok book_id={} author_removed={}",
            book_id,
            removal.author_removed()
        );
        Ok(removal)
    }

    /// Lists all authors, e.g. to populate an author picker.
    pub fn list_authors(&self) -> ServiceResult<Vec<Author>> {
        Ok(self.repo.list_authors()?)
    }

    /// Gets one book joined with its author.
    pub fn get_book(&self, book_id: BookId) -> ServiceResult<Option<CatalogEntry>> {
        Ok(self.repo.get_book(book_id)?)
    }
}

fn validate_author(
    name: &str,
    birth_date: &str,
    date_of_death: &str,
) -> Result<NewAuthor, ValidationError> {
    let name = required("name", name)?;
    let birth_text = required("birth_date", birth_date)?;
    let death_text = required("date_of_death", date_of_death)?;

    let birth_date = parse_input_date("birth_date", birth_text)?;
    let date_of_death = parse_input_date("date_of_death", death_text)?;

    Ok(NewAuthor::new(name, birth_date, Some(date_of_death)))
}

fn validate_book(
    isbn: &str,
    title: &str,
    publication_year: &str,
    author_id: &str,
) -> Result<NewBook, ValidationError> {
    let isbn = required("isbn", isbn)?;
    let title = required("title", title)?;
    let year_text = required("publication_year", publication_year)?;
    let author_text = required("author_id", author_id)?;

    let year = year_text
        .parse::<i32>()
        .map_err(|_| ValidationError::InvalidInteger {
            field: "publication_year",
            value: year_text.to_string(),
        })?;
    let author_id = author_text
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidInteger {
            field: "author_id",
            value: author_text.to_string(),
        })?;

    Ok(NewBook::new(isbn, title, year, author_id))
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed)
}

fn parse_input_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, INPUT_DATE_FORMAT).map_err(|_| {
        ValidationError::InvalidDate {
            field,
            value: value.to_string(),
        }
    })
}
