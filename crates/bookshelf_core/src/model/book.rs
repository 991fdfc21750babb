//! Book domain model and listing types.
//!
//! # Invariants
//! - `author_id` always points at an existing author.
//! - Listings default to title order.

use crate::model::author::{Author, AuthorId};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Storage-assigned book identifier (SQLite rowid).
pub type BookId = i64;

/// Persisted book record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    pub id: BookId,
    pub isbn: String,
    pub title: String,
    pub publication_year: i32,
    pub author_id: AuthorId,
}

/// Insert payload for a new book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub isbn: String,
    pub title: String,
    pub publication_year: i32,
    pub author_id: AuthorId,
}

impl NewBook {
    pub fn new(
        isbn: impl Into<String>,
        title: impl Into<String>,
        publication_year: i32,
        author_id: AuthorId,
    ) -> Self {
        Self {
            isbn: isbn.into(),
            title: title.into(),
            publication_year,
            author_id,
        }
    }

    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            isbn: self.isbn,
            title: self.title,
            publication_year: self.publication_year,
            author_id: self.author_id,
        }
    }
}

/// Book joined with its author, as shown in catalog listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub book: Book,
    pub author: Author,
}

/// Listing order for catalog queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Order by `books.title`.
    #[default]
    Title,
    /// Order by `authors.name`.
    Author,
}

impl SortKey {
    /// Parses `title|author` case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "title" => Some(Self::Title),
            "author" => Some(Self::Author),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::SortKey;

    #[test]
    fn sort_key_parse_accepts_known_values() {
        assert_eq!(SortKey::parse("title"), Some(SortKey::Title));
        assert_eq!(SortKey::parse(" AUTHOR "), Some(SortKey::Author));
        assert_eq!(SortKey::parse("year"), None);
    }

    #[test]
    fn sort_key_defaults_to_title() {
        assert_eq!(SortKey::default(), SortKey::Title);
        assert_eq!(SortKey::default().to_string(), "title");
    }
}
