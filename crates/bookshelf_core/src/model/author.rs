//! Author domain model.
//!
//! # Invariants
//! - `id` is assigned by storage on insert.
//! - `date_of_death`, when known, is a calendar date like `birth_date`.
//! - Authors are never updated; they disappear when their last book goes.

use chrono::NaiveDate;
use serde::Serialize;

/// Storage-assigned author identifier (SQLite rowid).
pub type AuthorId = i64;

/// Persisted author record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    pub birth_date: NaiveDate,
    /// `None` when the death date is unknown or the author is alive.
    pub date_of_death: Option<NaiveDate>,
}

/// Insert payload for a new author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub name: String,
    pub birth_date: NaiveDate,
    pub date_of_death: Option<NaiveDate>,
}

impl NewAuthor {
    pub fn new(
        name: impl Into<String>,
        birth_date: NaiveDate,
        date_of_death: Option<NaiveDate>,
    ) -> Self {
        Self {
            name: name.into(),
            birth_date,
            date_of_death,
        }
    }

    /// Materializes the persisted record once storage has assigned `id`.
    pub fn into_author(self, id: AuthorId) -> Author {
        Author {
            id,
            name: self.name,
            birth_date: self.birth_date,
            date_of_death: self.date_of_death,
        }
    }
}
