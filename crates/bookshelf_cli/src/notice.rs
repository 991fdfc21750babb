//! User-facing one-line notices for catalog outcomes.
//!
//! Wording mirrors the flash messages of the web front end so scripted
//! callers see the same text.

use bookshelf_core::{BookRemoval, CatalogServiceError, ValidationError};

pub fn author_added(name: &str) -> String {
    format!("Author {name} added successfully")
}

pub fn book_added(title: &str) -> String {
    format!("Book {title} added successfully")
}

pub fn no_results(search_term: &str) -> String {
    format!("No books found matching '{search_term}'. Showing all books.")
}

pub fn book_deleted(removal: &BookRemoval) -> String {
    let mut message = format!("Book '{}' deleted successfully.", removal.book.title);
    if let Some(author) = &removal.removed_author {
        message.push_str(&format!(
            " Author '{}' was also deleted as they had no other books.",
            author.name
        ));
    }
    message
}

/// Notice for errors the user can correct; storage failures are not
/// translated and keep their diagnostic text.
pub fn error_notice(err: &CatalogServiceError) -> String {
    match err {
        CatalogServiceError::Validation(validation) => match validation {
            ValidationError::MissingField(_) => "All fields are mandatory.".to_string(),
            ValidationError::InvalidDate { field, .. } => {
                format!("{} must use the YYYY-MM-DD format.", field_label(field))
            }
            ValidationError::InvalidInteger { field, .. } => {
                format!("{} must be a whole number.", field_label(field))
            }
        },
        CatalogServiceError::BookNotFound(_) => "Book not found.".to_string(),
        CatalogServiceError::AuthorNotFound(_) => "Author not found.".to_string(),
        other => other.to_string(),
    }
}

fn field_label(field: &str) -> &'static str {
    match field {
        "birth_date" => "Birth date",
        "date_of_death" => "Date of death",
        "publication_year" => "Publication year",
        "author_id" => "Author id",
        _ => "Field",
    }
}
