//! Core domain logic for the Bookshelf catalog.
//! This crate owns the author/book invariants; callers only format results.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::author::{Author, AuthorId, NewAuthor};
pub use model::book::{Book, BookId, CatalogEntry, NewBook, SortKey};
pub use repo::catalog_repo::{
    BookDeletion, CatalogRepository, RepoError, RepoResult, SqliteCatalogRepository,
};
pub use service::catalog_service::{
    BookListing, BookRemoval, CatalogService, CatalogServiceError, ServiceResult, ValidationError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
