//! Catalog domain model.
//!
//! # Responsibility
//! - Define the author/book records persisted by the catalog store.
//! - Define the joined read model returned by book listings.
//!
//! # Invariants
//! - Every `Book` references exactly one `Author`.
//! - Identifiers are assigned by storage and never reused.

pub mod author;
pub mod book;
