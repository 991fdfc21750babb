//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for the catalog.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`BookNotFound`,
//!   `AuthorNotFound`) in addition to DB transport errors.
//! - Multi-statement writes run inside one transaction.

pub mod catalog_repo;
