//! Subcommand handlers.
//!
//! Each handler opens the catalog, runs one service call and prints the
//! result. User-correctable failures become notices with exit code 2.

use crate::notice;
use bookshelf_core::db::{open_db, DbError};
use bookshelf_core::{
    BookId, CatalogEntry, CatalogService, CatalogServiceError, LoggingError, RepoError,
    SqliteCatalogRepository,
};
use clap::Args;
use log::error;
use rusqlite::Connection;
use serde_json::json;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

const EXIT_FAILURE: i32 = 1;
const EXIT_USER_ERROR: i32 = 2;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// title|author
    #[arg(long)]
    pub sort_by: Option<String>,
    /// Case-insensitive title substring
    #[arg(long = "search")]
    pub search_term: Option<String>,
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct AddAuthorArgs {
    #[arg(long, default_value = "")]
    pub name: String,
    /// YYYY-MM-DD
    #[arg(long, default_value = "")]
    pub birth_date: String,
    /// YYYY-MM-DD
    #[arg(long, default_value = "")]
    pub date_of_death: String,
}

#[derive(Debug, Args)]
pub struct AddBookArgs {
    #[arg(long, default_value = "")]
    pub isbn: String,
    #[arg(long, default_value = "")]
    pub title: String,
    #[arg(long, default_value = "")]
    pub publication_year: String,
    #[arg(long, default_value = "")]
    pub author_id: String,
}

#[derive(Debug, Args)]
pub struct AuthorsArgs {
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub book_id: BookId,
}

#[derive(Debug)]
pub enum CliError {
    Logging(LoggingError),
    Db(DbError),
    Service(CatalogServiceError),
    Output(serde_json::Error),
    Io(std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Service(err) if err.is_user_error() => EXIT_USER_ERROR,
            _ => EXIT_FAILURE,
        }
    }

    /// Line printed to stderr before exiting.
    pub fn notice(&self) -> String {
        match self {
            Self::Service(err) if err.is_user_error() => notice::error_notice(err),
            other => format!("Error: {other}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "failed to open catalog: {err}"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Output(err) => write!(f, "failed to encode output: {err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Service(err) => Some(err),
            Self::Output(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<CatalogServiceError> for CliError {
    fn from(value: CatalogServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Service(value.into())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Output(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

pub fn init(db_path: &Path) -> Result<(), CliError> {
    open_catalog(db_path)?;
    println!("Database tables created or already exist.");
    Ok(())
}

pub fn list(db_path: &Path, args: ListArgs) -> Result<(), CliError> {
    let conn = open_catalog(db_path)?;
    let service = catalog_service(&conn)?;
    let listing = service.search_and_sort(args.search_term.as_deref(), args.sort_by.as_deref())?;

    if args.json {
        let body = json!({
            "sort_by": listing.sort,
            "search_term": listing.search_term,
            "fallback": listing.fallback,
            "books": listing.entries,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    if listing.fallback {
        if let Some(term) = listing.search_term.as_deref() {
            println!("{}", notice::no_results(term));
        }
    }
    if listing.entries.is_empty() {
        println!("The catalog is empty.");
    }
    for entry in &listing.entries {
        println!("{}", format_entry(entry));
    }
    Ok(())
}

pub fn add_author(db_path: &Path, args: AddAuthorArgs) -> Result<(), CliError> {
    let conn = open_catalog(db_path)?;
    let service = catalog_service(&conn)?;
    let author = service.add_author(&args.name, &args.birth_date, &args.date_of_death)?;
    println!("{}", notice::author_added(&author.name));
    Ok(())
}

pub fn add_book(db_path: &Path, args: AddBookArgs) -> Result<(), CliError> {
    let conn = open_catalog(db_path)?;
    let service = catalog_service(&conn)?;
    let entry = service.add_book(
        &args.isbn,
        &args.title,
        &args.publication_year,
        &args.author_id,
    )?;
    println!("{}", notice::book_added(&entry.book.title));
    Ok(())
}

pub fn authors(db_path: &Path, args: AuthorsArgs) -> Result<(), CliError> {
    let conn = open_catalog(db_path)?;
    let service = catalog_service(&conn)?;
    let authors = service.list_authors()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&authors)?);
        return Ok(());
    }
    for author in &authors {
        let died = author
            .date_of_death
            .map(|date| date.to_string())
            .unwrap_or_default();
        println!(
            "{:>4}  {}  ({}..{})",
            author.id, author.name, author.birth_date, died
        );
    }
    Ok(())
}

pub fn delete(db_path: &Path, args: DeleteArgs) -> Result<(), CliError> {
    let conn = open_catalog(db_path)?;
    let service = catalog_service(&conn)?;
    let removal = service.remove_book(args.book_id)?;
    println!("{}", notice::book_deleted(&removal));
    Ok(())
}

fn open_catalog(db_path: &Path) -> Result<Connection, CliError> {
    open_db(db_path).map_err(|err| {
        error!("event=catalog_open module=cli status=error error={err}");
        CliError::from(err)
    })
}

fn catalog_service(
    conn: &Connection,
) -> Result<CatalogService<SqliteCatalogRepository<'_>>, CliError> {
    let repo = SqliteCatalogRepository::try_new(conn)?;
    Ok(CatalogService::new(repo))
}

fn format_entry(entry: &CatalogEntry) -> String {
    format!(
        "{:>4}  {} ({}) by {}  [ISBN {}]",
        entry.book.id,
        entry.book.title,
        entry.book.publication_year,
        entry.author.name,
        entry.book.isbn
    )
}
