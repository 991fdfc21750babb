//! Bookshelf command-line front end.
//!
//! # Responsibility
//! - Parse configuration and subcommands.
//! - Build the catalog store explicitly and hand it to the service.
//! - Translate every outcome into a notice and a process exit code.

use bookshelf_core::{default_log_level, init_logging};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod notice;

use commands::CliError;

#[derive(Debug, Parser)]
#[command(name = "bookshelf", version)]
#[command(about = "Personal library catalog of authors and books", long_about = None)]
struct Cli {
    /// SQLite catalog file
    #[arg(
        long,
        global = true,
        env = "BOOKSHELF_DB",
        default_value = "data/library.sqlite"
    )]
    db: PathBuf,
    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = "BOOKSHELF_LOG_LEVEL")]
    log_level: Option<String>,
    /// Directory for rolling log files; logging is off when unset
    #[arg(long, global = true, env = "BOOKSHELF_LOG_DIR")]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create the catalog tables if they do not exist
    Init,
    /// List books, optionally filtered by title
    List(commands::ListArgs),
    /// Record a new author
    AddAuthor(commands::AddAuthorArgs),
    /// Record a new book for an existing author
    AddBook(commands::AddBookArgs),
    /// List authors available for new books
    Authors(commands::AuthorsArgs),
    /// Delete a book, and its author if no other books remain
    Delete(commands::DeleteArgs),
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = setup_logging(&cli) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Init => commands::init(&cli.db),
        Commands::List(args) => commands::list(&cli.db, args),
        Commands::AddAuthor(args) => commands::add_author(&cli.db, args),
        Commands::AddBook(args) => commands::add_book(&cli.db, args),
        Commands::Authors(args) => commands::authors(&cli.db, args),
        Commands::Delete(args) => commands::delete(&cli.db, args),
    };

    if let Err(err) = result {
        eprintln!("{}", err.notice());
        std::process::exit(err.exit_code());
    }
}

fn setup_logging(cli: &Cli) -> Result<(), CliError> {
    let Some(log_dir) = cli.log_dir.as_ref() else {
        return Ok(());
    };
    let log_dir = if log_dir.is_absolute() {
        log_dir.clone()
    } else {
        std::env::current_dir()?.join(log_dir)
    };
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    init_logging(level, log_dir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands};
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn add_author_fields_default_to_empty() {
        let cli = Cli::try_parse_from(["bookshelf", "add-author", "--name", "Tolkien"]).unwrap();
        match cli.command {
            Commands::AddAuthor(args) => {
                assert_eq!(args.name, "Tolkien");
                assert!(args.birth_date.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn delete_requires_numeric_book_id() {
        assert!(Cli::try_parse_from(["bookshelf", "delete", "abc"]).is_err());
        assert!(Cli::try_parse_from(["bookshelf", "--db", "x.sqlite", "delete", "3"]).is_ok());
    }
}
