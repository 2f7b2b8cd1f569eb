// Book Catalog - command-line maintenance tool
// Works directly on the SQLite file the server can be pointed at.

use anyhow::Result;
use book_catalog::logging::init_tracing;
use book_catalog::{import_books, Book, BookService, SearchField, SqliteStore};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "book-catalog")]
#[command(about = "Manage the book catalog database")]
#[command(version)]
struct Cli {
    /// SQLite database file
    #[arg(short, long, env = "DATABASE_PATH", default_value = "books.db")]
    database: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import books from a CSV file (headers: titulo, autor, data_cadastro, ...)
    Import { csv: PathBuf },

    /// List every book
    List,

    /// Show catalog statistics
    Stats,

    /// Search by title, author or category
    Search {
        /// title | author | category
        field: SearchField,
        term: String,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let store = SqliteStore::open(&cli.database)?;
    let service = BookService::new(Arc::new(store));

    match cli.command {
        Command::Import { csv } => run_import(&service, &csv)?,
        Command::List => print_books(&service.list_all()?.data),
        Command::Stats => {
            let stats = service.stats()?.data;
            println!("Books:      {}", stats.total_livros);
            println!("Categories: {} {:?}", stats.total_categorias, stats.categorias);
            println!("Authors:    {} {:?}", stats.total_autores, stats.autores);
        }
        Command::Search { field, term } => print_books(&service.search(field, &term)?.data),
    }

    Ok(())
}

fn run_import(service: &BookService, csv: &Path) -> Result<()> {
    let report = import_books(service, csv)?;

    for (row, reason) in &report.rejected {
        eprintln!("Row {} rejected: {}", row, reason);
    }
    println!("Inserted: {} books", report.inserted);
    println!("Rejected: {} rows", report.rejected.len());
    Ok(())
}

fn print_books(books: &[Book]) {
    for book in books {
        println!(
            "#{:<4} {} - {} [{}]",
            book.id,
            book.title,
            book.author,
            book.category.as_deref().unwrap_or("-")
        );
    }
    println!("{} book(s)", books.len());
}
