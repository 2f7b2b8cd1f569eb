// SQLite persistence for the catalog + CSV import

use crate::book::{Book, BookId, BookPatch, NewBook};
use crate::service::{BookService, ServiceError};
use crate::store::{BookStore, StoreError, StoreResult};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const BOOK_COLUMNS: &str = "id, title, author, isbn, publication_year, price, registered_on, \
                            description, category, publisher, page_count";

pub fn setup_database(conn: &Connection) -> rusqlite::Result<()> {
    // AUTOINCREMENT keeps ids from ever being reused after a delete
    conn.execute(
        "CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            isbn TEXT,
            publication_year INTEGER,
            price REAL,
            registered_on TEXT NOT NULL,
            description TEXT,
            category TEXT,
            publisher TEXT,
            page_count INTEGER,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_books_category ON books(category)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_books_author ON books(author)",
        [],
    )?;

    Ok(())
}

fn row_to_book(row: &Row) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        isbn: row.get(3)?,
        publication_year: row.get(4)?,
        price: row.get(5)?,
        registered_on: row.get(6)?,
        description: row.get(7)?,
        category: row.get(8)?,
        publisher: row.get(9)?,
        page_count: row.get(10)?,
    })
}

fn find_book(conn: &Connection, id: BookId) -> StoreResult<Book> {
    conn.query_row(
        &format!("SELECT {} FROM books WHERE id = ?1", BOOK_COLUMNS),
        params![id],
        row_to_book,
    )
    .optional()?
    .ok_or(StoreError::NotFound(id))
}

// ============================================================================
// SQLITE STORE
// ============================================================================

/// File-backed `BookStore`; one connection behind a mutex
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file in WAL mode
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        tracing::debug!(path = %path.display(), journal_mode = %mode, "opened book database");
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        setup_database(&conn)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl BookStore for SqliteStore {
    fn list(&self) -> StoreResult<Vec<Book>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM books ORDER BY id", BOOK_COLUMNS))?;
        let books = stmt
            .query_map([], row_to_book)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(books)
    }

    fn get(&self, id: BookId) -> StoreResult<Book> {
        let conn = self.conn()?;
        find_book(&conn, id)
    }

    fn insert(&self, book: NewBook) -> StoreResult<Book> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO books (
                title, author, isbn, publication_year, price, registered_on,
                description, category, publisher, page_count
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                book.title,
                book.author,
                book.isbn,
                book.publication_year,
                book.price,
                book.registered_on,
                book.description,
                book.category,
                book.publisher,
                book.page_count,
            ],
        )?;

        Ok(book.into_book(conn.last_insert_rowid()))
    }

    fn update(&self, id: BookId, patch: &BookPatch) -> StoreResult<Book> {
        let conn = self.conn()?;
        let mut book = find_book(&conn, id)?;
        patch.apply_to(&mut book);

        conn.execute(
            "UPDATE books SET
                title = ?2, author = ?3, isbn = ?4, publication_year = ?5, price = ?6,
                registered_on = ?7, description = ?8, category = ?9, publisher = ?10,
                page_count = ?11
            WHERE id = ?1",
            params![
                id,
                book.title,
                book.author,
                book.isbn,
                book.publication_year,
                book.price,
                book.registered_on,
                book.description,
                book.category,
                book.publisher,
                book.page_count,
            ],
        )?;

        Ok(book)
    }

    fn delete(&self, id: BookId) -> StoreResult<Book> {
        let conn = self.conn()?;
        let book = find_book(&conn, id)?;
        conn.execute("DELETE FROM books WHERE id = ?1", params![id])?;
        Ok(book)
    }

    fn count(&self) -> StoreResult<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

// ============================================================================
// CSV IMPORT
// ============================================================================

/// Read create requests from a CSV whose headers use the API field names
/// (`titulo`, `autor`, `data_cadastro`, ...). Rows are not validated here.
pub fn load_csv(csv_path: &Path) -> Result<Vec<NewBook>> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;

    let mut books = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        let book: NewBook =
            result.with_context(|| format!("Failed to deserialize book on row {}", line + 1))?;
        books.push(book);
    }

    Ok(books)
}

/// Outcome of a CSV import
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub inserted: usize,
    /// (1-based row, validation message)
    pub rejected: Vec<(usize, String)>,
}

/// Create every CSV row through `service`, so rows get the same validation as
/// the API. Invalid rows are skipped and reported; any other failure aborts.
pub fn import_books(service: &BookService, csv_path: &Path) -> Result<ImportReport> {
    let books = load_csv(csv_path)?;
    tracing::info!(rows = books.len(), path = %csv_path.display(), "importing books");

    let mut report = ImportReport::default();
    for (index, book) in books.into_iter().enumerate() {
        let row = index + 1;
        match service.create(book) {
            Ok(created) => {
                report.inserted += 1;
                tracing::debug!(id = created.data.id, row, "imported row");
            }
            Err(ServiceError::Validation(reason)) => {
                tracing::warn!(row, %reason, "row rejected");
                report.rejected.push((row, reason));
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to import row {}", row)),
        }
    }

    Ok(report)
}

// ============================================================================
// TESTS
// ============================================================================
