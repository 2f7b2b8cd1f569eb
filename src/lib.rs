// Book Catalog - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod book;
pub mod store;
pub mod db;
pub mod service;
pub mod config;
pub mod logging;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use book::{
    Book, BookId, BookPatch, NewBook, ValidationError, ValidationResult,
};
pub use store::{
    BookStore, CatalogStats, MemoryStore, SearchField, StoreError, StoreResult,
};
pub use db::{import_books, load_csv, setup_database, ImportReport, SqliteStore};
pub use service::{
    BookService, Envelope, ServiceError, ServiceResult, Success,
};
pub use config::ServerConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
