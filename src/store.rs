// 🗄️ Record Store - authoritative collection of books
//
// `BookStore` is the contract; `MemoryStore` keeps everything in a Vec,
// `db::SqliteStore` persists to a file. Searches and stats are linear scans
// over `list()`, shared by every backend.

use crate::book::{Book, BookId, BookPatch, NewBook};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::RwLock;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("book not found: {0}")]
    NotFound(BookId),

    #[error("store lock poisoned")]
    LockPoisoned,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

// ============================================================================
// SEARCH FIELD
// ============================================================================

/// Fields that support substring search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Author,
    Category,
}

impl SearchField {
    pub fn name(&self) -> &'static str {
        match self {
            SearchField::Title => "titulo",
            SearchField::Author => "autor",
            SearchField::Category => "categoria",
        }
    }

    pub fn value_of<'a>(&self, book: &'a Book) -> Option<&'a str> {
        match self {
            SearchField::Title => Some(book.title.as_str()),
            SearchField::Author => Some(book.author.as_str()),
            SearchField::Category => book.category.as_deref(),
        }
    }

    /// Case-insensitive substring match
    pub fn matches(&self, book: &Book, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.value_of(book)
            .map(|value| value.to_lowercase().contains(&needle))
            .unwrap_or(false)
    }
}

impl std::str::FromStr for SearchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" | "titulo" => Ok(SearchField::Title),
            "author" | "autor" => Ok(SearchField::Author),
            "category" | "categoria" => Ok(SearchField::Category),
            other => Err(format!("unknown search field: {}", other)),
        }
    }
}

// ============================================================================
// STATS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_livros: usize,
    pub total_categorias: usize,
    pub total_autores: usize,
    pub categorias: Vec<String>,
    pub autores: Vec<String>,
}

impl CatalogStats {
    /// Distinct lists are sorted; books without a category don't count one
    pub fn from_books(books: &[Book]) -> Self {
        let categories: BTreeSet<&str> = books
            .iter()
            .filter_map(|b| b.category.as_deref())
            .filter(|c| !c.is_empty())
            .collect();

        let authors: BTreeSet<&str> = books
            .iter()
            .map(|b| b.author.as_str())
            .filter(|a| !a.is_empty())
            .collect();

        CatalogStats {
            total_livros: books.len(),
            total_categorias: categories.len(),
            total_autores: authors.len(),
            categorias: categories.into_iter().map(String::from).collect(),
            autores: authors.into_iter().map(String::from).collect(),
        }
    }
}

// ============================================================================
// STORE CONTRACT
// ============================================================================

pub trait BookStore: Send + Sync {
    /// All books in insertion order
    fn list(&self) -> StoreResult<Vec<Book>>;

    fn get(&self, id: BookId) -> StoreResult<Book>;

    /// Assigns the next identifier and returns the stored record
    fn insert(&self, book: NewBook) -> StoreResult<Book>;

    /// Merges supplied fields; identifier unchanged
    fn update(&self, id: BookId, patch: &BookPatch) -> StoreResult<Book>;

    /// Removes and returns the book
    fn delete(&self, id: BookId) -> StoreResult<Book>;

    fn filter_by_field(&self, field: SearchField, term: &str) -> StoreResult<Vec<Book>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|book| field.matches(book, term))
            .collect())
    }

    fn stats(&self) -> StoreResult<CatalogStats> {
        Ok(CatalogStats::from_books(&self.list()?))
    }

    fn count(&self) -> StoreResult<usize> {
        Ok(self.list()?.len())
    }
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

struct MemoryState {
    books: Vec<Book>,
    /// Next identifier to hand out (starts at 1, only grows)
    next_id: BookId,
}

/// Vec-backed store; every mutation happens under the single write lock
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            state: RwLock::new(MemoryState {
                books: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Build a store pre-loaded with `books`, ids assigned in order
    pub fn with_books(books: Vec<NewBook>) -> StoreResult<Self> {
        let store = MemoryStore::new();
        for book in books {
            store.insert(book)?;
        }
        Ok(store)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BookStore for MemoryStore {
    fn list(&self) -> StoreResult<Vec<Book>> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.books.clone())
    }

    fn get(&self, id: BookId) -> StoreResult<Book> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        state
            .books
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn insert(&self, book: NewBook) -> StoreResult<Book> {
        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;
        let id = state.next_id;
        state.next_id += 1;

        let book = book.into_book(id);
        state.books.push(book.clone());
        Ok(book)
    }

    fn update(&self, id: BookId, patch: &BookPatch) -> StoreResult<Book> {
        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;
        let book = state
            .books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(StoreError::NotFound(id))?;

        patch.apply_to(book);
        Ok(book.clone())
    }

    fn delete(&self, id: BookId) -> StoreResult<Book> {
        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;
        let index = state
            .books
            .iter()
            .position(|b| b.id == id)
            .ok_or(StoreError::NotFound(id))?;

        Ok(state.books.remove(index))
    }

    fn count(&self) -> StoreResult<usize> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.books.len())
    }
}

// ============================================================================
// TESTS
// ============================================================================
