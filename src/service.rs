// 📖 Book Service - the only business-logic layer
//
// Every use case returns a `ServiceResult<T>`: `Ok(Success<T>)` or a
// `ServiceError` telling the caller which kind of failure happened.
// `Envelope<T>` is the serialized form of either outcome.

use crate::book::{describe, Book, BookId, BookPatch, NewBook};
use crate::store::{BookStore, CatalogStats, MemoryStore, SearchField, StoreError};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

pub const MSG_NOT_FOUND: &str = "Livro não encontrado";
pub const MSG_EMPTY_TERM: &str = "Termo de busca é obrigatório";
pub const MSG_INTERNAL: &str = "Erro interno do servidor";

// ============================================================================
// RESULT TYPES
// ============================================================================

/// Successful outcome of a service call
#[derive(Debug, Clone, PartialEq)]
pub struct Success<T> {
    pub data: T,
    pub message: Option<String>,
    /// Item count for list/search operations
    pub total: Option<usize>,
}

impl<T> Success<T> {
    pub fn new(data: T) -> Self {
        Success {
            data,
            message: None,
            total: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input rejected before any mutation
    #[error("{0}")]
    Validation(String),

    /// Referenced identifier absent from the store
    #[error("{0}")]
    NotFound(String),

    /// Anything else; details stay server-side
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    /// Message safe to hand to a client
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::Validation(msg) | ServiceError::NotFound(msg) => msg.clone(),
            ServiceError::Internal(_) => MSG_INTERNAL.to_string(),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ServiceError::NotFound(MSG_NOT_FOUND.to_string()),
            other => ServiceError::Internal(anyhow::Error::new(other)),
        }
    }
}

pub type ServiceResult<T> = Result<Success<T>, ServiceError>;

// ============================================================================
// ENVELOPE (wire format)
// ============================================================================

/// `{ sucesso, dados?, erro?, mensagem?, total? }`
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    #[serde(rename = "sucesso")]
    pub success: bool,

    #[serde(rename = "dados", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(rename = "erro", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(rename = "mensagem", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl<T> Envelope<T> {
    pub fn ok(success: Success<T>) -> Self {
        Envelope {
            success: true,
            data: Some(success.data),
            error: None,
            message: success.message,
            total: success.total,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Envelope {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
            total: None,
        }
    }
}

impl<T> From<ServiceResult<T>> for Envelope<T> {
    fn from(result: ServiceResult<T>) -> Self {
        match result {
            Ok(success) => Envelope::ok(success),
            Err(err) => Envelope::failure(err.public_message()),
        }
    }
}

// ============================================================================
// SERVICE
// ============================================================================

#[derive(Clone)]
pub struct BookService {
    store: Arc<dyn BookStore>,
}

impl BookService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        BookService { store }
    }

    /// Service over a fresh `MemoryStore`
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn list_all(&self) -> ServiceResult<Vec<Book>> {
        let books = self.store.list()?;
        let total = books.len();
        Ok(Success::new(books).with_total(total))
    }

    pub fn get_by_id(&self, id: BookId) -> ServiceResult<Book> {
        Ok(Success::new(self.store.get(id)?))
    }

    pub fn create(&self, input: NewBook) -> ServiceResult<Book> {
        let input = input.normalized();
        input
            .validate()
            .map_err(|errors| ServiceError::Validation(describe(&errors)))?;

        let book = self.store.insert(input)?;
        tracing::debug!(id = book.id, title = %book.title, "book created");

        Ok(Success::new(book).with_message("Livro cadastrado com sucesso"))
    }

    pub fn update(&self, id: BookId, input: BookPatch) -> ServiceResult<Book> {
        let patch = input.normalized();
        patch
            .validate()
            .map_err(|errors| ServiceError::Validation(describe(&errors)))?;

        let book = self.store.update(id, &patch)?;
        tracing::debug!(id, "book updated");

        Ok(Success::new(book).with_message("Livro atualizado com sucesso"))
    }

    /// Returns the removed record
    pub fn delete(&self, id: BookId) -> ServiceResult<Book> {
        let book = self.store.delete(id)?;
        tracing::debug!(id, "book deleted");

        Ok(Success::new(book).with_message("Livro removido com sucesso"))
    }

    pub fn search(&self, field: SearchField, term: &str) -> ServiceResult<Vec<Book>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(ServiceError::Validation(MSG_EMPTY_TERM.to_string()));
        }

        let books = self.store.filter_by_field(field, term)?;
        let total = books.len();
        tracing::debug!(field = field.name(), term, total, "book search");
        Ok(Success::new(books).with_total(total))
    }

    pub fn search_by_category(&self, term: &str) -> ServiceResult<Vec<Book>> {
        self.search(SearchField::Category, term)
    }

    pub fn search_by_author(&self, term: &str) -> ServiceResult<Vec<Book>> {
        self.search(SearchField::Author, term)
    }

    pub fn search_by_title(&self, term: &str) -> ServiceResult<Vec<Book>> {
        self.search(SearchField::Title, term)
    }

    pub fn stats(&self) -> ServiceResult<CatalogStats> {
        Ok(Success::new(self.store.stats()?))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::current_year;
    use crate::store::StoreResult;

    fn service() -> BookService {
        BookService::in_memory()
    }

    fn with_category(title: &str, category: &str) -> NewBook {
        let mut book = NewBook::new(title, "Autor", "2024-01-15");
        book.category = Some(category.to_string());
        book
    }

    /// Store whose every call fails with a non-not-found error
    struct BrokenStore;

    impl BookStore for BrokenStore {
        fn list(&self) -> StoreResult<Vec<Book>> {
            Err(StoreError::LockPoisoned)
        }
        fn get(&self, _id: BookId) -> StoreResult<Book> {
            Err(StoreError::LockPoisoned)
        }
        fn insert(&self, _book: NewBook) -> StoreResult<Book> {
            Err(StoreError::LockPoisoned)
        }
        fn update(&self, _id: BookId, _patch: &BookPatch) -> StoreResult<Book> {
            Err(StoreError::LockPoisoned)
        }
        fn delete(&self, _id: BookId) -> StoreResult<Book> {
            Err(StoreError::LockPoisoned)
        }
    }

    #[test]
    fn test_create_minimal_book() {
        let service = service();
        let created = service
            .create(NewBook::new("Dune", "Frank Herbert", "2024-01-15"))
            .unwrap();

        assert_eq!(created.data.title, "Dune");
        assert_eq!(created.data.author, "Frank Herbert");
        assert_eq!(created.data.registered_on, "2024-01-15");
        assert_eq!(created.data.id, 1);
        assert_eq!(created.message.as_deref(), Some("Livro cadastrado com sucesso"));
    }

    #[test]
    fn test_create_assigns_unused_ids() {
        let service = service();
        let a = service.create(NewBook::new("A", "x", "2024-01-15")).unwrap().data;
        service.delete(a.id).unwrap();
        let b = service.create(NewBook::new("B", "y", "2024-01-15")).unwrap().data;
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_create_empty_title_leaves_store_unchanged() {
        let service = service();
        service.create(NewBook::new("Dune", "Frank Herbert", "2024-01-15")).unwrap();

        let result = service.create(NewBook::new("", "Frank Herbert", "2024-01-15"));
        match result {
            Err(ServiceError::Validation(msg)) => assert_eq!(msg, "Título é obrigatório"),
            other => panic!("expected validation failure, got {:?}", other),
        }
        assert_eq!(service.list_all().unwrap().total, Some(1));
    }

    #[test]
    fn test_create_out_of_range_year() {
        let mut input = NewBook::new("Dune", "Frank Herbert", "2024-01-15");
        input.publication_year = Some(current_year() + 5);
        assert!(matches!(service().create(input), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_get_unknown_id_is_not_found() {
        let result = service().get_by_id(12345);
        match result {
            Err(ServiceError::NotFound(msg)) => assert_eq!(msg, MSG_NOT_FOUND),
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[test]
    fn test_get_after_delete_is_not_found() {
        let service = service();
        let book = service.create(NewBook::new("Dune", "Frank Herbert", "2024-01-15")).unwrap().data;

        let removed = service.delete(book.id).unwrap();
        assert_eq!(removed.data, book);
        assert!(matches!(service.get_by_id(book.id), Err(ServiceError::NotFound(_))));
        assert!(matches!(service.delete(book.id), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn test_update_price_only() {
        let service = service();
        let mut input = with_category("Dune", "Scifi");
        input.isbn = Some("978-0441013593".to_string());
        let before = service.create(input).unwrap().data;

        let patch = BookPatch {
            price: Some(50.0),
            ..Default::default()
        };
        let after = service.update(before.id, patch).unwrap().data;

        assert_eq!(after.price, Some(50.0));
        assert_eq!(after.id, before.id);
        assert_eq!(Book { price: None, ..after.clone() }, before);
    }

    #[test]
    fn test_update_validates_supplied_fields() {
        let service = service();
        let book = service.create(NewBook::new("Dune", "Frank Herbert", "2024-01-15")).unwrap().data;

        let patch = BookPatch {
            author: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(matches!(service.update(book.id, patch), Err(ServiceError::Validation(_))));
        assert_eq!(service.get_by_id(book.id).unwrap().data.author, "Frank Herbert");
    }

    #[test]
    fn test_update_unknown_id() {
        let patch = BookPatch {
            price: Some(10.0),
            ..Default::default()
        };
        assert!(matches!(service().update(77, patch), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn test_search_by_title() {
        let service = service();
        service.create(NewBook::new("The Lord of the Rings", "Tolkien", "2024-01-15")).unwrap();
        service.create(NewBook::new("Dune", "Frank Herbert", "2024-01-15")).unwrap();

        let found = service.search_by_title("lord").unwrap();
        assert_eq!(found.total, Some(1));
        assert_eq!(found.data[0].title, "The Lord of the Rings");
    }

    #[test]
    fn test_search_by_author_and_category() {
        let service = service();
        service.create(with_category("Emma", "Romance")).unwrap();

        assert_eq!(service.search_by_author("aut").unwrap().data.len(), 1);
        assert_eq!(service.search_by_category("romance").unwrap().data.len(), 1);
        assert!(service.search_by_category("terror").unwrap().data.is_empty());
    }

    #[test]
    fn test_search_empty_term_is_validation_failure() {
        let result = service().search_by_title("   ");
        match result {
            Err(ServiceError::Validation(msg)) => assert_eq!(msg, MSG_EMPTY_TERM),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_stats() {
        let service = service();
        service.create(with_category("A", "Fantasy")).unwrap();
        service.create(with_category("B", "Fantasy")).unwrap();
        service.create(with_category("C", "Scifi")).unwrap();

        let stats = service.stats().unwrap().data;
        assert_eq!(stats.total_livros, 3);
        assert_eq!(stats.total_categorias, 2);
    }

    #[test]
    fn test_create_then_get_roundtrip() {
        let service = service();
        let mut input = with_category("Dune", "Scifi");
        input.price = Some(39.9);
        input.page_count = Some(412);
        input.publication_year = Some(1965);

        let created = service.create(input).unwrap().data;
        let fetched = service.get_by_id(created.id).unwrap().data;
        assert_eq!(created, fetched);
    }

    #[test]
    fn test_store_faults_become_internal() {
        let service = BookService::new(Arc::new(BrokenStore));

        let err = service.list_all().unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));
        assert_eq!(err.public_message(), MSG_INTERNAL);
        assert!(matches!(service.get_by_id(1), Err(ServiceError::Internal(_))));
    }

    #[test]
    fn test_envelope_serialization() {
        let ok: Envelope<Vec<Book>> = Envelope::from(service().list_all());
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["sucesso"], true);
        assert_eq!(json["total"], 0);
        assert!(json.get("erro").is_none());

        let failed: Envelope<Book> = Envelope::from(service().get_by_id(1));
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["sucesso"], false);
        assert_eq!(json["erro"], MSG_NOT_FOUND);
        assert!(json.get("dados").is_none());
    }
}
