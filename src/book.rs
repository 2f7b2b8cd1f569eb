// 📚 Book Entity - the single record type of the catalog
// Wire field names follow the public API (Portuguese), Rust names stay English.

use chrono::{DateTime, Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier (monotonic, never reused)
pub type BookId = i64;

pub const MIN_PUBLICATION_YEAR: i64 = 1000;
pub const MAX_PRICE: f64 = 10_000.0;
pub const MIN_PAGES: i64 = 1;
pub const MAX_PAGES: i64 = 10_000;

// ============================================================================
// BOOK
// ============================================================================

/// A persisted book record
///
/// `title`, `author` and `registered_on` are always present once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,

    #[serde(rename = "titulo")]
    pub title: String,

    #[serde(rename = "autor")]
    pub author: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,

    #[serde(rename = "ano_publicacao", default, skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i64>,

    #[serde(rename = "preco", default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    /// Calendar date (YYYY-MM-DD) or RFC 3339 timestamp
    #[serde(rename = "data_cadastro")]
    pub registered_on: String,

    #[serde(rename = "descricao", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "categoria", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(rename = "editora", default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,

    #[serde(rename = "numero_paginas", default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<i64>,
}

// ============================================================================
// INPUT SHAPES
// ============================================================================

/// Create request: a book without an identifier
///
/// Required text fields default to empty so a missing field is reported as a
/// validation failure instead of a body parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
    #[serde(rename = "titulo", default)]
    pub title: String,

    #[serde(rename = "autor", default)]
    pub author: String,

    #[serde(default)]
    pub isbn: Option<String>,

    #[serde(rename = "ano_publicacao", default)]
    pub publication_year: Option<i64>,

    #[serde(rename = "preco", default)]
    pub price: Option<f64>,

    #[serde(rename = "data_cadastro", default)]
    pub registered_on: String,

    #[serde(rename = "descricao", default)]
    pub description: Option<String>,

    #[serde(rename = "categoria", default)]
    pub category: Option<String>,

    #[serde(rename = "editora", default)]
    pub publisher: Option<String>,

    #[serde(rename = "numero_paginas", default)]
    pub page_count: Option<i64>,
}

/// Update request: every field optional, `None` means "leave as is"
///
/// Any `id` sent in the body is ignored; the identifier comes from the path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookPatch {
    #[serde(rename = "titulo", default)]
    pub title: Option<String>,

    #[serde(rename = "autor", default)]
    pub author: Option<String>,

    #[serde(default)]
    pub isbn: Option<String>,

    #[serde(rename = "ano_publicacao", default)]
    pub publication_year: Option<i64>,

    #[serde(rename = "preco", default)]
    pub price: Option<f64>,

    #[serde(rename = "data_cadastro", default)]
    pub registered_on: Option<String>,

    #[serde(rename = "descricao", default)]
    pub description: Option<String>,

    #[serde(rename = "categoria", default)]
    pub category: Option<String>,

    #[serde(rename = "editora", default)]
    pub publisher: Option<String>,

    #[serde(rename = "numero_paginas", default)]
    pub page_count: Option<i64>,
}

impl NewBook {
    pub fn new(title: &str, author: &str, registered_on: &str) -> Self {
        NewBook {
            title: title.to_string(),
            author: author.to_string(),
            registered_on: registered_on.to_string(),
            ..Default::default()
        }
    }

    /// Trim required text, drop blank optional text
    pub fn normalized(self) -> Self {
        NewBook {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            isbn: non_blank(self.isbn),
            publication_year: self.publication_year,
            price: self.price,
            registered_on: self.registered_on.trim().to_string(),
            description: non_blank(self.description),
            category: non_blank(self.category),
            publisher: non_blank(self.publisher),
            page_count: self.page_count,
        }
    }

    /// Validate required fields and numeric bounds
    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push(ValidationError::new("titulo", "Título é obrigatório"));
        }
        if self.author.trim().is_empty() {
            errors.push(ValidationError::new("autor", "Autor é obrigatório"));
        }
        check_registration_date(&mut errors, &self.registered_on);
        check_numeric_bounds(&mut errors, self.publication_year, self.price, self.page_count);

        finish(errors)
    }

    /// Attach a store-assigned identifier
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            publication_year: self.publication_year,
            price: self.price,
            registered_on: self.registered_on,
            description: self.description,
            category: self.category,
            publisher: self.publisher,
            page_count: self.page_count,
        }
    }
}

impl BookPatch {
    /// Same normalization as create, applied only to supplied fields.
    /// Blank optional text becomes `None` (i.e. not supplied).
    pub fn normalized(self) -> Self {
        BookPatch {
            title: self.title.map(|t| t.trim().to_string()),
            author: self.author.map(|a| a.trim().to_string()),
            isbn: non_blank(self.isbn),
            publication_year: self.publication_year,
            price: self.price,
            registered_on: self.registered_on.map(|d| d.trim().to_string()),
            description: non_blank(self.description),
            category: non_blank(self.category),
            publisher: non_blank(self.publisher),
            page_count: self.page_count,
        }
    }

    /// Create-time rules, restricted to the fields present in the patch
    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();

        if matches!(&self.title, Some(t) if t.trim().is_empty()) {
            errors.push(ValidationError::new("titulo", "Título é obrigatório"));
        }
        if matches!(&self.author, Some(a) if a.trim().is_empty()) {
            errors.push(ValidationError::new("autor", "Autor é obrigatório"));
        }
        if let Some(date) = &self.registered_on {
            check_registration_date(&mut errors, date);
        }
        check_numeric_bounds(&mut errors, self.publication_year, self.price, self.page_count);

        finish(errors)
    }

    /// Merge supplied fields into `book`; the identifier is never touched
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(author) = &self.author {
            book.author = author.clone();
        }
        if let Some(isbn) = &self.isbn {
            book.isbn = Some(isbn.clone());
        }
        if let Some(year) = self.publication_year {
            book.publication_year = Some(year);
        }
        if let Some(price) = self.price {
            book.price = Some(price);
        }
        if let Some(date) = &self.registered_on {
            book.registered_on = date.clone();
        }
        if let Some(description) = &self.description {
            book.description = Some(description.clone());
        }
        if let Some(category) = &self.category {
            book.category = Some(category.clone());
        }
        if let Some(publisher) = &self.publisher {
            book.publisher = Some(publisher.clone());
        }
        if let Some(pages) = self.page_count {
            book.page_count = Some(pages);
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ============================================================================
// VALIDATION
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Wire name of the offending field
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        ValidationError {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Join validation errors into the single `erro` string of the envelope
pub fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn current_year() -> i64 {
    Local::now().year() as i64
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp
pub fn is_calendar_date(value: &str) -> bool {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() || DateTime::parse_from_rfc3339(value).is_ok()
}

fn check_registration_date(errors: &mut Vec<ValidationError>, date: &str) {
    if date.trim().is_empty() {
        errors.push(ValidationError::new("data_cadastro", "Data de cadastro é obrigatória"));
    } else if !is_calendar_date(date) {
        errors.push(ValidationError::new(
            "data_cadastro",
            "Data de cadastro inválida (use AAAA-MM-DD)",
        ));
    }
}

fn check_numeric_bounds(
    errors: &mut Vec<ValidationError>,
    year: Option<i64>,
    price: Option<f64>,
    pages: Option<i64>,
) {
    if let Some(year) = year {
        let max_year = current_year();
        if !(MIN_PUBLICATION_YEAR..=max_year).contains(&year) {
            errors.push(ValidationError::new(
                "ano_publicacao",
                format!("Ano deve estar entre {} e {}", MIN_PUBLICATION_YEAR, max_year),
            ));
        }
    }

    // NaN fails the range check too
    if let Some(price) = price {
        if !(0.0..=MAX_PRICE).contains(&price) {
            errors.push(ValidationError::new("preco", "Preço deve estar entre 0 e 10.000"));
        }
    }

    if let Some(pages) = pages {
        if !(MIN_PAGES..=MAX_PAGES).contains(&pages) {
            errors.push(ValidationError::new(
                "numero_paginas",
                "Número de páginas deve estar entre 1 e 10.000",
            ));
        }
    }
}

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// ============================================================================
// TESTS
// ============================================================================
