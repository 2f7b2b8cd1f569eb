// REST API with Axum
//
// Handlers only translate requests into `BookService` calls. Mapping a
// `ServiceResult` onto an HTTP status happens in one place (`ApiReply`),
// and panics are turned into the same generic 500 envelope by a layer.

use crate::book::{Book, BookId, BookPatch, NewBook};
use crate::service::{BookService, Envelope, ServiceError, ServiceResult, MSG_INTERNAL, MSG_NOT_FOUND};
use crate::store::CatalogStats;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: BookService,
}

// ============================================================================
// Error translation boundary
// ============================================================================

/// HTTP status for a failed service call
pub fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// A service result plus the status to use when it succeeded
pub struct ApiReply<T> {
    success_status: StatusCode,
    result: ServiceResult<T>,
}

impl<T> ApiReply<T> {
    pub fn ok(result: ServiceResult<T>) -> Self {
        ApiReply {
            success_status: StatusCode::OK,
            result,
        }
    }

    pub fn created(result: ServiceResult<T>) -> Self {
        ApiReply {
            success_status: StatusCode::CREATED,
            result,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiReply<T> {
    fn into_response(self) -> Response {
        let status = match &self.result {
            Ok(_) => self.success_status,
            Err(err) => {
                if let ServiceError::Internal(cause) = err {
                    tracing::error!(error = %format!("{:#}", cause), "request failed");
                }
                status_for(err)
            }
        };

        (status, Json(Envelope::from(self.result))).into_response()
    }
}

type PathParam = Result<Path<String>, PathRejection>;

/// Path segments that fail to decode are infrastructure faults, not client input
fn parse_path(path: PathParam) -> Result<String, ServiceError> {
    path.map(|Path(value)| value).map_err(|rejection| {
        ServiceError::Internal(anyhow::anyhow!("invalid path: {}", rejection.body_text()))
    })
}

fn parse_id(path: PathParam) -> Result<BookId, ServiceError> {
    parse_path(path)?
        .parse::<BookId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ServiceError::NotFound(MSG_NOT_FOUND.to_string()))
}

/// A request without a JSON content type counts as an empty body, so it
/// fails validation instead of parsing
fn parse_body<T: Default>(body: Result<Json<T>, JsonRejection>) -> Result<T, ServiceError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(ServiceError::Internal(anyhow::anyhow!(
            "invalid request body: {}",
            rejection.body_text()
        ))),
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(Envelope::<()>::failure(MSG_INTERNAL)),
    )
        .into_response()
}

// ============================================================================
// Book handlers (/api/livros)
// ============================================================================

/// GET /api/livros
async fn list_books(State(state): State<AppState>) -> ApiReply<Vec<Book>> {
    ApiReply::ok(state.service.list_all())
}

/// GET /api/livros/estatisticas
async fn book_stats(State(state): State<AppState>) -> ApiReply<CatalogStats> {
    ApiReply::ok(state.service.stats())
}

/// GET /api/livros/:id
async fn get_book(State(state): State<AppState>, id: PathParam) -> ApiReply<Book> {
    ApiReply::ok(parse_id(id).and_then(|id| state.service.get_by_id(id)))
}

/// POST /api/livros
async fn create_book(
    State(state): State<AppState>,
    body: Result<Json<NewBook>, JsonRejection>,
) -> ApiReply<Book> {
    ApiReply::created(parse_body(body).and_then(|input| state.service.create(input)))
}

/// PUT /api/livros/:id
async fn update_book(
    State(state): State<AppState>,
    id: PathParam,
    body: Result<Json<BookPatch>, JsonRejection>,
) -> ApiReply<Book> {
    let result = parse_id(id).and_then(|id| {
        let patch = parse_body(body)?;
        state.service.update(id, patch)
    });
    ApiReply::ok(result)
}

/// DELETE /api/livros/:id
async fn delete_book(State(state): State<AppState>, id: PathParam) -> ApiReply<Book> {
    ApiReply::ok(parse_id(id).and_then(|id| state.service.delete(id)))
}

/// GET /api/livros/categoria/:categoria
async fn search_by_category(State(state): State<AppState>, term: PathParam) -> ApiReply<Vec<Book>> {
    ApiReply::ok(parse_path(term).and_then(|term| state.service.search_by_category(&term)))
}

/// GET /api/livros/autor/:autor
async fn search_by_author(State(state): State<AppState>, term: PathParam) -> ApiReply<Vec<Book>> {
    ApiReply::ok(parse_path(term).and_then(|term| state.service.search_by_author(&term)))
}

/// GET /api/livros/titulo/:titulo
async fn search_by_title(State(state): State<AppState>, term: PathParam) -> ApiReply<Vec<Book>> {
    ApiReply::ok(parse_path(term).and_then(|term| state.service.search_by_title(&term)))
}

// ============================================================================
// Service endpoints
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    sucesso: bool,
    mensagem: &'static str,
    timestamp: String,
}

/// GET /api/health
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        sucesso: true,
        mensagem: "API funcionando corretamente",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /
async fn api_info() -> impl IntoResponse {
    Json(serde_json::json!({
        "sucesso": true,
        "mensagem": "API do catálogo de livros",
        "version": crate::VERSION,
        "endpoints": {
            "livros": "/api/livros",
            "health": "/api/health",
        },
    }))
}

async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(Envelope::<()>::failure("Rota não encontrada")),
    )
}

// ============================================================================
// Router
// ============================================================================

pub fn book_routes(service: BookService) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/estatisticas", get(book_stats))
        .route("/:id", get(get_book).put(update_book).delete(delete_book))
        .route("/categoria/:categoria", get(search_by_category))
        .route("/autor/:autor", get(search_by_author))
        .route("/titulo/:titulo", get(search_by_title))
        .with_state(AppState { service })
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    match frontend_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true),
        Err(_) => {
            tracing::warn!(origin = %frontend_url, "invalid frontend origin, allowing any origin");
            CorsLayer::permissive()
        }
    }
}

/// Fallback, panic catching, CORS and access logging around any router
pub fn with_layers(router: Router, frontend_url: &str) -> Router {
    router
        .fallback(route_not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors_layer(frontend_url))
        .layer(TraceLayer::new_for_http())
}

/// Complete application router
pub fn router(service: BookService, frontend_url: &str) -> Router {
    let app = Router::new()
        .route("/", get(api_info))
        .route("/api/health", get(health_check))
        .nest("/api/livros", book_routes(service));

    with_layers(app, frontend_url)
}

// ============================================================================
// Tests
// ============================================================================
