//! Error handling middleware - RFC 7807 compliant responses.

use std::fmt;

use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, error, http::StatusCode};
use inkwell_core::error::{DomainError, RepoError};
use inkwell_shared::{ErrorResponse, FieldErrors};

use crate::middleware::auth::AuthenticationError;
use crate::observability::RequestId;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    Forbidden,
    Internal(String),
    Validation(FieldErrors),
}

impl AppError {
    /// A validation failure on a single field.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(FieldErrors::from([(field.into(), vec![message.into()])]))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Forbidden => write!(f, "Forbidden"),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::Validation(errors) => write!(f, "Validation errors: {:?}", errors),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(detail) = self {
            tracing::error!("Internal error: {}", detail);
        }

        HttpResponse::build(self.status_code()).json(self.problem())
    }
}

impl AppError {
    /// The problem document for this error, without request context.
    pub fn problem(&self) -> ErrorResponse {
        match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Unauthorized => ErrorResponse::unauthorized(),
            AppError::Forbidden => ErrorResponse::forbidden(),
            AppError::Internal(_) => ErrorResponse::internal_error(),
            AppError::Validation(errors) => ErrorResponse::validation(errors.clone()),
        }
    }
}

/// The problem document behind an error response this crate produced, so
/// the request id and path can be attached once the request is known.
pub fn problem_for(err: &actix_web::Error) -> Option<ErrorResponse> {
    if let Some(app_error) = err.as_error::<AppError>() {
        return Some(app_error.problem());
    }
    err.as_error::<AuthenticationError>()
        .map(AuthenticationError::problem)
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{} with id {} not found", entity_type, id))
            }
            DomainError::Validation { field, message } => AppError::field(field, message),
            DomainError::Duplicate(msg) => AppError::BadRequest(msg),
            DomainError::Unauthorized => AppError::Unauthorized,
            DomainError::Forbidden => AppError::Forbidden,
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::BadRequest(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Validation(errors)
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Render an extractor failure as a 400 problem document carrying the request id.
fn rejected<E>(err: E, req: &HttpRequest, detail: String) -> actix_web::Error
where
    E: fmt::Debug + fmt::Display + 'static,
{
    let mut problem = ErrorResponse::bad_request(detail).with_instance(req.path());
    if let Some(request_id) = req.extensions().get::<RequestId>() {
        problem = problem.with_request_id(request_id.as_str());
    }

    error::InternalError::from_response(err, HttpResponse::BadRequest().json(problem)).into()
}

/// Malformed JSON bodies become 400 problem documents.
pub fn json_error_handler(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "Rejected JSON body");
    let detail = format!("Malformed JSON body: {}", err);
    rejected(err, req, detail)
}

/// Unparseable query strings (a non-UUID filter, a negative limit) become 400.
pub fn query_error_handler(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    let detail = format!("Invalid query parameter: {}", err);
    rejected(err, req, detail)
}

/// Path segments that do not parse (typically a malformed UUID) become 400.
pub fn path_error_handler(err: error::PathError, req: &HttpRequest) -> actix_web::Error {
    let detail = format!("Invalid path parameter: {}", err);
    rejected(err, req, detail)
}
