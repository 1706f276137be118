//! Error handling - typed handler errors rendered as HTML error pages.

use std::time::Duration;

use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::middleware::{ErrorHandlerResponse, ErrorHandlers};
use actix_web::{HttpResponse, ResponseError};

use yatube_core::error::{DomainError, RepoError};
use yatube_core::ports::{AuthError, MediaError};
use yatube_shared::ErrorPage;

use crate::templates;

/// Application-level error type, rendered as an HTML page.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Too many requests, retry in {0:?}")]
    TooManyRequests(Duration),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let page = match self {
            AppError::NotFound(detail) => ErrorPage::new(404, "Page not found").with_detail(detail),
            AppError::BadRequest(detail) => ErrorPage::new(400, "Bad request").with_detail(detail),
            AppError::Forbidden => ErrorPage::forbidden(),
            AppError::TooManyRequests(retry) => ErrorPage::too_many_requests(retry.as_secs()),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorPage::internal_error()
            }
        };

        let mut response = error_page_response(self.status_code(), &page);
        if let AppError::TooManyRequests(retry) = self {
            if let Ok(value) = header::HeaderValue::from_str(&retry.as_secs().to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

/// Render an error page; falls back to plain text if the template fails.
pub fn error_page_response(status: StatusCode, page: &ErrorPage) -> HttpResponse {
    let template = match page.status {
        404 => "core/404.html",
        500 => "core/500.html",
        _ => "core/error.html",
    };

    let mut context = templates::page_context(None);
    context.insert("error", page);

    match templates::render(template, &context) {
        Ok(body) => HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(e) => {
            tracing::error!(error = %e, template, "Failed to render error page");
            HttpResponse::build(status)
                .content_type("text/plain; charset=utf-8")
                .body(page.title.clone())
        }
    }
}

/// Replace the body of every 404 with the not-found page naming the path.
fn render_not_found<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let page = ErrorPage::not_found(res.request().path());
    let (req, _) = res.into_parts();
    let res = ServiceResponse::new(req, error_page_response(StatusCode::NOT_FOUND, &page))
        .map_into_right_body();
    Ok(ErrorHandlerResponse::Response(res))
}

/// Error-page middleware wrapped around the whole app.
pub fn error_pages<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new().handler(StatusCode::NOT_FOUND, render_not_found)
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        let DomainError::NotFound { entity_type, key } = err;
        AppError::NotFound(format!("{} {} not found", entity_type, key))
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

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InsufficientPermissions => AppError::Forbidden,
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::InvalidPath(path) => AppError::NotFound(path),
            MediaError::Io(msg) => AppError::Internal(format!("Media storage: {msg}")),
        }
    }
}

impl From<tera::Error> for AppError {
    fn from(err: tera::Error) -> Self {
        AppError::Internal(format!("Template rendering failed: {err:?}"))
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_status() {
        assert_eq!(
            AppError::from(AuthError::InsufficientPermissions).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(AuthError::HashingError("bad salt".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_entity_is_not_found() {
        let err = AppError::from(DomainError::not_found("group", "cats"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Not found: group cats not found");
    }
}
