//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and JSON error bodies, so every
//! endpoint reports failures the same way:
//!
//! | Error | Status |
//! |---|---|
//! | `Validation`, `InvalidTimezone` | 400 Bad Request |
//! | `SlotUnavailable` | 422 Unprocessable Entity |
//! | `InvalidSchedule`, `Repository` | 500 Internal Server Error |
//!
//! 422 is reserved for booking conflicts. Extractor rejections (malformed
//! JSON, bad query strings) are turned into validation errors by the
//! handlers so they never surface as 422.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use eventbook_core::errors::BookingError;
use serde_json::json;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use eventbook_api::middleware::error_handling::AppError;
/// use eventbook_core::errors::BookingError;
///
/// async fn handler(datetime: Option<String>) -> Result<Json<String>, AppError> {
///     let datetime = datetime
///         .ok_or_else(|| AppError(BookingError::Validation("Datetime is required".into())))?;
///     Ok(Json(datetime))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub BookingError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BookingError::Validation(_) => StatusCode::BAD_REQUEST,
            BookingError::InvalidTimezone(_) => StatusCode::BAD_REQUEST,
            BookingError::SlotUnavailable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BookingError::InvalidSchedule(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BookingError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {:?}", self.0);
        }

        let message = self.0.to_string();
        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

/// Automatic conversion from BookingError to AppError
impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError(err)
    }
}

/// Automatic conversion from eyre::Report to AppError
///
/// Reports come from the persistence boundary, so they are wrapped as
/// `BookingError::Repository`.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(BookingError::Repository(err))
    }
}

/// Maps a BookingError to an HTTP response
///
/// # Arguments
///
/// * `err` - The BookingError to convert
///
/// # Returns
///
/// * `Response` - An HTTP response with appropriate status code and body
pub fn map_error(err: BookingError) -> Response {
    AppError(err).into_response()
}
