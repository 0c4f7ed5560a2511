//! Application error type mapping to HTTP status codes and envelope format.

use axum::response::{IntoResponse, Response};

use parley_types::error::ChatError;

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Chat log errors.
    Chat(ChatError),
    /// Malformed request (body, path or query).
    Validation(String),
    /// Unknown route.
    RouteNotFound(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = match &self {
            AppError::Chat(ChatError::NotFound(id)) => {
                ("MESSAGE_NOT_FOUND", format!("Message {id} not found"))
            }
            AppError::Chat(ChatError::InvalidArgument(msg)) => ("VALIDATION_ERROR", msg.clone()),
            AppError::Chat(e @ ChatError::Storage(_)) => {
                tracing::error!(error = %e, "Storage failure while handling request");
                ("STORAGE_ERROR", e.to_string())
            }
            AppError::Chat(e @ ChatError::Scheduling(_)) => ("SCHEDULING_ERROR", e.to_string()),
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::RouteNotFound(path) => ("NOT_FOUND", format!("Route {path} not found")),
        };

        ApiResponse::error(code, &message, uuid::Uuid::now_v7().to_string(), 0).into_response()
    }
}
