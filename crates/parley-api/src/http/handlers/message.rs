//! Message CRUD HTTP handlers.
//!
//! Endpoints:
//! - GET    /api/chat       - List all messages
//! - POST   /api/chat       - Create a user message (bot reply follows later)
//! - DELETE /api/chat       - Delete all messages
//! - GET    /api/chat/{id}  - Get a single message
//! - PUT    /api/chat/{id}  - Edit a message's text
//! - DELETE /api/chat/{id}  - Delete a message

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use parley_types::message::{Message, MessageId, NewMessage, UpdateMessage};

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestClock};
use crate::state::AppState;

fn parse_id(raw: &str) -> Result<MessageId, AppError> {
    raw.parse::<MessageId>()
        .map_err(|_| AppError::Validation(format!("invalid message id '{raw}'")))
}

fn message_link(id: MessageId) -> String {
    format!("/api/chat/{id}")
}

/// GET /api/chat - List messages in insertion order.
pub async fn list_messages(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Message>>, AppError> {
    let clock = RequestClock::start();
    let messages = state.chat_service.list_messages().await?;
    Ok(clock.success(messages).with_link("self", "/api/chat"))
}

/// GET /api/chat/{id} - Get one message.
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Message>, AppError> {
    let clock = RequestClock::start();
    let id = parse_id(&id)?;
    let message = state.chat_service.get_message(id).await?;
    Ok(clock.success(message).with_link("self", &message_link(id)))
}

/// POST /api/chat - Create a user message.
///
/// Responds with the stored user message as soon as it is persisted. The bot
/// reply is appended asynchronously after the configured delay.
pub async fn create_message(
    State(state): State<AppState>,
    body: Result<Json<NewMessage>, JsonRejection>,
) -> Result<(StatusCode, ApiResponse<Message>), AppError> {
    let clock = RequestClock::start();
    let Json(body) = body.map_err(|e| AppError::Validation(e.body_text()))?;

    let message = state.chat_service.create_message(body).await?;
    tracing::debug!(request_id = clock.request_id(), message_id = message.id, "Bot reply scheduled for new message");

    let link = message_link(message.id);
    Ok((
        StatusCode::CREATED,
        clock
            .success(message)
            .with_link("self", &link)
            .with_link("messages", "/api/chat"),
    ))
}

/// PUT /api/chat/{id} - Edit a message.
pub async fn update_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateMessage>, JsonRejection>,
) -> Result<ApiResponse<Message>, AppError> {
    let clock = RequestClock::start();
    let id = parse_id(&id)?;
    let Json(body) = body.map_err(|e| AppError::Validation(e.body_text()))?;

    let message = state.chat_service.update_message(id, &body.text).await?;
    Ok(clock.success(message).with_link("self", &message_link(id)))
}

/// DELETE /api/chat/{id} - Delete a message.
pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let clock = RequestClock::start();
    let id = parse_id(&id)?;
    state.chat_service.delete_message(id).await?;
    Ok(clock.success(serde_json::json!({"deleted": true, "id": id})))
}

/// DELETE /api/chat - Delete every message and cancel pending bot replies.
pub async fn delete_all_messages(
    State(state): State<AppState>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let clock = RequestClock::start();
    state.chat_service.delete_all().await?;
    Ok(clock.success(serde_json::json!({"deleted": "all"})))
}
