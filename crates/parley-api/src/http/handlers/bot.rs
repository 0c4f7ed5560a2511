//! Bot reply probe: compute what the bot would answer, without storing it.

use axum::extract::{Query, State};
use serde::Deserialize;

use parley_types::reply::BotReply;

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestClock};
use crate::state::AppState;

/// Query parameters for the reply probe.
#[derive(Debug, Deserialize)]
pub struct BotReplyQuery {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "userName", alias = "sender")]
    pub user_name: Option<String>,
}

/// GET /api/chat/bot/response?message=...&userName=...
pub async fn bot_response(
    State(state): State<AppState>,
    Query(query): Query<BotReplyQuery>,
) -> Result<ApiResponse<BotReply>, AppError> {
    let clock = RequestClock::start();
    let text = query.message.unwrap_or_default();
    let reply = state
        .chat_service
        .bot_reply(&text, query.user_name.as_deref())?;
    Ok(clock.success(reply))
}
