//! POST /api/chat — run one conversation turn.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;

use wl_domain::chat::ChatMessage;

use crate::runtime::{self, RecordContext, TurnInput};
use crate::state::AppState;

/// Wire shape of a chat request.
///
/// `sessionKey` is optional; absent or blank falls back to the
/// configured default so single-conversation callers need not send one.
#[derive(Debug, Deserialize)]
pub struct ChatTurnRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub record: Option<RecordContext>,
    #[serde(default, rename = "sessionKey")]
    pub session_key: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/chat
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    // The shape error callers actually hit gets a stable message.
    if !body.get("messages").is_some_and(|m| m.is_array()) {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Invalid input format." })),
        )
            .into_response();
    }
    let request: ChatTurnRequest = match serde_json::from_value(body) {
        Ok(request) => request,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    let session_key = request
        .session_key
        .filter(|k| !k.trim().is_empty())
        .unwrap_or_else(|| state.config.sessions.default_key.clone());

    let input = TurnInput {
        session_key,
        messages: request.messages,
        record: request.record,
    };

    // Provider and store failures inside the turn come back as Ok with
    // an apologetic assistant message; Err here means the request never
    // got off the ground.
    match runtime::run_turn(&state, input).await {
        Ok(outcome) => Json(serde_json::json!({
            "messages": outcome.messages,
            "logs": outcome.logs.entries(),
        }))
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
