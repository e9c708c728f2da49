//! Structured field extraction from free-form chat messages.

use wl_domain::chat::{ChatMessage, LogTrail};
use wl_domain::{AccountFields, Result};
use wl_providers::ChatRequest;

use crate::runtime::prompts::EXTRACTION_PROMPT;
use crate::state::AppState;

/// Remove a surrounding markdown code fence, if present.  Models in
/// JSON mode still occasionally wrap their output in ```json blocks.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    inner.trim()
}

/// Ask the model to pull account fields out of the latest user message.
///
/// The previous user message rides along as context so follow-ups like
/// "call it Acme Corp" resolve against what was said before.  A reply
/// that fails to parse is logged and treated as an empty extraction;
/// the flow downstream handles the missing-name case, so there is no
/// retry here.
pub async fn extract_fields(
    state: &AppState,
    user_message: &str,
    prior_message: Option<&str>,
    logs: &mut LogTrail,
) -> Result<AccountFields> {
    let mut content = String::new();
    if let Some(prior) = prior_message {
        content.push_str(&format!("Previous message:\n{prior}\n\n"));
    }
    content.push_str(&format!("Latest message:\n{user_message}"));

    let request = ChatRequest::json(vec![
        ChatMessage::system(EXTRACTION_PROMPT),
        ChatMessage::user(content),
    ]);
    let response = state.llm.chat(request).await?;

    match serde_json::from_str::<AccountFields>(strip_code_fences(&response.content)) {
        Ok(fields) => {
            let map = fields.to_field_map();
            if map.is_empty() {
                logs.push("[LLM] extraction found no fields");
            } else {
                let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                logs.push(format!("[LLM] extracted fields: {}", keys.join(", ")));
            }
            Ok(fields)
        }
        Err(e) => {
            logs.push(format!("[LLM] extraction parse failed: {e}"));
            Ok(AccountFields::default())
        }
    }
}
