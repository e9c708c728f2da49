//! Per-turn intent classification.

use wl_domain::chat::{ChatMessage, LogTrail};
use wl_domain::trace::TraceEvent;
use wl_domain::Result;
use wl_providers::ChatRequest;

use crate::runtime::prompts::CLASSIFIER_PROMPT;
use crate::state::AppState;

pub const LABEL_ACCOUNT_CREATION: &str = "account_creation";
pub const LABEL_GENERAL_QUERY: &str = "general_query";

/// The two routes a turn can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    AccountCreation,
    GeneralQuery,
}

/// Map a raw classifier label to an intent.  Returns `(intent,
/// recognized)`; anything that is not an exact label falls back to
/// `GeneralQuery` with `recognized = false`.
fn parse_label(label: &str) -> (Intent, bool) {
    match label {
        LABEL_ACCOUNT_CREATION => (Intent::AccountCreation, true),
        LABEL_GENERAL_QUERY => (Intent::GeneralQuery, true),
        _ => (Intent::GeneralQuery, false),
    }
}

/// Classify the latest user message with a single model call.
pub async fn classify(
    state: &AppState,
    session_key: &str,
    user_message: &str,
    logs: &mut LogTrail,
) -> Result<Intent> {
    let request = ChatRequest::text(vec![
        ChatMessage::system(CLASSIFIER_PROMPT),
        ChatMessage::user(user_message),
    ]);
    let response = state.llm.chat(request).await?;
    let label = response.content.trim().to_string();

    let (intent, recognized) = parse_label(&label);
    if recognized {
        logs.push(format!("[LLM] intent classified as {label}"));
    } else {
        logs.push(format!(
            "[LLM] unrecognized intent label '{label}', treating as general_query"
        ));
    }
    TraceEvent::IntentClassified {
        session_key: session_key.to_string(),
        label,
        recognized,
    }
    .emit();

    Ok(intent)
}
