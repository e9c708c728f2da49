//! Progressive field collector for the creation flow.
//!
//! Three stages keyed by the session's `creation_progress`: links,
//! description, talking points.  Each user turn writes whatever it
//! supplied straight through to the store, then advances at most one
//! stage.  An unhelpful turn re-asks the current stage's question.

use wl_airtable::RecordStore;
use wl_domain::account::CreationStage;
use wl_domain::chat::LogTrail;
use wl_domain::trace::TraceEvent;
use wl_domain::{AccountFields, RecordId};

pub const LINKS_QUESTION: &str =
    "Can you share any of the following for the company: Website, Instagram, Facebook, or Blog?";
pub const DESCRIPTION_QUESTION: &str =
    "Can you tell me more about the company, including its industry, purpose, or mission?";
pub const TALKING_POINTS_QUESTION: &str =
    "What are the major objectives or talking points you'd like to achieve with Wonderland?";

pub const COMPLETION_REPLY: &str =
    "Thanks! I've recorded everything I need for the new account.";

/// The question the collector asks on entering (or re-asking) a stage.
pub fn stage_question(stage: CreationStage) -> &'static str {
    match stage {
        CreationStage::Links => LINKS_QUESTION,
        CreationStage::Description => DESCRIPTION_QUESTION,
        CreationStage::TalkingPoints => TALKING_POINTS_QUESTION,
    }
}

/// Classify URLs in a raw message into link fields.
///
/// Tokens containing `http` are routed by substring: `www` means the
/// website, then the known social hosts.  The first token matching
/// nothing fills the website slot if it is still empty, otherwise Blog;
/// any further unmatched tokens are dropped.
pub fn classify_links(message: &str) -> AccountFields {
    let mut fields = AccountFields::default();
    let mut leftover: Option<&str> = None;

    for token in message.split(',').flat_map(str::split_whitespace) {
        if !token.contains("http") {
            continue;
        }
        if token.contains("www") {
            if fields.client_url.is_none() {
                fields.client_url = Some(token.to_string());
            }
        } else if token.contains("instagram.com") {
            if fields.instagram.is_none() {
                fields.instagram = Some(token.to_string());
            }
        } else if token.contains("facebook.com") {
            if fields.facebook.is_none() {
                fields.facebook = Some(token.to_string());
            }
        } else if leftover.is_none() {
            leftover = Some(token);
        }
    }

    if let Some(token) = leftover {
        if fields.client_url.is_none() {
            fields.client_url = Some(token.to_string());
        } else {
            fields.blog = Some(token.to_string());
        }
    }
    fields
}

/// Outcome of one collector turn.
#[derive(Debug, Clone)]
pub struct CollectStep {
    /// The reply to send: the next question, or the completion line.
    pub reply: String,
    /// Stage to persist; `None` means the flow completed this turn.
    pub next_stage: Option<CreationStage>,
}

/// Run one collector turn against the active record.
///
/// Store update failures are logged and the stage still advances; the
/// conversation must not wedge on a transient write error.
pub async fn step(
    store: &dyn RecordStore,
    record_id: &RecordId,
    stage: CreationStage,
    extracted: &AccountFields,
    raw_message: &str,
    logs: &mut LogTrail,
) -> CollectStep {
    let mut supplied = AccountFields::default();
    let satisfied = match stage {
        CreationStage::Links => {
            supplied = classify_links(raw_message);
            supplied.has_any_link() || extracted.has_any_link()
        }
        CreationStage::Description => {
            let text = extracted
                .description
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(raw_message);
            let ok = !text.trim().is_empty();
            if ok {
                supplied.description = Some(text.to_string());
            }
            ok
        }
        CreationStage::TalkingPoints => {
            let text = extracted
                .talking_points
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(raw_message);
            let ok = !text.trim().is_empty();
            if ok {
                supplied.talking_points = Some(text.to_string());
            }
            ok
        }
    };

    let map = supplied.to_field_map();
    if !map.is_empty() {
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        match store.update(record_id, map.clone()).await {
            Ok(_) => logs.push(format!("[STORE] saved {}", keys.join(", "))),
            Err(e) => logs.push(format!("[STORE] update failed (continuing): {e}")),
        }
    }

    let next_stage = if satisfied { stage.next() } else { Some(stage) };
    if satisfied {
        TraceEvent::StageAdvanced {
            record_id: record_id.to_string(),
            from: stage.ordinal(),
            to: next_stage.map(CreationStage::ordinal),
        }
        .emit();
        let to = next_stage
            .map(|s| s.ordinal().to_string())
            .unwrap_or_else(|| "complete".into());
        logs.push(format!(
            "[SESSION] creation stage {} -> {to}",
            stage.ordinal()
        ));
    }

    let reply = match next_stage {
        Some(next) => stage_question(next).to_string(),
        None => COMPLETION_REPLY.to_string(),
    };
    CollectStep { reply, next_stage }
}
