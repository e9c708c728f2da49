//! Orchestrator runtime: intent routing, field extraction, draft
//! reconciliation, progressive collection, and tool dispatch.

pub mod collector;
pub mod extract;
pub mod guard;
pub mod intent;
pub mod normalize;
pub mod prompts;
pub mod reconcile;
pub mod tools;

mod turn;

pub use turn::run_turn;

use serde::Deserialize;
use wl_domain::chat::{ChatMessage, LogTrail};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Turn input / outcome
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The record the caller's UI currently has selected, if any.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordContext {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Everything one turn needs from the caller.
#[derive(Debug, Clone)]
pub struct TurnInput {
    pub session_key: String,
    /// Conversation so far, ending with the user message to answer.
    pub messages: Vec<ChatMessage>,
    pub record: Option<RecordContext>,
}

/// What a turn hands back: the reply, the history with the reply
/// appended, and the LogTrail of what happened along the way.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: String,
    pub messages: Vec<ChatMessage>,
    pub logs: LogTrail,
}
