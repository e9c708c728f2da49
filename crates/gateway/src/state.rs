use std::sync::Arc;

use wl_airtable::RecordStore;
use wl_domain::config::Config;
use wl_providers::LlmProvider;
use wl_sessions::SessionStore;

/// Shared application state passed to all API handlers.
///
/// Fields are grouped by concern:
/// - **Core services** — config, LLM provider, record store
/// - **Session management** — per-conversation record pointer and
///   creation progress
///
/// Both the LLM provider and the record store sit behind trait objects so
/// integration tests can substitute scripted fakes.
#[derive(Clone)]
pub struct AppState {
    // ── Core services ─────────────────────────────────────────────────
    pub config: Arc<Config>,
    pub llm: Arc<dyn LlmProvider>,
    pub store: Arc<dyn RecordStore>,

    // ── Session management ────────────────────────────────────────────
    pub sessions: Arc<SessionStore>,
}
