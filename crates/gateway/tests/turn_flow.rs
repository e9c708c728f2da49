//! Integration tests for the conversation orchestrator — full turns
//! against scripted doubles.
//!
//! The LLM provider replays a queue of canned responses and the record
//! store lives in memory, so every flow here is deterministic and runs
//! without network access.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use wl_airtable::{FieldMap, RecordQuery, RecordStore, StoredRecord};
use wl_domain::account::CreationStage;
use wl_domain::chat::{ChatMessage, ChatRole};
use wl_domain::config::{Config, SessionsConfig};
use wl_domain::{Error, RecordId, Result, ToolCall};
use wl_providers::{ChatRequest, ChatResponse, LlmProvider};
use wl_sessions::SessionStore;

use wl_gateway::runtime::prompts::{NAME_GIVE_UP, NAME_PROMPT};
use wl_gateway::runtime::{run_turn, RecordContext, TurnInput};
use wl_gateway::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scripted LLM provider
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

struct ScriptedLlm {
    replies: Mutex<VecDeque<ChatResponse>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedLlm {
    fn new(replies: Vec<ChatResponse>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().push(req);
        self.replies
            .lock()
            .pop_front()
            .ok_or_else(|| Error::Other("scripted provider ran out of replies".into()))
    }

    fn provider_id(&self) -> &str {
        "scripted"
    }
}

fn text_response(content: &str) -> ChatResponse {
    ChatResponse {
        content: content.to_string(),
        tool_calls: Vec::new(),
        usage: None,
        model: "scripted".into(),
        finish_reason: Some("stop".into()),
    }
}

fn tool_response(tool_name: &str, arguments: serde_json::Value) -> ChatResponse {
    ChatResponse {
        content: String::new(),
        tool_calls: vec![ToolCall {
            call_id: "call_1".into(),
            tool_name: tool_name.into(),
            arguments,
        }],
        usage: None,
        model: "scripted".into(),
        finish_reason: Some("tool_calls".into()),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// In-memory record store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Default)]
struct InMemoryStore {
    records: Mutex<Vec<StoredRecord>>,
}

impl InMemoryStore {
    fn seed(&self, id: &str, fields: serde_json::Value) {
        let fields = match fields {
            serde_json::Value::Object(map) => map,
            other => panic!("seed expects a JSON object, got {other}"),
        };
        self.records.lock().push(StoredRecord {
            id: RecordId::from(id),
            fields,
            created_time: None,
        });
    }

    fn record(&self, id: &str) -> StoredRecord {
        self.records
            .lock()
            .iter()
            .find(|r| r.id.as_str() == id)
            .cloned()
            .unwrap_or_else(|| panic!("no record {id} in store"))
    }

    fn len(&self) -> usize {
        self.records.lock().len()
    }
}

/// Match a rendered equality/AND formula against a record's fields.
/// Covers the shapes the runtime actually issues.
fn matches_filter(rendered: &str, fields: &FieldMap) -> bool {
    let inner = rendered
        .strip_prefix("AND(")
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(rendered);
    inner.split(", ").all(|clause| {
        let Some((field, value)) = clause.split_once(" = ") else {
            return false;
        };
        let field = field.trim_start_matches('{').trim_end_matches('}');
        let value = value.trim_matches('\'');
        fields.get(field).and_then(|v| v.as_str()) == Some(value)
    })
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn find(&self, id: &RecordId) -> Result<StoredRecord> {
        self.records
            .lock()
            .iter()
            .find(|r| &r.id == id)
            .cloned()
            .ok_or_else(|| Error::Store(format!("record {id} not found")))
    }

    async fn create(&self, fields: FieldMap) -> Result<StoredRecord> {
        let mut records = self.records.lock();
        let record = StoredRecord {
            id: RecordId(format!("rec{}", records.len() + 1)),
            fields,
            created_time: None,
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &RecordId, fields: FieldMap) -> Result<StoredRecord> {
        let mut records = self.records.lock();
        let record = records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| Error::Store(format!("record {id} not found")))?;
        for (k, v) in fields {
            record.fields.insert(k, v);
        }
        Ok(record.clone())
    }

    async fn query(&self, query: RecordQuery) -> Result<Vec<StoredRecord>> {
        let rendered = query.filter.as_ref().map(|f| f.render());
        Ok(self
            .records
            .lock()
            .iter()
            .filter(|r| {
                rendered
                    .as_deref()
                    .map_or(true, |f| matches_filter(f, &r.fields))
            })
            .cloned()
            .collect())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Harness
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn test_state(
    replies: Vec<ChatResponse>,
    store: Arc<InMemoryStore>,
) -> (AppState, Arc<ScriptedLlm>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        sessions: SessionsConfig {
            state_dir: dir.path().to_path_buf(),
            ..SessionsConfig::default()
        },
        ..Config::default()
    };
    let llm = Arc::new(ScriptedLlm::new(replies));
    let sessions = Arc::new(SessionStore::new(&config.sessions.state_dir).unwrap());
    let state = AppState {
        config: Arc::new(config),
        llm: llm.clone(),
        store: store.clone(),
        sessions,
    };
    (state, llm, dir)
}

fn user_turn(session_key: &str, message: &str) -> TurnInput {
    TurnInput {
        session_key: session_key.to_string(),
        messages: vec![ChatMessage::user(message)],
        record: None,
    }
}

const LINKS_QUESTION: &str =
    "Can you share any of the following for the company: Website, Instagram, Facebook, or Blog?";
const DESCRIPTION_QUESTION: &str =
    "Can you tell me more about the company, including its industry, purpose, or mission?";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Guided creation flow
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn create_turn_reconciles_a_draft_and_asks_for_links() {
    let store = Arc::new(InMemoryStore::default());
    let (state, _llm, _dir) = test_state(
        vec![
            text_response("account_creation"),
            text_response(r#"{"Name": "acme corp"}"#),
        ],
        store.clone(),
    );

    let outcome = run_turn(&state, user_turn("main", "Create an account called acme corp"))
        .await
        .unwrap();

    assert_eq!(outcome.reply, LINKS_QUESTION);
    assert!(outcome.logs.contains("created draft 'Acme Corp'"));

    assert_eq!(store.len(), 1);
    let record = store.record("rec1");
    assert_eq!(record.field_str("Name"), Some("Acme Corp"));
    assert_eq!(record.field_str("Client Company Name"), Some("Acme Corp"));
    assert_eq!(record.field_str("Status"), Some("Draft"));
    assert_eq!(record.field_str("Industry"), Some("General"));
    assert_eq!(record.field_str("Priority Image"), Some("AI Generated"));
    assert!(record.field_str("Description").unwrap().len() >= 600);

    let entry = state.sessions.get("main").unwrap();
    assert_eq!(entry.active_record, Some(RecordId::from("rec1")));
    assert_eq!(entry.creation_progress, Some(CreationStage::Links));
}

#[tokio::test]
async fn links_turn_classifies_urls_and_advances_to_description() {
    let store = Arc::new(InMemoryStore::default());
    let (state, _llm, _dir) = test_state(
        vec![
            // Turn 1: create.
            text_response("account_creation"),
            text_response(r#"{"Name": "acme corp"}"#),
            // Turn 2: a continuation answer classifies as general but
            // belongs to the running flow.
            text_response("general_query"),
            text_response("{}"),
        ],
        store.clone(),
    );

    let first = run_turn(&state, user_turn("main", "Create an account called acme corp"))
        .await
        .unwrap();

    let mut messages = first.messages;
    messages.push(ChatMessage::user(
        "about http://acme.com and https://instagram.com/acme",
    ));
    let outcome = run_turn(
        &state,
        TurnInput {
            session_key: "main".into(),
            messages,
            record: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.reply, DESCRIPTION_QUESTION);

    let record = store.record("rec1");
    assert_eq!(record.field_str("Client URL"), Some("http://acme.com"));
    assert_eq!(
        record.field_str("Instagram"),
        Some("https://instagram.com/acme")
    );

    let entry = state.sessions.get("main").unwrap();
    assert_eq!(entry.creation_progress, Some(CreationStage::Description));
}

#[tokio::test]
async fn unhelpful_turn_re_asks_the_same_stage_question() {
    let store = Arc::new(InMemoryStore::default());
    let (state, _llm, _dir) = test_state(
        vec![
            text_response("account_creation"),
            text_response(r#"{"Name": "acme corp"}"#),
            text_response("general_query"),
            text_response("{}"),
        ],
        store.clone(),
    );

    run_turn(&state, user_turn("main", "Create an account called acme corp"))
        .await
        .unwrap();
    let outcome = run_turn(&state, user_turn("main", "hello there"))
        .await
        .unwrap();

    assert_eq!(outcome.reply, LINKS_QUESTION);
    let entry = state.sessions.get("main").unwrap();
    assert_eq!(entry.creation_progress, Some(CreationStage::Links));
}

#[tokio::test]
async fn same_name_reuses_the_existing_draft() {
    let store = Arc::new(InMemoryStore::default());
    let (state, _llm, _dir) = test_state(
        vec![
            text_response("account_creation"),
            text_response(r#"{"Name": "acme corp"}"#),
            text_response("account_creation"),
            text_response(r#"{"Name": "ACME CORP"}"#),
        ],
        store.clone(),
    );

    run_turn(&state, user_turn("one", "Create an account called acme corp"))
        .await
        .unwrap();
    let outcome = run_turn(&state, user_turn("two", "Create an account called ACME CORP"))
        .await
        .unwrap();

    // Title-casing collapses both spellings onto the same draft.
    assert_eq!(store.len(), 1);
    assert!(outcome.logs.contains("reusing existing draft 'Acme Corp'"));

    let entry = state.sessions.get("two").unwrap();
    assert_eq!(entry.active_record, Some(RecordId::from("rec1")));
}

#[tokio::test]
async fn nameless_create_asks_once_then_gives_up() {
    let store = Arc::new(InMemoryStore::default());
    let (state, _llm, _dir) = test_state(
        vec![
            text_response("account_creation"),
            text_response("{}"),
            text_response("account_creation"),
            text_response("{}"),
        ],
        store.clone(),
    );

    let first = run_turn(&state, user_turn("main", "I want a new account"))
        .await
        .unwrap();
    assert_eq!(first.reply, NAME_PROMPT);

    let second = run_turn(&state, user_turn("main", "just make one"))
        .await
        .unwrap();
    assert_eq!(second.reply, NAME_GIVE_UP);

    // Nothing was created and the counter is back to zero.
    assert_eq!(store.len(), 0);
    assert_eq!(state.sessions.get("main").unwrap().name_prompts, 0);
}

#[tokio::test]
async fn malformed_extraction_is_logged_and_takes_the_name_prompt_path() {
    let store = Arc::new(InMemoryStore::default());
    let (state, _llm, _dir) = test_state(
        vec![
            text_response("account_creation"),
            text_response("Sure! Here are the fields you asked for."),
        ],
        store.clone(),
    );

    let outcome = run_turn(&state, user_turn("main", "create an account"))
        .await
        .unwrap();

    assert_eq!(outcome.reply, NAME_PROMPT);
    assert!(outcome.logs.contains("extraction parse failed"));
    assert_eq!(store.len(), 0);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// General path and tool dispatch
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn plain_reply_passes_through_and_extends_the_history() {
    let store = Arc::new(InMemoryStore::default());
    let (state, llm, _dir) = test_state(
        vec![
            text_response("general_query"),
            text_response("Hello! How can I help?"),
        ],
        store,
    );

    let outcome = run_turn(&state, user_turn("main", "hi")).await.unwrap();

    assert_eq!(outcome.reply, "Hello! How can I help?");
    assert_eq!(outcome.messages.len(), 2);
    assert_eq!(outcome.messages[1].role, ChatRole::Assistant);
    assert!(outcome.logs.contains("replied in natural language"));

    // The classifier call carries no tools; the persona call offers
    // all four account tools.
    let requests = llm.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].tools.is_empty());
    assert_eq!(requests[1].tools.len(), 4);
    assert_eq!(requests[1].messages[0].role, ChatRole::System);
    assert!(requests[1].messages[0]
        .content
        .starts_with("You are a Wonderland assistant!"));
}

#[tokio::test]
async fn modify_with_stale_record_id_is_rejected_naming_both_ids() {
    let store = Arc::new(InMemoryStore::default());
    store.seed("rec999", json!({"Name": "Acme Corp", "Status": "Active"}));
    let (state, _llm, _dir) = test_state(
        vec![
            text_response("general_query"),
            tool_response(
                "modifyAccount",
                json!({"recordId": "rec123", "Status": "disabled"}),
            ),
        ],
        store.clone(),
    );

    state.sessions.resolve_or_create("main");
    state
        .sessions
        .set_active_record("main", Some(RecordId::from("rec999")));

    let outcome = run_turn(&state, user_turn("main", "disable the account"))
        .await
        .unwrap();

    assert!(outcome.reply.contains("rec123"));
    assert!(outcome.reply.contains("rec999"));
    assert!(outcome.logs.contains("[GUARD]"));
    // The store was never touched.
    assert_eq!(store.record("rec999").field_str("Status"), Some("Active"));
}

#[tokio::test]
async fn modify_normalizes_status_against_the_allowed_set() {
    let store = Arc::new(InMemoryStore::default());
    store.seed("rec1", json!({"Name": "Acme Corp", "Status": "New"}));
    let (state, _llm, _dir) = test_state(
        vec![
            text_response("general_query"),
            tool_response(
                "modifyAccount",
                json!({"recordId": "rec1", "Status": "make it disabled please"}),
            ),
        ],
        store.clone(),
    );

    state.sessions.resolve_or_create("main");
    state
        .sessions
        .set_active_record("main", Some(RecordId::from("rec1")));

    let outcome = run_turn(&state, user_turn("main", "disable the account"))
        .await
        .unwrap();

    assert_eq!(store.record("rec1").field_str("Status"), Some("Disabled"));
    assert!(outcome.reply.contains("Status"));
    assert!(outcome
        .logs
        .contains("Status 'make it disabled please' normalized to 'Disabled'"));
}

#[tokio::test]
async fn delete_soft_deletes_and_clears_the_session_pointer() {
    let store = Arc::new(InMemoryStore::default());
    store.seed("rec1", json!({"Name": "Acme Corp", "Status": "Active"}));
    let (state, _llm, _dir) = test_state(
        vec![
            text_response("general_query"),
            tool_response("deleteAccount", json!({"recordId": "rec1"})),
        ],
        store.clone(),
    );

    state.sessions.resolve_or_create("main");
    state
        .sessions
        .set_active_record("main", Some(RecordId::from("rec1")));
    state
        .sessions
        .set_progress("main", Some(CreationStage::Links));

    let outcome = run_turn(&state, user_turn("main", "delete this account"))
        .await
        .unwrap();

    assert_eq!(outcome.reply, "The account has been deleted.");
    assert_eq!(store.record("rec1").field_str("Status"), Some("Deleted"));

    let entry = state.sessions.get("main").unwrap();
    assert_eq!(entry.active_record, None);
    assert_eq!(entry.creation_progress, None);
}

#[tokio::test]
async fn switch_re_points_the_session_and_names_the_account() {
    let store = Arc::new(InMemoryStore::default());
    store.seed("rec1", json!({"Name": "Beta LLC", "Status": "Active"}));
    let (state, _llm, _dir) = test_state(
        vec![
            text_response("general_query"),
            tool_response("switchRecord", json!({"recordId": "rec1"})),
        ],
        store,
    );

    let outcome = run_turn(&state, user_turn("main", "switch to Beta LLC"))
        .await
        .unwrap();

    assert_eq!(outcome.reply, "Switched to account Beta LLC.");
    let entry = state.sessions.get("main").unwrap();
    assert_eq!(entry.active_record, Some(RecordId::from("rec1")));
    assert_eq!(entry.creation_progress, None);
}

#[tokio::test]
async fn record_context_re_points_the_session_before_routing() {
    let store = Arc::new(InMemoryStore::default());
    let (state, _llm, _dir) = test_state(
        vec![
            text_response("general_query"),
            text_response("Working on Gamma Industries now."),
        ],
        store,
    );

    let outcome = run_turn(
        &state,
        TurnInput {
            session_key: "main".into(),
            messages: vec![ChatMessage::user("what can you do?")],
            record: Some(RecordContext {
                id: "rec77".into(),
                name: Some("Gamma Industries".into()),
            }),
        },
    )
    .await
    .unwrap();

    assert!(outcome
        .logs
        .contains("selected record changed to Gamma Industries (rec77)"));
    let entry = state.sessions.get("main").unwrap();
    assert_eq!(entry.active_record, Some(RecordId::from("rec77")));
    assert_eq!(entry.creation_progress, None);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Failure handling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn provider_failure_resolves_to_an_apologetic_reply() {
    let store = Arc::new(InMemoryStore::default());
    let (state, _llm, _dir) = test_state(Vec::new(), store);

    let outcome = run_turn(&state, user_turn("main", "hello")).await.unwrap();

    assert!(outcome
        .reply
        .starts_with("There's a problem executing the request."));
    assert!(outcome.logs.contains("turn failed"));
    assert_eq!(outcome.messages.last().unwrap().role, ChatRole::Assistant);
}

#[tokio::test]
async fn empty_history_is_an_error() {
    let store = Arc::new(InMemoryStore::default());
    let (state, _llm, _dir) = test_state(Vec::new(), store);

    let result = run_turn(
        &state,
        TurnInput {
            session_key: "main".into(),
            messages: Vec::new(),
            record: None,
        },
    )
    .await;

    assert!(result.is_err());
}
