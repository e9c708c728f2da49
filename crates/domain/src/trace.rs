use serde::Serialize;

/// Structured trace events emitted across all Wonderland crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    StoreCall {
        endpoint: String,
        status: u16,
        duration_ms: u64,
    },
    LlmRequest {
        provider: String,
        model: String,
        attempt: u32,
        status: u16,
        duration_ms: u64,
        prompt_tokens: Option<u32>,
        completion_tokens: Option<u32>,
    },
    SessionResolved {
        session_key: String,
        session_id: String,
        is_new: bool,
    },
    IntentClassified {
        session_key: String,
        label: String,
        recognized: bool,
    },
    DraftReconciled {
        record_id: String,
        name: String,
        reused: bool,
    },
    StageAdvanced {
        record_id: String,
        from: u8,
        to: Option<u8>,
    },
    GuardRejected {
        target: String,
        active: String,
    },
    ActionDispatched {
        tool_name: String,
        record_id: Option<String>,
        ok: bool,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "wl_event");
    }
}
