//! The per-turn conversation orchestrator.
//!
//! One call per user message: classify intent, route to the account
//! path (extract, reconcile, collect) or the general path (persona
//! reply or tool dispatch), and return the reply with its LogTrail.
//! Provider and store failures inside the turn resolve to an apologetic
//! assistant message; the HTTP surface only sees `Err` for requests it
//! could not even start on.

use wl_domain::account::{CreationStage, MODIFY_STATUSES};
use wl_domain::chat::{ChatMessage, LogTrail};
use wl_domain::{AccountFields, Error, RecordId, Result};
use wl_providers::ChatRequest;

use crate::runtime::collector::{self, COMPLETION_REPLY};
use crate::runtime::extract::extract_fields;
use crate::runtime::intent::{classify, Intent};
use crate::runtime::normalize::{live_industry_options, normalize};
use crate::runtime::prompts::{self, NAME_GIVE_UP, NAME_PROMPT, PERSONA_PROMPT};
use crate::runtime::reconcile::reconcile_draft;
use crate::runtime::tools::{build_tool_definitions, dispatch_action};
use crate::runtime::{RecordContext, TurnInput, TurnOutcome};
use crate::state::AppState;

/// Run one conversation turn.
pub async fn run_turn(state: &AppState, input: TurnInput) -> Result<TurnOutcome> {
    let TurnInput {
        session_key,
        mut messages,
        record,
    } = input;

    let last = messages
        .last()
        .ok_or_else(|| Error::Other("no user message in request".into()))?;
    let user_message = last.content.clone();
    let prior = messages
        .len()
        .checked_sub(2)
        .and_then(|i| messages.get(i))
        .map(|m| m.content.clone());

    let mut logs = LogTrail::new();

    // 1. Resolve the session for this key.
    let (entry, is_new) = state.sessions.resolve_or_create(&session_key);
    if is_new {
        logs.push(format!("[SESSION] new session '{session_key}'"));
    }

    // 2. Honor the request's record context before routing: selecting a
    //    different record re-points the session and abandons any
    //    creation flow that was running against the old one.
    if let Some(context) = record.as_ref() {
        let selected = RecordId::from(context.id.clone());
        if entry.active_record.as_ref() != Some(&selected) {
            state
                .sessions
                .set_active_record(&session_key, Some(selected.clone()));
            state.sessions.set_progress(&session_key, None);
            let label = context.name.as_deref().unwrap_or(&context.id);
            logs.push(format!(
                "[SESSION] selected record changed to {label} ({selected})"
            ));
        }
    }

    // 3. Run the turn; failures inside become an apologetic reply.
    let reply = match run_turn_inner(
        state,
        &session_key,
        &user_message,
        prior.as_deref(),
        &messages,
        record.as_ref(),
        &mut logs,
    )
    .await
    {
        Ok(reply) => reply,
        Err(e) => {
            let tag = if matches!(e, Error::Store(_)) {
                "[STORE]"
            } else {
                "[LLM]"
            };
            logs.push(format!("{tag} turn failed: {e}"));
            tracing::warn!(session_key = %session_key, error = %e, "turn failed");
            prompts::apology(&e.to_string())
        }
    };

    messages.push(ChatMessage::assistant(&reply));
    state.sessions.touch(&session_key);

    Ok(TurnOutcome {
        reply,
        messages,
        logs,
    })
}

async fn run_turn_inner(
    state: &AppState,
    session_key: &str,
    user_message: &str,
    prior_message: Option<&str>,
    history: &[ChatMessage],
    record: Option<&RecordContext>,
    logs: &mut LogTrail,
) -> Result<String> {
    let intent = classify(state, session_key, user_message, logs).await?;

    // Continuation answers ("here is my website...") classify as
    // general but belong to a running creation flow.
    let flow_active = state
        .sessions
        .get(session_key)
        .is_some_and(|entry| entry.creation_flow_active());

    if intent == Intent::AccountCreation || flow_active {
        account_path(state, session_key, user_message, prior_message, logs).await
    } else {
        general_path(state, session_key, history, record, logs).await
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Account path
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

async fn account_path(
    state: &AppState,
    session_key: &str,
    user_message: &str,
    prior_message: Option<&str>,
    logs: &mut LogTrail,
) -> Result<String> {
    let extracted = extract_fields(state, user_message, prior_message, logs).await?;

    let entry = state.sessions.get(session_key);
    let active = entry.as_ref().and_then(|e| e.active_record.clone());

    let (record_id, stage) = match active {
        Some(record_id) => {
            apply_extracted(state, &record_id, &extracted, logs).await;
            (record_id, entry.and_then(|e| e.creation_progress))
        }
        None => {
            if extracted.candidate_name().is_none() {
                return Ok(prompt_for_name(state, session_key, logs));
            }
            let outcome = reconcile_draft(state.store.as_ref(), &extracted, logs).await?;
            state
                .sessions
                .set_active_record(session_key, Some(outcome.record_id.clone()));
            state
                .sessions
                .set_progress(session_key, Some(CreationStage::Links));
            state.sessions.set_name_prompts(session_key, 0);
            logs.push(format!(
                "[SESSION] active record set to {}",
                outcome.record_id
            ));
            (outcome.record_id, Some(CreationStage::Links))
        }
    };

    match stage {
        Some(stage) => {
            let step = collector::step(
                state.store.as_ref(),
                &record_id,
                stage,
                &extracted,
                user_message,
                logs,
            )
            .await;
            state.sessions.set_progress(session_key, step.next_stage);
            Ok(step.reply)
        }
        None => Ok(COMPLETION_REPLY.to_string()),
    }
}

/// Two strikes: ask once, then give up and reset the counter so the
/// next attempt starts fresh.
fn prompt_for_name(state: &AppState, session_key: &str, logs: &mut LogTrail) -> String {
    let prompts = state
        .sessions
        .get(session_key)
        .map(|e| e.name_prompts)
        .unwrap_or(0);
    if prompts == 0 {
        state.sessions.set_name_prompts(session_key, 1);
        logs.push("[LLM] no account name detected, asking the user");
        NAME_PROMPT.to_string()
    } else {
        state.sessions.set_name_prompts(session_key, 0);
        logs.push("[LLM] no account name detected after retry, giving up");
        NAME_GIVE_UP.to_string()
    }
}

/// Write extracted fields through to the active record.  Status and
/// Industry are normalized first; store errors are logged and the turn
/// continues.
async fn apply_extracted(
    state: &AppState,
    record_id: &RecordId,
    extracted: &AccountFields,
    logs: &mut LogTrail,
) {
    let mut fields = extracted.clone();
    if let Some(raw) = fields.status.take() {
        let normalized = normalize(&raw, &MODIFY_STATUSES);
        if normalized != raw {
            logs.push(format!("[TOOL] Status '{raw}' normalized to '{normalized}'"));
        }
        fields.status = Some(normalized);
    }
    if let Some(raw) = fields.industry.take() {
        match live_industry_options(state.store.as_ref()).await {
            Ok(options) if !options.is_empty() => {
                let normalized = normalize(&raw, &options);
                if normalized != raw {
                    logs.push(format!(
                        "[TOOL] Industry '{raw}' normalized to '{normalized}'"
                    ));
                }
                fields.industry = Some(normalized);
            }
            Ok(_) => fields.industry = Some(raw),
            Err(e) => {
                logs.push(format!("[STORE] industry options query failed: {e}"));
                fields.industry = Some(raw);
            }
        }
    }

    let map = fields.to_field_map();
    if map.is_empty() {
        return;
    }
    let keys: Vec<String> = map.keys().cloned().collect();
    match state.store.update(record_id, map).await {
        Ok(_) => logs.push(format!("[STORE] applied {}", keys.join(", "))),
        Err(e) => logs.push(format!("[STORE] update failed (continuing): {e}")),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// General path
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

async fn general_path(
    state: &AppState,
    session_key: &str,
    history: &[ChatMessage],
    record: Option<&RecordContext>,
    logs: &mut LogTrail,
) -> Result<String> {
    let mut system = PERSONA_PROMPT.to_string();
    if let Some(active) = state
        .sessions
        .get(session_key)
        .and_then(|e| e.active_record)
    {
        // The model needs the record id to target modify/delete/switch.
        let context_name = record
            .filter(|c| c.id == active.as_str())
            .and_then(|c| c.name.as_deref());
        match context_name {
            Some(name) => {
                system.push_str(&format!("\n\nSelected Account: {name} (record id {active})"));
            }
            None => {
                system.push_str(&format!("\n\nSelected Account record id: {active}"));
            }
        }
    }

    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ChatMessage::system(system));
    messages.extend(history.iter().cloned());

    let response = state
        .llm
        .chat(ChatRequest::with_tools(messages, build_tool_definitions()))
        .await?;

    if let Some(call) = response.tool_calls.first() {
        logs.push(format!("[TOOL] model invoked {}", call.tool_name));
        dispatch_action(state, session_key, call, logs).await
    } else {
        logs.push("[LLM] replied in natural language");
        Ok(response.content)
    }
}
