//! Account tool declarations and the action dispatcher.
//!
//! The general path offers the model four tools; an invocation comes
//! back through [`dispatch_action`], which translates it into an
//! [`AccountAction`] and runs it.  Apart from draft creation, failures
//! here resolve to a user-facing reply instead of aborting the turn.

use serde_json::json;
use wl_airtable::FieldMap;
use wl_domain::account::{CreationStage, MODIFY_STATUSES, STATUS_DELETED};
use wl_domain::action::{
    AccountAction, ToolCall, ToolDefinition, TOOL_CREATE_ACCOUNT, TOOL_DELETE_ACCOUNT,
    TOOL_MODIFY_ACCOUNT, TOOL_SWITCH_RECORD,
};
use wl_domain::chat::LogTrail;
use wl_domain::trace::TraceEvent;
use wl_domain::{Error, RecordId, Result};

use crate::runtime::collector::LINKS_QUESTION;
use crate::runtime::guard;
use crate::runtime::normalize::{live_industry_options, normalize};
use crate::runtime::prompts::NAME_PROMPT;
use crate::runtime::reconcile::reconcile_draft;
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tool declarations
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// JSON Schema properties for the account columns, wire names as keys.
fn field_properties() -> serde_json::Value {
    json!({
        "Name": {"type": "string", "description": "The account name. Usually the company name."},
        "Client Company Name": {"type": "string"},
        "Description": {"type": "string"},
        "Client URL": {"type": "string", "description": "The company website URL."},
        "Status": {"type": "string", "description": "One of: Active, Disabled, New."},
        "Industry": {"type": "string"},
        "Primary Contact Person": {"type": "string"},
        "About the Client": {"type": "string"},
        "Primary Objective": {"type": "string"},
        "Talking Points": {"type": "string"},
        "Contact Information": {"type": "string"},
        "Priority Image": {"type": "string"},
        "Instagram": {"type": "string"},
        "Facebook": {"type": "string"},
        "Blog": {"type": "string"},
        "Other Social Accounts": {"type": "string"}
    })
}

fn record_id_schema(description: &str) -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "recordId": {"type": "string", "description": description}
        },
        "required": ["recordId"]
    })
}

/// The four account tools offered on every general-path model call.
pub fn build_tool_definitions() -> Vec<ToolDefinition> {
    let mut modify_properties = field_properties();
    if let Some(props) = modify_properties.as_object_mut() {
        props.insert(
            "recordId".into(),
            json!({"type": "string", "description": "The record id of the account to modify."}),
        );
    }

    vec![
        ToolDefinition {
            name: TOOL_CREATE_ACCOUNT.into(),
            description: "Create a new account. Requires at least a name.".into(),
            parameters: json!({
                "type": "object",
                "properties": field_properties(),
                "required": ["Name"]
            }),
        },
        ToolDefinition {
            name: TOOL_MODIFY_ACCOUNT.into(),
            description: "Modify fields on the currently active account.".into(),
            parameters: json!({
                "type": "object",
                "properties": modify_properties,
                "required": ["recordId"]
            }),
        },
        ToolDefinition {
            name: TOOL_DELETE_ACCOUNT.into(),
            description: "Delete the currently active account.".into(),
            parameters: record_id_schema("The record id of the account to delete."),
        },
        ToolDefinition {
            name: TOOL_SWITCH_RECORD.into(),
            description: "Switch the conversation to a different account record.".into(),
            parameters: record_id_schema("The record id of the account to switch to."),
        },
    ]
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Dispatch
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn emit_dispatch(tool_name: &str, record_id: Option<&RecordId>, ok: bool) {
    TraceEvent::ActionDispatched {
        tool_name: tool_name.to_string(),
        record_id: record_id.map(|id| id.to_string()),
        ok,
    }
    .emit();
}

fn guard_reply(e: &Error) -> String {
    format!("I can't do that: {e}. Switch to that record first if you meant to work on it.")
}

/// Run a model tool invocation against the store and session.
///
/// Only draft creation failure is an `Err`: without a record the flow
/// has nothing to continue on.  Everything else returns `Ok` with a
/// reply explaining what went wrong.
pub async fn dispatch_action(
    state: &AppState,
    session_key: &str,
    call: &ToolCall,
    logs: &mut LogTrail,
) -> Result<String> {
    let action = match AccountAction::from_tool_call(call) {
        Ok(action) => action,
        Err(e) => {
            logs.push(format!(
                "[TOOL] rejected tool call '{}': {e}",
                call.tool_name
            ));
            emit_dispatch(&call.tool_name, None, false);
            return Ok(format!("I couldn't run that operation: {e}"));
        }
    };

    let active = state
        .sessions
        .get(session_key)
        .and_then(|entry| entry.active_record);

    match action {
        AccountAction::Create { fields } => {
            if fields.candidate_name().is_none() {
                logs.push("[LLM] no account name in create request, asking the user");
                state.sessions.set_name_prompts(session_key, 1);
                return Ok(NAME_PROMPT.to_string());
            }
            let outcome = reconcile_draft(state.store.as_ref(), &fields, logs).await?;
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
            emit_dispatch(TOOL_CREATE_ACCOUNT, Some(&outcome.record_id), true);
            Ok(LINKS_QUESTION.to_string())
        }

        AccountAction::Modify {
            record_id,
            mut fields,
        } => {
            if let Err(e) = guard::authorize(&record_id, active.as_ref()) {
                logs.push(format!("[GUARD] {e}"));
                emit_dispatch(TOOL_MODIFY_ACCOUNT, Some(&record_id), false);
                return Ok(guard_reply(&e));
            }

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
                        emit_dispatch(TOOL_MODIFY_ACCOUNT, Some(&record_id), false);
                        return Ok(format!("I couldn't update the account: {e}"));
                    }
                }
            }

            let map = fields.to_field_map();
            if map.is_empty() {
                return Ok("I didn't find any field changes to apply.".to_string());
            }
            let keys: Vec<String> = map.keys().cloned().collect();
            match state.store.update(&record_id, map).await {
                Ok(record) => {
                    state
                        .sessions
                        .set_active_record(session_key, Some(record.id.clone()));
                    logs.push(format!(
                        "[TOOL] modified {} on {}",
                        keys.join(", "),
                        record.id
                    ));
                    emit_dispatch(TOOL_MODIFY_ACCOUNT, Some(&record.id), true);
                    Ok(format!("Updated {} on the active account.", keys.join(", ")))
                }
                Err(e) => {
                    logs.push(format!("[STORE] modify failed: {e}"));
                    emit_dispatch(TOOL_MODIFY_ACCOUNT, Some(&record_id), false);
                    Ok(format!("I couldn't update the account: {e}"))
                }
            }
        }

        AccountAction::Delete { record_id } => {
            if let Err(e) = guard::authorize(&record_id, active.as_ref()) {
                logs.push(format!("[GUARD] {e}"));
                emit_dispatch(TOOL_DELETE_ACCOUNT, Some(&record_id), false);
                return Ok(guard_reply(&e));
            }

            // Soft delete: records are never destroyed, only re-statused.
            let mut map = FieldMap::new();
            map.insert("Status".into(), json!(STATUS_DELETED));
            match state.store.update(&record_id, map).await {
                Ok(_) => {
                    state.sessions.set_active_record(session_key, None);
                    state.sessions.set_progress(session_key, None);
                    logs.push(format!(
                        "[TOOL] deleted account {record_id} (Status -> Deleted)"
                    ));
                    emit_dispatch(TOOL_DELETE_ACCOUNT, Some(&record_id), true);
                    Ok("The account has been deleted.".to_string())
                }
                Err(e) => {
                    logs.push(format!("[STORE] delete failed: {e}"));
                    emit_dispatch(TOOL_DELETE_ACCOUNT, Some(&record_id), false);
                    Ok(format!("I couldn't delete the account: {e}"))
                }
            }
        }

        AccountAction::Switch { record_id } => match state.store.find(&record_id).await {
            Ok(record) => {
                state
                    .sessions
                    .set_active_record(session_key, Some(record.id.clone()));
                state.sessions.set_progress(session_key, None);
                let name = record.field_str("Name").unwrap_or("(unnamed)").to_string();
                logs.push(format!(
                    "[SESSION] switched to record {} ({name})",
                    record.id
                ));
                emit_dispatch(TOOL_SWITCH_RECORD, Some(&record.id), true);
                Ok(format!("Switched to account {name}."))
            }
            Err(e) => {
                logs.push(format!("[STORE] switch failed for {record_id}: {e}"));
                emit_dispatch(TOOL_SWITCH_RECORD, Some(&record_id), false);
                Ok(format!("I couldn't switch to that record: {e}"))
            }
        },
    }
}
