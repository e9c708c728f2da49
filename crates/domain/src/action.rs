use serde::{Deserialize, Serialize};

use crate::account::{AccountFields, RecordId};
use crate::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tool boundary types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A tool invocation returned by the language model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub call_id: String,
    pub tool_name: String,
    pub arguments: serde_json::Value,
}

/// Tool definition exposed to the language model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's parameters.
    pub parameters: serde_json::Value,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Account actions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub const TOOL_CREATE_ACCOUNT: &str = "createAccount";
pub const TOOL_MODIFY_ACCOUNT: &str = "modifyAccount";
pub const TOOL_DELETE_ACCOUNT: &str = "deleteAccount";
pub const TOOL_SWITCH_RECORD: &str = "switchRecord";

/// The closed set of account operations the agent can perform.  Model
/// output is translated into this enum at the boundary and dispatched
/// through a single exhaustive match; tool names never reach dispatch
/// as free-form strings.
#[derive(Debug, Clone, PartialEq)]
pub enum AccountAction {
    Create { fields: AccountFields },
    Modify { record_id: RecordId, fields: AccountFields },
    Delete { record_id: RecordId },
    Switch { record_id: RecordId },
}

#[derive(Debug, Deserialize)]
struct ModifyArgs {
    #[serde(rename = "recordId")]
    record_id: String,
    #[serde(flatten)]
    fields: AccountFields,
}

#[derive(Debug, Deserialize)]
struct RecordIdArgs {
    #[serde(rename = "recordId")]
    record_id: String,
}

impl AccountAction {
    /// Translate a model tool invocation into an action.  Unknown tool
    /// names and malformed arguments are errors, surfaced to the user
    /// as a failed operation rather than trusted as code.
    pub fn from_tool_call(call: &ToolCall) -> Result<AccountAction> {
        match call.tool_name.as_str() {
            TOOL_CREATE_ACCOUNT => {
                let fields = AccountFields::deserialize(&call.arguments)?;
                Ok(AccountAction::Create { fields })
            }
            TOOL_MODIFY_ACCOUNT => {
                let args = ModifyArgs::deserialize(&call.arguments)?;
                Ok(AccountAction::Modify {
                    record_id: RecordId(args.record_id),
                    fields: args.fields,
                })
            }
            TOOL_DELETE_ACCOUNT => {
                let args = RecordIdArgs::deserialize(&call.arguments)?;
                Ok(AccountAction::Delete { record_id: RecordId(args.record_id) })
            }
            TOOL_SWITCH_RECORD => {
                let args = RecordIdArgs::deserialize(&call.arguments)?;
                Ok(AccountAction::Switch { record_id: RecordId(args.record_id) })
            }
            other => Err(Error::UnknownTool(other.to_string())),
        }
    }

    /// The tool name this action corresponds to (for logging).
    pub fn tool_name(&self) -> &'static str {
        match self {
            AccountAction::Create { .. } => TOOL_CREATE_ACCOUNT,
            AccountAction::Modify { .. } => TOOL_MODIFY_ACCOUNT,
            AccountAction::Delete { .. } => TOOL_DELETE_ACCOUNT,
            AccountAction::Switch { .. } => TOOL_SWITCH_RECORD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str, arguments: serde_json::Value) -> ToolCall {
        ToolCall {
            call_id: "call_1".into(),
            tool_name: name.into(),
            arguments,
        }
    }

    #[test]
    fn create_call_translates_with_wire_field_names() {
        let action = AccountAction::from_tool_call(&call(
            TOOL_CREATE_ACCOUNT,
            json!({"Name": "Acme Corp", "Client URL": "http://acme.com"}),
        ))
        .unwrap();
        match action {
            AccountAction::Create { fields } => {
                assert_eq!(fields.name.as_deref(), Some("Acme Corp"));
                assert_eq!(fields.client_url.as_deref(), Some("http://acme.com"));
            }
            other => panic!("expected Create, got {other:?}"),
        }
    }

    #[test]
    fn modify_call_splits_record_id_from_fields() {
        let action = AccountAction::from_tool_call(&call(
            TOOL_MODIFY_ACCOUNT,
            json!({"recordId": "rec123", "Status": "active"}),
        ))
        .unwrap();
        match action {
            AccountAction::Modify { record_id, fields } => {
                assert_eq!(record_id.as_str(), "rec123");
                assert_eq!(fields.status.as_deref(), Some("active"));
            }
            other => panic!("expected Modify, got {other:?}"),
        }
    }

    #[test]
    fn delete_and_switch_require_record_id() {
        assert!(AccountAction::from_tool_call(&call(TOOL_DELETE_ACCOUNT, json!({}))).is_err());
        let action = AccountAction::from_tool_call(&call(
            TOOL_SWITCH_RECORD,
            json!({"recordId": "rec42"}),
        ))
        .unwrap();
        assert_eq!(action, AccountAction::Switch { record_id: "rec42".into() });
    }

    #[test]
    fn unknown_tool_is_rejected() {
        let err = AccountAction::from_tool_call(&call("dropTable", json!({}))).unwrap_err();
        assert!(matches!(err, Error::UnknownTool(name) if name == "dropTable"));
    }
}
