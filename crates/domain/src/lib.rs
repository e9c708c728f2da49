//! Shared domain types for the Wonderland account agent.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`chat`] | Conversation messages, roles, and the per-turn [`chat::LogTrail`] |
//! | [`account`] | Account field vocabulary, record ids, status values, creation stages |
//! | [`action`] | The closed [`action::AccountAction`] set and the tool-call boundary |
//! | [`config`] | TOML configuration with serde defaults and validation |
//! | [`error`] | The shared [`Error`] type and [`Result`] alias |
//! | [`trace`] | Structured [`trace::TraceEvent`]s emitted through `tracing` |

pub mod account;
pub mod action;
pub mod chat;
pub mod config;
pub mod error;
pub mod trace;

pub use account::{AccountFields, CreationStage, RecordId};
pub use action::{AccountAction, ToolCall, ToolDefinition};
pub use chat::{ChatMessage, ChatRole, LogTrail};
pub use error::{Error, Result};
