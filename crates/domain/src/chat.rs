use serde::{Deserialize, Serialize};

/// A message in the conversation.
///
/// Inbound requests carry only `user` and `assistant` roles; `system`
/// messages are built internally when talking to the language model and
/// never appear in the returned history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

// ── Convenience constructors ───────────────────────────────────────

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: text.into() }
    }
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: text.into() }
    }
    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: text.into() }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Log trail
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Append-only log of one orchestration run, returned alongside the
/// reply so callers can observe what the turn did.  Entries are never
/// consulted for control decisions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogTrail(Vec<String>);

impl LogTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        self.0.push(entry.into());
    }

    pub fn entries(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when any entry contains `needle` (used by tests and the
    /// doctor command, not by the orchestrator).
    pub fn contains(&self, needle: &str) -> bool {
        self.0.iter().any(|e| e.contains(needle))
    }
}

impl IntoIterator for LogTrail {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
