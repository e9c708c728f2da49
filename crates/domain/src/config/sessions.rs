use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sessions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Session persistence configuration.  Each session carries the active
/// record pointer and the creation-flow stage for one conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Directory for on-disk state (`sessions.json` lives here).
    #[serde(default = "d_state_dir")]
    pub state_dir: PathBuf,
    /// Seconds between background flushes of the session store.
    #[serde(default = "d_flush_interval_secs")]
    pub flush_interval_secs: u64,
    /// Session key used when a request does not supply one.
    #[serde(default = "d_default_key")]
    pub default_key: String,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            state_dir: d_state_dir(),
            flush_interval_secs: d_flush_interval_secs(),
            default_key: d_default_key(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_state_dir() -> PathBuf {
    PathBuf::from(".wonderland")
}
fn d_flush_interval_secs() -> u64 {
    60
}
fn d_default_key() -> String {
    "main".into()
}
