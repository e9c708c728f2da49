use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Record store (Airtable)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirtableConfig {
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Environment variable holding the Airtable API key.
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    /// The Airtable base holding the Accounts table.  No usable
    /// default — must be configured.
    #[serde(default)]
    pub base_id: String,
    #[serde(default = "d_table")]
    pub table: String,
    #[serde(default = "d_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "d_max_retries")]
    pub max_retries: u32,
}

impl Default for AirtableConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            api_key_env: d_api_key_env(),
            base_id: String::new(),
            table: d_table(),
            timeout_secs: d_timeout_secs(),
            max_retries: d_max_retries(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_base_url() -> String {
    "https://api.airtable.com/v0".into()
}
fn d_api_key_env() -> String {
    "AIRTABLE_API_KEY".into()
}
fn d_table() -> String {
    "Accounts".into()
}
fn d_timeout_secs() -> u64 {
    30
}
fn d_max_retries() -> u32 {
    3
}
