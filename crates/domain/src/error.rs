/// Shared error type used across all Wonderland crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("provider {provider}: {message}")]
    Provider { provider: String, message: String },

    #[error("record store: {0}")]
    Store(String),

    /// Identity-guard rejection.  The message names both ids so the
    /// user-facing reply can surface exactly which record was requested
    /// and which one is active.
    #[error("operation targets record {target} but the active record is {active}")]
    RecordMismatch { target: String, active: String },

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("config: {0}")]
    Config(String),

    #[error("auth: {0}")]
    Auth(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a [`Error::RecordMismatch`] from a target id and the session's
    /// active record, rendering a missing pointer as `(none)`.
    pub fn record_mismatch(target: impl Into<String>, active: Option<&str>) -> Self {
        Self::RecordMismatch {
            target: target.into(),
            active: active.unwrap_or("(none)").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_mismatch_names_both_ids() {
        let err = Error::record_mismatch("rec123", Some("rec999"));
        let msg = err.to_string();
        assert!(msg.contains("rec123"));
        assert!(msg.contains("rec999"));
    }

    #[test]
    fn record_mismatch_renders_missing_active_pointer() {
        let err = Error::record_mismatch("rec123", None);
        let msg = err.to_string();
        assert!(msg.contains("rec123"));
        assert!(msg.contains("(none)"));
    }
}
