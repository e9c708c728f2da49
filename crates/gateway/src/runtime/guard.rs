//! Record-identity guard — the last check before any modify or delete.

use wl_domain::trace::TraceEvent;
use wl_domain::{Error, RecordId, Result};

/// Reject any operation whose target is not the session's active record,
/// including when no record is active.  A stale or hallucinated id from
/// the model must never mutate an unrelated record.
///
/// Rejection is fatal to the operation, not the conversation: callers
/// turn the error into a reply naming both ids and carry on.
pub fn authorize(target: &RecordId, active: Option<&RecordId>) -> Result<()> {
    match active {
        Some(active) if active == target => Ok(()),
        _ => {
            TraceEvent::GuardRejected {
                target: target.to_string(),
                active: active
                    .map(|a| a.to_string())
                    .unwrap_or_else(|| "(none)".into()),
            }
            .emit();
            Err(Error::record_mismatch(
                target.as_str(),
                active.map(RecordId::as_str),
            ))
        }
    }
}
