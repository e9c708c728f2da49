//! `wl-airtable` — record store client crate for Wonderland.
//!
//! Provides the [`RecordStore`] trait that abstracts over the hosted
//! account table, a production REST implementation ([`RestRecordStore`]),
//! typed DTOs matching the REST wire format, and a small [`Filter`]
//! builder for equality/AND query formulas.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use wl_airtable::{Filter, RecordQuery, RecordStore, RestRecordStore};
//! use wl_domain::config::AirtableConfig;
//!
//! # async fn example() -> wl_domain::error::Result<()> {
//! let cfg = AirtableConfig {
//!     base_id: "appXXXXXXXXXXXXXX".into(),
//!     ..AirtableConfig::default()
//! };
//! let store = RestRecordStore::new(&cfg)?;
//!
//! let drafts = store
//!     .query(RecordQuery::filtered(
//!         Filter::eq("Name", "Acme Corp").and(Filter::eq("Status", "Draft")),
//!     ))
//!     .await?;
//!
//! println!("found {} drafts", drafts.len());
//! # Ok(())
//! # }
//! ```

pub mod filter;
pub mod rest;
pub mod store;
pub mod types;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use filter::Filter;
pub use rest::{from_reqwest, RestRecordStore};
pub use store::{FieldMap, RecordQuery, RecordStore, StoredRecord};
pub use types::{RecordDto, RecordListDto, RecordWriteBody};

use std::sync::Arc;

use wl_domain::config::AirtableConfig;
use wl_domain::error::Result;

/// Build the record store from config.
///
/// REST is the only transport today; the factory keeps callers on the
/// [`RecordStore`] trait so test doubles and future transports slot in
/// without touching the gateway.
pub fn create_store(cfg: &AirtableConfig) -> Result<Arc<dyn RecordStore>> {
    let store = RestRecordStore::new(cfg)?;
    tracing::info!(
        base_url = %cfg.base_url,
        table = %cfg.table,
        "record store ready"
    );
    Ok(Arc::new(store))
}
