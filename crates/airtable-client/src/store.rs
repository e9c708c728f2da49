//! The `RecordStore` trait defines the interface for all account-table
//! backends (Airtable REST, mock/test).

use async_trait::async_trait;
use wl_domain::account::RecordId;
use wl_domain::error::Result;

use crate::filter::Filter;

/// Field name → value map in the store's wire shape.
///
/// Keys are the table's column names exactly as the store spells them
/// (`"Client Company Name"`, not a Rust-friendly rename).
pub type FieldMap = serde_json::Map<String, serde_json::Value>;

/// One record as returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: RecordId,
    pub fields: FieldMap,
    pub created_time: Option<String>,
}

impl StoredRecord {
    /// Read a field as a string slice, when present and a string.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_str())
    }
}

/// Options for a table query, mirroring the store's `select` surface.
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    /// Equality/AND filter; `None` returns every record.
    pub filter: Option<Filter>,
    /// Restrict returned field columns; empty returns all fields.
    pub fields: Vec<String>,
    /// Stop after this many records; `None` follows pagination to the end.
    pub max_records: Option<u32>,
}

impl RecordQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filtered(filter: Filter) -> Self {
        Self {
            filter: Some(filter),
            ..Self::default()
        }
    }

    /// Project the result down to the named columns.
    pub fn select(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }
}

/// Abstraction over the account table API surface.
///
/// Implementations are scoped to one table: the table name comes from
/// config, not from call sites. All methods return
/// `wl_domain::error::Result`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch one record by id (GET /{table}/{id}).
    async fn find(&self, id: &RecordId) -> Result<StoredRecord>;

    /// Create a record with the given fields (POST /{table}).
    async fn create(&self, fields: FieldMap) -> Result<StoredRecord>;

    /// Patch the named fields on an existing record (PATCH /{table}/{id}).
    async fn update(&self, id: &RecordId, fields: FieldMap) -> Result<StoredRecord>;

    /// Run a filtered/projected query, following pagination (GET /{table}).
    async fn query(&self, query: RecordQuery) -> Result<Vec<StoredRecord>>;
}
