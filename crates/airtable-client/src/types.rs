//! Data Transfer Objects matching the store's REST wire format.
//!
//! Envelope keys use `camelCase` on the wire and `snake_case` in Rust
//! via `#[serde(rename_all = "camelCase")]`. The `fields` payload is
//! passed through untouched — its keys are the table's own column
//! names, which include spaces.

use serde::{Deserialize, Serialize};

use wl_domain::account::RecordId;

use crate::store::{FieldMap, StoredRecord};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Records
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One record envelope as returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDto {
    pub id: String,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub fields: FieldMap,
}

impl From<RecordDto> for StoredRecord {
    fn from(dto: RecordDto) -> Self {
        StoredRecord {
            id: RecordId(dto.id),
            fields: dto.fields,
            created_time: dto.created_time,
        }
    }
}

/// GET /{table} — response body (one page).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordListDto {
    pub records: Vec<RecordDto>,
    /// Opaque cursor; present when more pages follow.
    #[serde(default)]
    pub offset: Option<String>,
}

/// POST /{table} and PATCH /{table}/{id} — request body.
#[derive(Debug, Clone, Serialize)]
pub struct RecordWriteBody {
    pub fields: FieldMap,
}
