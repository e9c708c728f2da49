//! REST implementation of [`RecordStore`].
//!
//! `RestRecordStore` wraps a `reqwest::Client` and translates every
//! trait method into the corresponding HTTP call against the hosted
//! account table, with automatic retry + exponential back-off on
//! transient (5xx / timeout) failures.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use wl_domain::account::RecordId;
use wl_domain::config::AirtableConfig;
use wl_domain::error::{Error, Result};
use wl_domain::trace::TraceEvent;

use crate::store::{FieldMap, RecordQuery, RecordStore, StoredRecord};
use crate::types::{RecordDto, RecordListDto, RecordWriteBody};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A REST-based client for one table of the hosted record store.
///
/// Created once and reused for the lifetime of the process. The
/// underlying `reqwest::Client` maintains a connection pool.
#[derive(Debug, Clone)]
pub struct RestRecordStore {
    http: Client,
    base_url: String,
    api_key: String,
    base_id: String,
    table: String,
    timeout: Duration,
    max_retries: u32,
}

impl RestRecordStore {
    /// The configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The configured table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Build a new client from the shared `AirtableConfig`.
    ///
    /// The API key comes from the environment variable named by
    /// `cfg.api_key_env`; an unset variable or empty `base_id` is a
    /// startup error.
    pub fn new(cfg: &AirtableConfig) -> Result<Self> {
        let api_key = std::env::var(&cfg.api_key_env).map_err(|_| {
            Error::Auth(format!(
                "environment variable '{}' not set or not valid UTF-8",
                cfg.api_key_env
            ))
        })?;
        if cfg.base_id.is_empty() {
            return Err(Error::Config("airtable.base_id is not configured".into()));
        }

        let timeout = Duration::from_secs(cfg.timeout_secs);
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        let base_url = cfg.base_url.trim_end_matches('/').to_owned();

        Ok(Self {
            http,
            base_url,
            api_key,
            base_id: cfg.base_id.clone(),
            table: cfg.table.clone(),
            timeout,
            max_retries: cfg.max_retries,
        })
    }

    // ── request helpers ──────────────────────────────────────────────

    /// Decorate a `RequestBuilder` with auth headers.
    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        rb.header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// Build the table URL: `{base_url}/{base_id}/{table}`.
    fn table_url(&self) -> String {
        format!("{}/{}/{}", self.base_url, self.base_id, self.table)
    }

    /// Build a record URL: `{base_url}/{base_id}/{table}/{record_id}`.
    fn record_url(&self, id: &RecordId) -> String {
        format!("{}/{}", self.table_url(), id.as_str())
    }

    // ── retry engine ─────────────────────────────────────────────────

    /// Execute a request with retry + exponential back-off on transient errors.
    ///
    /// * Retries on 5xx status codes and on timeouts.
    /// * Does **not** retry on 4xx (client errors are permanent).
    /// * Emits a `TraceEvent::StoreCall` after every attempt.
    async fn execute_with_retry(
        &self,
        endpoint: &str,
        build_request: impl Fn() -> RequestBuilder,
    ) -> Result<Response> {
        let mut last_err: Option<Error> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = Duration::from_millis(100 * 2u64.pow(attempt - 1));
                tokio::time::sleep(backoff).await;
            }

            let start = Instant::now();
            let rb = self.decorate(build_request());
            let result = rb.send().await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(resp) => {
                    let status = resp.status().as_u16();

                    TraceEvent::StoreCall {
                        endpoint: endpoint.to_owned(),
                        status,
                        duration_ms,
                    }
                    .emit();

                    if resp.status().is_server_error() {
                        // 5xx — transient, retry
                        let body = resp.text().await.unwrap_or_default();
                        last_err = Some(Error::Store(format!(
                            "{endpoint} returned {status}: {body}"
                        )));
                        continue;
                    }

                    if resp.status().is_client_error() {
                        // 4xx — permanent, do NOT retry
                        let resp_status = resp.status();
                        let body = resp.text().await.unwrap_or_default();
                        if resp_status == StatusCode::UNAUTHORIZED
                            || resp_status == StatusCode::FORBIDDEN
                        {
                            return Err(Error::Auth(format!(
                                "{endpoint} auth failed ({status}): {body}"
                            )));
                        }
                        return Err(Error::Store(format!(
                            "{endpoint} returned {status}: {body}"
                        )));
                    }

                    return Ok(resp);
                }
                Err(e) => {
                    let status = e.status().map(|s| s.as_u16()).unwrap_or(0);

                    TraceEvent::StoreCall {
                        endpoint: endpoint.to_owned(),
                        status,
                        duration_ms,
                    }
                    .emit();

                    last_err = Some(from_reqwest(e));
                    // Timeouts and connection errors are transient — retry
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| Error::Store(format!("{endpoint}: all retries exhausted"))))
    }
}

// ── query string builder ─────────────────────────────────────────────

/// Build the query parameters for one page of a table query.
fn page_params(query: &RecordQuery, offset: Option<&str>) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = Vec::new();

    if let Some(ref filter) = query.filter {
        params.push(("filterByFormula".into(), filter.render()));
    }
    for field in &query.fields {
        params.push(("fields[]".into(), field.clone()));
    }
    if let Some(max) = query.max_records {
        params.push(("maxRecords".into(), max.to_string()));
    }
    if let Some(cursor) = offset {
        params.push(("offset".into(), cursor.to_owned()));
    }

    params
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
impl RecordStore for RestRecordStore {
    async fn find(&self, id: &RecordId) -> Result<StoredRecord> {
        let url = self.record_url(id);
        let endpoint = format!("GET /{}/{}", self.table, id.as_str());
        let resp = self
            .execute_with_retry(&endpoint, || self.http.get(&url))
            .await?;

        let body = resp.text().await.map_err(from_reqwest)?;
        let dto: RecordDto = serde_json::from_str(&body)
            .map_err(|e| Error::Store(format!("failed to parse record response: {e}: {body}")))?;
        Ok(dto.into())
    }

    async fn create(&self, fields: FieldMap) -> Result<StoredRecord> {
        let url = self.table_url();
        let endpoint = format!("POST /{}", self.table);
        let write = RecordWriteBody { fields };
        let resp = self
            .execute_with_retry(&endpoint, || self.http.post(&url).json(&write))
            .await?;

        let body = resp.text().await.map_err(from_reqwest)?;
        let dto: RecordDto = serde_json::from_str(&body)
            .map_err(|e| Error::Store(format!("failed to parse create response: {e}: {body}")))?;
        Ok(dto.into())
    }

    async fn update(&self, id: &RecordId, fields: FieldMap) -> Result<StoredRecord> {
        let url = self.record_url(id);
        let endpoint = format!("PATCH /{}/{}", self.table, id.as_str());
        let write = RecordWriteBody { fields };
        let resp = self
            .execute_with_retry(&endpoint, || self.http.patch(&url).json(&write))
            .await?;

        let body = resp.text().await.map_err(from_reqwest)?;
        let dto: RecordDto = serde_json::from_str(&body)
            .map_err(|e| Error::Store(format!("failed to parse update response: {e}: {body}")))?;
        Ok(dto.into())
    }

    async fn query(&self, query: RecordQuery) -> Result<Vec<StoredRecord>> {
        let url = self.table_url();
        let endpoint = format!("GET /{}", self.table);
        let mut records: Vec<StoredRecord> = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let params = page_params(&query, offset.as_deref());
            let resp = self
                .execute_with_retry(&endpoint, || self.http.get(&url).query(&params))
                .await?;

            let body = resp.text().await.map_err(from_reqwest)?;
            let page: RecordListDto = serde_json::from_str(&body)
                .map_err(|e| Error::Store(format!("failed to parse list response: {e}: {body}")))?;

            records.extend(page.records.into_iter().map(StoredRecord::from));

            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(records)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Error conversion helper
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Convert a `reqwest::Error` into a domain `Error`.
///
/// Timeout errors become `Error::Timeout`; everything else becomes
/// `Error::Http`.
pub fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;

    #[test]
    fn page_params_include_filter_and_projection() {
        let query = RecordQuery::filtered(Filter::eq("Status", "Draft")).select(&["Name"]);
        let params = page_params(&query, None);

        assert!(params.contains(&("filterByFormula".into(), "{Status} = 'Draft'".into())));
        assert!(params.contains(&("fields[]".into(), "Name".into())));
        assert!(!params.iter().any(|(k, _)| k == "offset"));
    }

    #[test]
    fn page_params_carry_cursor_on_later_pages() {
        let query = RecordQuery::all();
        let params = page_params(&query, Some("itrAbc123"));

        assert_eq!(params, vec![("offset".to_string(), "itrAbc123".to_string())]);
    }
}
