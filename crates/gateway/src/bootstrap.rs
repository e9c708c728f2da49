//! AppState construction and background-task spawning extracted from `main.rs`.
//!
//! This module exposes two public functions that CLI commands (`serve`, `run`,
//! `chat`) share so they can boot the full runtime without an HTTP listener.

use std::sync::Arc;

use anyhow::Context;

use wl_airtable::create_store;
use wl_domain::config::{Config, ConfigSeverity};
use wl_providers::create_provider;
use wl_sessions::SessionStore;

use crate::state::AppState;

/// Validate config, initialize every subsystem and return a fully-wired
/// [`AppState`].  This is the shared "boot" path used by `serve`, `run` and
/// `chat`.
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── LLM provider ─────────────────────────────────────────────────
    let llm = create_provider(&config.llm).context("initializing LLM provider")?;

    // ── Record store ─────────────────────────────────────────────────
    let store = create_store(&config.airtable).context("initializing record store")?;

    // ── Session store ────────────────────────────────────────────────
    let sessions = Arc::new(
        SessionStore::new(&config.sessions.state_dir).context("initializing session store")?,
    );

    Ok(AppState {
        config,
        llm,
        store,
        sessions,
    })
}

/// Spawn the long-running background tokio tasks (periodic session flush).
///
/// Call this **after** [`build_app_state`] when running the HTTP server.
/// CLI one-shot commands (`run`) skip this and flush on exit instead.
pub fn spawn_background_tasks(state: &AppState) {
    // ── Periodic session flush ───────────────────────────────────────
    {
        let sessions = state.sessions.clone();
        let interval_secs = state.config.sessions.flush_interval_secs.max(1);
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(interval_secs));
            loop {
                interval.tick().await;
                if let Err(e) = sessions.flush() {
                    tracing::warn!(error = %e, "session store flush failed");
                }
            }
        });
    }
    tracing::info!("background tasks spawned");
}
