pub mod openai;
pub mod traits;
pub(crate) mod util;

// Re-exports for convenience.
pub use openai::OpenAiProvider;
pub use traits::{ChatRequest, ChatResponse, LlmProvider, Usage};
pub use util::resolve_api_key;

use std::sync::Arc;

use wl_domain::config::LlmConfig;
use wl_domain::error::Result;

/// Build the chat provider from config.
///
/// There is exactly one adapter today (OpenAI-compatible); the factory
/// exists so callers depend on [`LlmProvider`] rather than the concrete
/// type, and so a second adapter slots in without touching the gateway.
pub fn create_provider(cfg: &LlmConfig) -> Result<Arc<dyn LlmProvider>> {
    let provider = OpenAiProvider::new(cfg)?;
    tracing::info!(
        base_url = %cfg.base_url,
        model = %cfg.model,
        "chat provider ready"
    );
    Ok(Arc::new(provider))
}
