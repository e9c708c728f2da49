//! `wonderland run` — one-shot execution command.
//!
//! Sends a single message to the agent, prints the reply, and exits.
//! Useful for scripting, piping, and quick CLI interactions.

use std::sync::Arc;

use wl_domain::chat::ChatMessage;
use wl_domain::config::Config;

use crate::bootstrap;
use crate::runtime::{run_turn, TurnInput};

/// Execute a single agent turn and print the reply.
///
/// This is the entry point for `wonderland run "message"`.
pub async fn run(
    config: Arc<Config>,
    message: String,
    session_key: String,
    json_output: bool,
) -> anyhow::Result<()> {
    // 1. Boot the full runtime (without background tasks).
    let state = bootstrap::build_app_state(config)?;

    // 2. Build the turn input: a one-message history, no record context.
    let input = TurnInput {
        session_key,
        messages: vec![ChatMessage::user(message)],
        record: None,
    };

    // 3. Run the turn.
    let outcome = run_turn(&state, input).await?;

    // 4. Print the reply (JSON mode includes the LogTrail).
    if json_output {
        let json = serde_json::to_string_pretty(&serde_json::json!({
            "reply": outcome.reply,
            "logs": outcome.logs.entries(),
        }))
        .map_err(|e| anyhow::anyhow!("serializing output: {e}"))?;
        println!("{json}");
    } else {
        println!("{}", outcome.reply);
    }

    // 5. Flush the session store before exit.
    if let Err(e) = state.sessions.flush() {
        tracing::warn!(error = %e, "session store flush on exit failed");
    }

    Ok(())
}
