//! Wonderland gateway — HTTP surface, orchestrator runtime, and CLI.
//!
//! The `wonderland` binary lives in `main.rs`; this library target exists
//! so integration tests can drive the runtime directly.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod runtime;
pub mod state;
