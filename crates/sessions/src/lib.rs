//! Session management for Wonderland.
//!
//! Implements the `sessionKey` model: every chat request names a key
//! (defaulting to `"main"`), and the gateway owns a JSON-persisted map
//! from key to session state — the active record pointer and the
//! guided-creation progress that make multi-turn account flows stick.

pub mod store;

pub use store::{SessionEntry, SessionStore};
