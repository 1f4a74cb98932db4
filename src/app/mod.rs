//! Explicit application state and the action dispatcher.
//!
//! The interactive front-end owns no state of its own: everything lives in
//! [`AppState`], and every user action maps to one [`Session`] method. This
//! keeps the whole application testable without a terminal attached.

pub mod pagination;
mod session;
mod state;

pub use session::{BuildReport, Session, SessionError};
pub use state::{AppState, HISTORY_DISPLAY_LIMIT, Panel};

/// Placeholder summary shown next to each supporting passage.
///
/// Summarization is deliberately not implemented; the marker makes that
/// visible instead of pretending an algorithm exists.
pub fn chunk_summary(_text: &str) -> &'static str {
    "(summary not implemented)"
}
