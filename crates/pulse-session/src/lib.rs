//! The client-side survey session protocol.
//!
//! [`SurveySession`] owns the in-memory response set for one survey attempt
//! and keeps it synchronised with a remote [`DraftStore`](pulse_core::store::DraftStore):
//! a debounced autosave collapses bursts of edits into single upserts, a
//! snapshot guard skips writes when nothing changed, and a one-shot restore
//! repopulates the answers when a session is resumed.
//!
//! Known limitation: two concurrent sessions with the same session id are
//! not guarded against. The storage upsert is last-write-wins over whole
//! rows, so one side's view simply goes stale; nothing is partially merged.

pub mod debounce;
pub mod error;
pub mod session;
pub mod status;

pub use error::Error;
pub use session::{
  RestoreOutcome, SaveOutcome, SessionConfig, SurveySession,
};
pub use status::AutosaveStatus;

#[cfg(test)]
mod tests;
