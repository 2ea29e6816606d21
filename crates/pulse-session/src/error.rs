//! Error type for the session protocol.
//!
//! Autosave failures never appear here — they surface as
//! [`AutosaveStatus::Error`](crate::AutosaveStatus) and are retried by the
//! next organic edit. Only submission has a caller-visible failure mode.

use pulse_core::complete::MissingAnswers;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error<E>
where
  E: std::error::Error + 'static,
{
  /// Submit was attempted while the completion evaluator still reports
  /// missing answers. Fully recoverable; the breakdown drives the
  /// diagnostic shown to the user.
  #[error("survey is incomplete: {} answers missing", .0.total())]
  Incomplete(MissingAnswers),

  /// The session was already finalised; a session submits exactly once.
  #[error("survey was already submitted")]
  AlreadySubmitted,

  /// The final insert/update failed. Surfaced to the user; retry is
  /// manual (the survey is not marked complete locally).
  #[error("submit failed: {0}")]
  Submit(#[source] E),

  /// A persistence call exceeded the configured timeout.
  #[error("request timed out")]
  Timeout,
}
