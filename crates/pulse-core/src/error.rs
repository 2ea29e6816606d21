//! Error types for `pulse-core`.

use thiserror::Error;

use crate::catalog::QuestionKind;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown question: {0}")]
  UnknownQuestion(String),

  #[error("question {id} has kind {actual:?}, expected {expected:?}")]
  KindMismatch {
    id:       String,
    expected: QuestionKind,
    actual:   QuestionKind,
  },

  /// An answer referenced an option or rating outside the question's
  /// allowed set. The source application stored such values silently; here
  /// they are rejected at the store boundary.
  #[error("invalid answer {value:?} for question {id}")]
  InvalidAnswerValue { id: String, value: String },

  #[error("question {0} does not allow N/A")]
  NotApplicableNotAllowed(String),

  #[error("duplicate question id: {0}")]
  DuplicateQuestionId(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
