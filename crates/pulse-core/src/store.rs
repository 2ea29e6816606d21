//! The `DraftStore` trait — the minimal persistence contract.
//!
//! The trait is implemented by storage backends (`pulse-store-sqlite`,
//! `pulse-client`'s HTTP store). The session protocol depends on this
//! abstraction, not on any concrete backend.
//!
//! The backend is treated purely as a keyed upsert/query service: at most
//! one row exists per session id, saves overwrite the whole row, and
//! last-write-wins is the only concurrency control.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{SessionId, draft::DraftRecord};

/// A persisted row together with its storage id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResponse {
  pub id:     Uuid,
  pub record: DraftRecord,
}

/// Abstraction over a survey response store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait DraftStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert-or-update the draft row for `record`'s session id and return
  /// the row id. The whole row is overwritten; there is no field-level
  /// merge and no version history.
  fn upsert_draft(
    &self,
    record: DraftRecord,
  ) -> impl Future<Output = Result<Uuid, Self::Error>> + Send + '_;

  /// Look up the draft row for a session, filtered to `is_draft = true`.
  /// Returns `None` for sessions with no draft (including already-submitted
  /// ones).
  fn find_draft<'a>(
    &'a self,
    session_id: &'a SessionId,
  ) -> impl Future<Output = Result<Option<StoredResponse>, Self::Error>>
  + Send
  + 'a;

  /// Insert a final (non-draft) row directly. Used at submit time only when
  /// no draft row exists for the session.
  fn insert_final(
    &self,
    record: DraftRecord,
  ) -> impl Future<Output = Result<Uuid, Self::Error>> + Send + '_;

  /// Overwrite an existing row in place, finalising it. Used at submit time
  /// when a draft row already exists.
  fn update_final(
    &self,
    response_id: Uuid,
    record: DraftRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Look up the row for a session regardless of draft status. Serves the
  /// self-service data-access flow.
  fn find_response<'a>(
    &'a self,
    session_id: &'a SessionId,
  ) -> impl Future<Output = Result<Option<StoredResponse>, Self::Error>>
  + Send
  + 'a;

  /// Delete the row for a session, if any. Serves the self-service erasure
  /// flow; the session protocol itself never calls this.
  fn delete_session<'a>(
    &'a self,
    session_id: &'a SessionId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}
