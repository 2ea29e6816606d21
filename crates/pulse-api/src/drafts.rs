//! Handlers for `/drafts` endpoints — the autosave path.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `PUT`  | `/drafts/:session_id` | Body: [`DraftRecord`]; upsert, returns the row id |
//! | `GET`  | `/drafts/:session_id` | The draft row, 404 if none (or already final) |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use pulse_core::{
  SessionId,
  draft::DraftRecord,
  store::{DraftStore, StoredResponse},
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct UpsertReply {
  pub draft_id: Uuid,
}

/// `PUT /drafts/:session_id` — insert-or-update the draft row.
///
/// The body's session id must match the path, and the record must be a
/// draft; finalisation goes through `/responses`.
pub async fn upsert<S>(
  State(store): State<Arc<S>>,
  Path(session_id): Path<String>,
  Json(record): Json<DraftRecord>,
) -> Result<Json<UpsertReply>, ApiError>
where
  S: DraftStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if record.session_id().as_str() != session_id {
    return Err(ApiError::BadRequest(format!(
      "body session id {} does not match path {session_id}",
      record.session_id()
    )));
  }
  if !record.is_draft {
    return Err(ApiError::BadRequest(
      "drafts endpoint only accepts is_draft = true".to_owned(),
    ));
  }

  let draft_id = store
    .upsert_draft(record)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(UpsertReply { draft_id }))
}

/// `GET /drafts/:session_id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(session_id): Path<String>,
) -> Result<Json<StoredResponse>, ApiError>
where
  S: DraftStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let session_id = SessionId::new(session_id);
  let stored = store
    .find_draft(&session_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("no draft for session {session_id}"))
    })?;
  Ok(Json(stored))
}
