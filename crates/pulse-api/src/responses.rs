//! Handlers for final responses and session self-service.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/responses` | Body: [`DraftRecord`] with `is_draft = false`; 201 |
//! | `PUT`    | `/responses/:id` | Finalise an existing row in place |
//! | `GET`    | `/sessions/:session_id` | Data-access export, draft or final |
//! | `DELETE` | `/sessions/:session_id` | Erasure; 404 if nothing stored |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
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
pub struct CreateReply {
  pub response_id: Uuid,
}

fn require_final(record: &DraftRecord) -> Result<(), ApiError> {
  if record.is_draft {
    return Err(ApiError::BadRequest(
      "responses endpoint only accepts is_draft = false".to_owned(),
    ));
  }
  Ok(())
}

/// `POST /responses` — direct insert of a final row (no prior draft).
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(record): Json<DraftRecord>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DraftStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  require_final(&record)?;
  let response_id = store
    .insert_final(record)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(CreateReply { response_id })))
}

/// `PUT /responses/:id` — finalise the draft row in place.
pub async fn finalize<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(record): Json<DraftRecord>,
) -> Result<StatusCode, ApiError>
where
  S: DraftStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  require_final(&record)?;
  store
    .update_final(id, record)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /sessions/:session_id` — everything stored for a session.
pub async fn export<S>(
  State(store): State<Arc<S>>,
  Path(session_id): Path<String>,
) -> Result<Json<StoredResponse>, ApiError>
where
  S: DraftStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let session_id = SessionId::new(session_id);
  let stored = store
    .find_response(&session_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("nothing stored for session {session_id}"))
    })?;
  Ok(Json(stored))
}

/// `DELETE /sessions/:session_id`
pub async fn erase<S>(
  State(store): State<Arc<S>>,
  Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: DraftStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let session_id = SessionId::new(session_id);
  let deleted = store
    .delete_session(&session_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if !deleted {
    return Err(ApiError::NotFound(format!(
      "nothing stored for session {session_id}"
    )));
  }
  tracing::info!(session = %session_id, "session erased");
  Ok(StatusCode::NO_CONTENT)
}
