//! [`SqliteStore`] — the SQLite implementation of [`DraftStore`].

use std::path::Path;

use pulse_core::{SessionId, draft::DraftRecord, store::{DraftStore, StoredResponse}};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  encode::{RawResponse, decode_uuid, encode_record, encode_uuid},
  schema::SCHEMA,
  Error, Result,
};

const RESPONSE_COLUMNS: &str = "response_id, session_id, is_draft, \
   demographics_json, ratings_json, multiselects_json, texts_json, \
   feedback_json, collaboration_feedback, additional_comments, \
   elapsed_seconds, last_autosave_at, submitted_at";

fn raw_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawResponse> {
  Ok(RawResponse {
    response_id:            row.get(0)?,
    session_id:             row.get(1)?,
    is_draft:               row.get(2)?,
    demographics_json:      row.get(3)?,
    ratings_json:           row.get(4)?,
    multiselects_json:      row.get(5)?,
    texts_json:             row.get(6)?,
    feedback_json:          row.get(7)?,
    collaboration_feedback: row.get(8)?,
    additional_comments:    row.get(9)?,
    elapsed_seconds:        row.get(10)?,
    last_autosave_at:       row.get(11)?,
    submitted_at:           row.get(12)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Pulse response store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn find_by_session(
    &self,
    session_id: &SessionId,
    drafts_only: bool,
  ) -> Result<Option<StoredResponse>> {
    let id_str = session_id.as_str().to_owned();
    let sql = if drafts_only {
      format!(
        "SELECT {RESPONSE_COLUMNS} FROM responses \
         WHERE session_id = ?1 AND is_draft = 1"
      )
    } else {
      format!("SELECT {RESPONSE_COLUMNS} FROM responses WHERE session_id = ?1")
    };

    let raw: Option<RawResponse> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], raw_from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawResponse::into_stored).transpose()
  }

  /// Write a full row with the given id, overwriting any row for the same
  /// session. Returns the id the row ended up with (the existing id is kept
  /// when the session already has a row).
  async fn write_row(&self, id: Uuid, record: &DraftRecord) -> Result<Uuid> {
    let encoded = encode_record(record)?;
    let id_str = encode_uuid(id);

    let final_id: String = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "INSERT INTO responses (
             response_id, session_id, is_draft,
             demographics_json, ratings_json, multiselects_json, texts_json,
             feedback_json, collaboration_feedback, additional_comments,
             elapsed_seconds, last_autosave_at, submitted_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
           ON CONFLICT(session_id) DO UPDATE SET
             is_draft               = excluded.is_draft,
             demographics_json      = excluded.demographics_json,
             ratings_json           = excluded.ratings_json,
             multiselects_json      = excluded.multiselects_json,
             texts_json             = excluded.texts_json,
             feedback_json          = excluded.feedback_json,
             collaboration_feedback = excluded.collaboration_feedback,
             additional_comments    = excluded.additional_comments,
             elapsed_seconds        = excluded.elapsed_seconds,
             last_autosave_at       = excluded.last_autosave_at,
             submitted_at           = excluded.submitted_at
           RETURNING response_id",
          rusqlite::params![
            id_str,
            encoded.session_id,
            encoded.is_draft,
            encoded.demographics_json,
            encoded.ratings_json,
            encoded.multiselects_json,
            encoded.texts_json,
            encoded.feedback_json,
            encoded.collaboration_feedback,
            encoded.additional_comments,
            encoded.elapsed_seconds,
            encoded.last_autosave_at,
            encoded.submitted_at,
          ],
          |row| row.get(0),
        )?)
      })
      .await?;

    decode_uuid(&final_id)
  }
}

// ─── DraftStore impl ─────────────────────────────────────────────────────────

impl DraftStore for SqliteStore {
  type Error = Error;

  async fn upsert_draft(&self, record: DraftRecord) -> Result<Uuid> {
    self.write_row(Uuid::new_v4(), &record).await
  }

  async fn find_draft(
    &self,
    session_id: &SessionId,
  ) -> Result<Option<StoredResponse>> {
    self.find_by_session(session_id, true).await
  }

  async fn insert_final(&self, record: DraftRecord) -> Result<Uuid> {
    let encoded = encode_record(&record)?;
    let id = Uuid::new_v4();
    let id_str = encode_uuid(id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO responses (
             response_id, session_id, is_draft,
             demographics_json, ratings_json, multiselects_json, texts_json,
             feedback_json, collaboration_feedback, additional_comments,
             elapsed_seconds, last_autosave_at, submitted_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
          rusqlite::params![
            id_str,
            encoded.session_id,
            encoded.is_draft,
            encoded.demographics_json,
            encoded.ratings_json,
            encoded.multiselects_json,
            encoded.texts_json,
            encoded.feedback_json,
            encoded.collaboration_feedback,
            encoded.additional_comments,
            encoded.elapsed_seconds,
            encoded.last_autosave_at,
            encoded.submitted_at,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(id)
  }

  async fn update_final(
    &self,
    response_id: Uuid,
    record: DraftRecord,
  ) -> Result<()> {
    let encoded = encode_record(&record)?;
    let id_str = encode_uuid(response_id);

    let updated: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE responses SET
             session_id             = ?2,
             is_draft               = ?3,
             demographics_json      = ?4,
             ratings_json           = ?5,
             multiselects_json      = ?6,
             texts_json             = ?7,
             feedback_json          = ?8,
             collaboration_feedback = ?9,
             additional_comments    = ?10,
             elapsed_seconds        = ?11,
             last_autosave_at       = ?12,
             submitted_at           = ?13
           WHERE response_id = ?1",
          rusqlite::params![
            id_str,
            encoded.session_id,
            encoded.is_draft,
            encoded.demographics_json,
            encoded.ratings_json,
            encoded.multiselects_json,
            encoded.texts_json,
            encoded.feedback_json,
            encoded.collaboration_feedback,
            encoded.additional_comments,
            encoded.elapsed_seconds,
            encoded.last_autosave_at,
            encoded.submitted_at,
          ],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::ResponseNotFound(response_id));
    }
    Ok(())
  }

  async fn find_response(
    &self,
    session_id: &SessionId,
  ) -> Result<Option<StoredResponse>> {
    self.find_by_session(session_id, false).await
  }

  async fn delete_session(&self, session_id: &SessionId) -> Result<bool> {
    let id_str = session_id.as_str().to_owned();

    let deleted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM responses WHERE session_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }
}
