//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Answer maps and the
//! feedback blob are stored as compact JSON text. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use pulse_core::{
  SessionId,
  draft::{DraftContent, DraftRecord, FeedbackBlob},
  store::StoredResponse,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw strings read directly from a `responses` row.
pub struct RawResponse {
  pub response_id:            String,
  pub session_id:             String,
  pub is_draft:               bool,
  pub demographics_json:      String,
  pub ratings_json:           String,
  pub multiselects_json:      String,
  pub texts_json:             String,
  pub feedback_json:          String,
  pub collaboration_feedback: String,
  pub additional_comments:    String,
  pub elapsed_seconds:        u64,
  pub last_autosave_at:       Option<String>,
  pub submitted_at:           Option<String>,
}

impl RawResponse {
  pub fn into_stored(self) -> Result<StoredResponse> {
    let feedback: FeedbackBlob = serde_json::from_str(&self.feedback_json)?;

    let content = DraftContent {
      session_id:             SessionId::new(self.session_id),
      demographics:           serde_json::from_str(&self.demographics_json)?,
      ratings:                serde_json::from_str(&self.ratings_json)?,
      multiselects:           serde_json::from_str(&self.multiselects_json)?,
      texts:                  serde_json::from_str(&self.texts_json)?,
      feedback,
      collaboration_feedback: self.collaboration_feedback,
      additional_comments:    self.additional_comments,
    };

    let record = DraftRecord {
      content,
      is_draft: self.is_draft,
      elapsed_seconds: self.elapsed_seconds,
      last_autosave_at: self
        .last_autosave_at
        .as_deref()
        .map(decode_dt)
        .transpose()?,
      submitted_at: self
        .submitted_at
        .as_deref()
        .map(decode_dt)
        .transpose()?,
    };

    Ok(StoredResponse {
      id: decode_uuid(&self.response_id)?,
      record,
    })
  }
}

/// Column values ready to bind for an insert/update of a [`DraftRecord`].
pub struct EncodedRecord {
  pub session_id:             String,
  pub is_draft:               bool,
  pub demographics_json:      String,
  pub ratings_json:           String,
  pub multiselects_json:      String,
  pub texts_json:             String,
  pub feedback_json:          String,
  pub collaboration_feedback: String,
  pub additional_comments:    String,
  pub elapsed_seconds:        u64,
  pub last_autosave_at:       Option<String>,
  pub submitted_at:           Option<String>,
}

pub fn encode_record(record: &DraftRecord) -> Result<EncodedRecord> {
  let content = &record.content;
  Ok(EncodedRecord {
    session_id:             content.session_id.as_str().to_owned(),
    is_draft:               record.is_draft,
    demographics_json:      serde_json::to_string(&content.demographics)?,
    ratings_json:           serde_json::to_string(&content.ratings)?,
    multiselects_json:      serde_json::to_string(&content.multiselects)?,
    texts_json:             serde_json::to_string(&content.texts)?,
    feedback_json:          serde_json::to_string(&content.feedback)?,
    collaboration_feedback: content.collaboration_feedback.clone(),
    additional_comments:    content.additional_comments.clone(),
    elapsed_seconds:        record.elapsed_seconds,
    last_autosave_at:       record.last_autosave_at.map(encode_dt),
    submitted_at:           record.submitted_at.map(encode_dt),
  })
}
