//! Draft record — the denormalised persisted projection of a response set.
//!
//! One row per session, keyed by the session id. [`DraftContent`] is the
//! comparable half of the row: everything the autosave no-op guard diffs.
//! Volatile metadata (elapsed time, timestamps, the draft flag) lives on
//! [`DraftRecord`] outside the comparison, so two snapshots taken around a
//! pause with no edits still compare equal.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{SessionId, answers::ResponseSet, normalize};

// ─── Feedback blob ───────────────────────────────────────────────────────────

/// Nested JSON column carrying the low-rating feedback texts together with
/// the language marker and the N/A flags. Restore inverts this shape.
#[derive(
  Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct FeedbackBlob {
  pub language:       String,
  #[serde(default)]
  pub entries:        BTreeMap<String, String>,
  #[serde(default)]
  pub not_applicable: BTreeSet<String>,
}

// ─── Content ─────────────────────────────────────────────────────────────────

/// The answer content of a draft row. Structural equality over this type is
/// the autosave no-op guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftContent {
  pub session_id:             SessionId,
  /// Demographic answers as backend labels (e.g. `"North America"`).
  pub demographics:           BTreeMap<String, String>,
  pub ratings:                BTreeMap<String, u8>,
  pub multiselects:           BTreeMap<String, BTreeSet<String>>,
  pub texts:                  BTreeMap<String, String>,
  pub feedback:               FeedbackBlob,
  pub collaboration_feedback: String,
  pub additional_comments:    String,
}

/// A response set reconstructed from a draft row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restored {
  pub responses:       ResponseSet,
  pub language:        String,
  /// Demographic labels with no table inverse; the raw label was kept as
  /// the token. The caller decides whether to log or reject these.
  pub unmapped_labels: Vec<String>,
}

impl DraftContent {
  /// Project a response set into its persisted form, applying the forward
  /// demographic normalisation (token → backend label).
  pub fn project(
    session_id: SessionId,
    language: &str,
    responses: &ResponseSet,
  ) -> Self {
    let demographics = responses
      .demographics
      .iter()
      .map(|(id, token)| {
        (id.clone(), normalize::token_to_label(token).to_owned())
      })
      .collect();

    Self {
      session_id,
      demographics,
      ratings: responses.ratings.clone(),
      multiselects: responses.multiselects.clone(),
      texts: responses.texts.clone(),
      feedback: FeedbackBlob {
        language:       language.to_owned(),
        entries:        responses.feedback.clone(),
        not_applicable: responses.not_applicable.clone(),
      },
      collaboration_feedback: responses.collaboration_feedback.clone(),
      additional_comments: responses.additional_comments.clone(),
    }
  }

  /// Reconstruct the response set — the inverse of [`Self::project`].
  ///
  /// Demographic labels go through the strict reverse table; an unmapped
  /// label is kept verbatim and reported in
  /// [`Restored::unmapped_labels`] rather than guessed at.
  pub fn restore(&self) -> Restored {
    let mut unmapped_labels = Vec::new();
    let demographics = self
      .demographics
      .iter()
      .map(|(id, label)| {
        let token = match normalize::label_to_token(label) {
          Some(token) => token.to_owned(),
          None => {
            unmapped_labels.push(label.clone());
            label.clone()
          }
        };
        (id.clone(), token)
      })
      .collect();

    let responses = ResponseSet {
      demographics,
      ratings: self.ratings.clone(),
      feedback: self.feedback.entries.clone(),
      multiselects: self.multiselects.clone(),
      not_applicable: self.feedback.not_applicable.clone(),
      texts: self.texts.clone(),
      collaboration_feedback: self.collaboration_feedback.clone(),
      additional_comments: self.additional_comments.clone(),
    };

    Restored {
      responses,
      language: self.feedback.language.clone(),
      unmapped_labels,
    }
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A full persisted row: content plus lifecycle metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftRecord {
  #[serde(flatten)]
  pub content:          DraftContent,
  pub is_draft:         bool,
  pub elapsed_seconds:  u64,
  pub last_autosave_at: Option<DateTime<Utc>>,
  pub submitted_at:     Option<DateTime<Utc>>,
}

impl DraftRecord {
  /// An autosave row: `is_draft = true`, stamped with the save time.
  pub fn draft(
    content: DraftContent,
    elapsed_seconds: u64,
    now: DateTime<Utc>,
  ) -> Self {
    Self {
      content,
      is_draft: true,
      elapsed_seconds,
      last_autosave_at: Some(now),
      submitted_at: None,
    }
  }

  /// A final row: `is_draft = false`, stamped with the submission time.
  /// This transition happens exactly once per session.
  pub fn finalized(
    content: DraftContent,
    elapsed_seconds: u64,
    now: DateTime<Utc>,
  ) -> Self {
    Self {
      content,
      is_draft: false,
      elapsed_seconds,
      last_autosave_at: None,
      submitted_at: Some(now),
    }
  }

  pub fn session_id(&self) -> &SessionId { &self.content.session_id }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
