//! Completion evaluation — "can the user submit now?"
//!
//! A pure function over (catalog, response set). The result carries both the
//! aggregate verdict and the per-category lists of still-missing question
//! ids, which drive the required-field banners and the submit diagnostic.

use serde::Serialize;

use crate::{
  answers::ResponseSet,
  catalog::{Catalog, QuestionSpec},
};

/// A rating at or below this value requires non-empty free-text feedback.
/// Fixed absolute threshold, deliberately not scale-relative.
pub const LOW_RATING_FEEDBACK_MAX: u8 = 2;

// ─── Result types ────────────────────────────────────────────────────────────

/// Question ids still blocking submission, grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MissingAnswers {
  pub demographics:      Vec<String>,
  pub ratings:           Vec<String>,
  /// Low ratings (≤ [`LOW_RATING_FEEDBACK_MAX`]) whose paired feedback is
  /// empty or whitespace-only.
  pub feedback_required: Vec<String>,
  pub multiselects:      Vec<String>,
  pub texts:             Vec<String>,
}

impl MissingAnswers {
  pub fn is_empty(&self) -> bool {
    self.demographics.is_empty()
      && self.ratings.is_empty()
      && self.feedback_required.is_empty()
      && self.multiselects.is_empty()
      && self.texts.is_empty()
  }

  pub fn total(&self) -> usize {
    self.demographics.len()
      + self.ratings.len()
      + self.feedback_required.len()
      + self.multiselects.len()
      + self.texts.len()
  }
}

/// The full evaluator output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
  pub is_complete: bool,
  pub missing:     MissingAnswers,
  /// Required questions answered so far (N/A counts as answered).
  pub answered:    usize,
  /// Total required questions. Display only, never authoritative.
  pub total:       usize,
}

impl Completion {
  /// Progress percentage for the UI, rounded down. 100 for an empty
  /// catalog.
  pub fn progress_percent(&self) -> u8 {
    if self.total == 0 {
      return 100;
    }
    (self.answered * 100 / self.total) as u8
  }
}

// ─── Evaluation ──────────────────────────────────────────────────────────────

fn is_blank(s: &str) -> bool { s.trim().is_empty() }

/// Evaluate completeness of `responses` against `catalog`.
pub fn evaluate(catalog: &Catalog, responses: &ResponseSet) -> Completion {
  let mut missing = MissingAnswers::default();
  let mut answered = 0usize;
  let mut total = 0usize;

  for question in catalog.iter() {
    let id = question.id.as_str();

    match &question.spec {
      QuestionSpec::Demographic { .. } => {
        if !question.is_required {
          continue;
        }
        total += 1;
        match responses.demographic(id) {
          Some(v) if !is_blank(v) => answered += 1,
          _ => missing.demographics.push(id.to_owned()),
        }
      }

      QuestionSpec::Rating { scale, .. } => {
        // N/A excludes the question from the rating check entirely and
        // counts as answered for progress purposes.
        let not_applicable = responses.is_not_applicable(id);
        let rating = responses.rating(id);

        if question.is_required {
          total += 1;
          if not_applicable {
            answered += 1;
          } else {
            match rating {
              Some(v) if scale.contains(&v) => answered += 1,
              _ => missing.ratings.push(id.to_owned()),
            }
          }
        }

        // The low-rating feedback gate is evaluated independently of the
        // answered check above.
        if !not_applicable
          && rating.is_some_and(|v| v <= LOW_RATING_FEEDBACK_MAX)
          && responses.feedback(id).is_none_or(is_blank)
        {
          missing.feedback_required.push(id.to_owned());
        }
      }

      QuestionSpec::Multiselect { .. } => {
        if !question.is_required {
          continue;
        }
        total += 1;
        match responses.multiselect(id) {
          Some(selected) if !selected.is_empty() => answered += 1,
          _ => missing.multiselects.push(id.to_owned()),
        }
      }

      QuestionSpec::Text => {
        if !question.is_required {
          continue;
        }
        total += 1;
        match responses.text(id) {
          Some(v) if !is_blank(v) => answered += 1,
          _ => missing.texts.push(id.to_owned()),
        }
      }
    }
  }

  Completion {
    is_complete: missing.is_empty(),
    missing,
    answered,
    total,
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
