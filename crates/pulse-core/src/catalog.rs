//! Question catalog — the read-only description of the survey.
//!
//! The catalog is loaded once per survey and never mutated by the response
//! layer. Every question carries an explicit `is_required` flag; there is no
//! implicit "required by kind" convention anywhere in the evaluator.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Kinds ───────────────────────────────────────────────────────────────────

/// The kind of a question, used for kind-mismatch diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
  Demographic,
  Rating,
  Multiselect,
  Text,
}

/// The kind-specific payload of a question. The variant name serves as the
/// `kind` tag in serialised catalogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum QuestionSpec {
  /// Single-choice demographic question. Answers are machine tokens drawn
  /// from `options` (e.g. `"north-america"`).
  Demographic { options: Vec<String> },

  /// Integer rating on an ordered scale, normally 1..=5. A low rating
  /// (≤ 2) requires free-text feedback; see the completion evaluator.
  Rating {
    scale:                Vec<u8>,
    #[serde(default)]
    allow_not_applicable: bool,
  },

  /// Multi-choice question; answered once at least one option is selected.
  Multiselect { options: Vec<String> },

  /// Standalone free-text question.
  Text,
}

impl QuestionSpec {
  pub fn kind(&self) -> QuestionKind {
    match self {
      Self::Demographic { .. } => QuestionKind::Demographic,
      Self::Rating { .. } => QuestionKind::Rating,
      Self::Multiselect { .. } => QuestionKind::Multiselect,
      Self::Text => QuestionKind::Text,
    }
  }
}

// ─── Question ────────────────────────────────────────────────────────────────

/// A single catalog entry. Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
  /// Stable string identifier, unique within the catalog.
  pub id:          String,
  /// Grouping label used for ordering and display only.
  pub section:     String,
  pub is_required: bool,
  #[serde(flatten)]
  pub spec:        QuestionSpec,
}

impl Question {
  /// A demographic question. Required by default, matching survey policy.
  pub fn demographic(
    id: impl Into<String>,
    section: impl Into<String>,
    options: impl IntoIterator<Item = impl Into<String>>,
  ) -> Self {
    Self {
      id:          id.into(),
      section:     section.into(),
      is_required: true,
      spec:        QuestionSpec::Demographic {
        options: options.into_iter().map(Into::into).collect(),
      },
    }
  }

  /// A rating question on the canonical 1..=5 scale. Required by default.
  pub fn rating(id: impl Into<String>, section: impl Into<String>) -> Self {
    Self::rating_on_scale(id, section, (1..=5).collect())
  }

  /// A rating question with a catalog-defined scale. Required by default.
  pub fn rating_on_scale(
    id: impl Into<String>,
    section: impl Into<String>,
    scale: Vec<u8>,
  ) -> Self {
    Self {
      id:          id.into(),
      section:     section.into(),
      is_required: true,
      spec:        QuestionSpec::Rating {
        scale,
        allow_not_applicable: false,
      },
    }
  }

  /// A multiselect question. Required by default.
  pub fn multiselect(
    id: impl Into<String>,
    section: impl Into<String>,
    options: impl IntoIterator<Item = impl Into<String>>,
  ) -> Self {
    Self {
      id:          id.into(),
      section:     section.into(),
      is_required: true,
      spec:        QuestionSpec::Multiselect {
        options: options.into_iter().map(Into::into).collect(),
      },
    }
  }

  /// A free-text question; the only kind that is optional by default.
  pub fn text(id: impl Into<String>, section: impl Into<String>) -> Self {
    Self {
      id:          id.into(),
      section:     section.into(),
      is_required: false,
      spec:        QuestionSpec::Text,
    }
  }

  /// Mark the question as required (builder-style).
  pub fn required(mut self, is_required: bool) -> Self {
    self.is_required = is_required;
    self
  }

  /// Allow the N/A flag on a rating question (builder-style).
  /// No effect on other kinds.
  pub fn with_not_applicable(mut self) -> Self {
    if let QuestionSpec::Rating {
      allow_not_applicable,
      ..
    } = &mut self.spec
    {
      *allow_not_applicable = true;
    }
    self
  }

  pub fn kind(&self) -> QuestionKind { self.spec.kind() }
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// The ordered, validated set of questions for one survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Question>", into = "Vec<Question>")]
pub struct Catalog {
  questions: Vec<Question>,
}

impl Catalog {
  /// Build a catalog, rejecting duplicate question ids.
  pub fn new(questions: Vec<Question>) -> Result<Self> {
    let mut seen = std::collections::BTreeSet::new();
    for q in &questions {
      if !seen.insert(q.id.as_str()) {
        return Err(Error::DuplicateQuestionId(q.id.clone()));
      }
    }
    Ok(Self { questions })
  }

  pub fn get(&self, id: &str) -> Option<&Question> {
    self.questions.iter().find(|q| q.id == id)
  }

  pub fn iter(&self) -> impl Iterator<Item = &Question> {
    self.questions.iter()
  }

  pub fn len(&self) -> usize { self.questions.len() }

  pub fn is_empty(&self) -> bool { self.questions.is_empty() }
}

impl TryFrom<Vec<Question>> for Catalog {
  type Error = Error;

  fn try_from(questions: Vec<Question>) -> Result<Self> {
    Self::new(questions)
  }
}

impl From<Catalog> for Vec<Question> {
  fn from(c: Catalog) -> Self { c.questions }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
