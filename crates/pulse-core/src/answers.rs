//! The in-memory response set for one in-progress survey session.
//!
//! Input controls mutate the set through validating setters; every setter
//! checks the target question's existence, kind, and allowed values against
//! the catalog before storing anything. The maps are `BTreeMap`/`BTreeSet`
//! so the serialised form is deterministic, which the autosave no-op guard
//! depends on.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  catalog::{Catalog, Question, QuestionKind, QuestionSpec},
};

/// All answers for one survey session, keyed by question id.
#[derive(
  Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct ResponseSet {
  /// Demographic answers as machine tokens (e.g. `"north-america"`).
  pub(crate) demographics:           BTreeMap<String, String>,
  pub(crate) ratings:                BTreeMap<String, u8>,
  /// Free-text feedback paired with a rating question.
  pub(crate) feedback:               BTreeMap<String, String>,
  pub(crate) multiselects:           BTreeMap<String, BTreeSet<String>>,
  /// Rating questions flagged Not Applicable.
  pub(crate) not_applicable:         BTreeSet<String>,
  pub(crate) texts:                  BTreeMap<String, String>,
  /// Always-optional free text, not tied to any question id.
  pub(crate) collaboration_feedback: String,
  pub(crate) additional_comments:    String,
}

impl ResponseSet {
  pub fn new() -> Self { Self::default() }

  fn expect_kind<'a>(
    catalog: &'a Catalog,
    id: &str,
    expected: QuestionKind,
  ) -> Result<&'a Question> {
    let question = catalog
      .get(id)
      .ok_or_else(|| Error::UnknownQuestion(id.to_owned()))?;
    if question.kind() != expected {
      return Err(Error::KindMismatch {
        id: id.to_owned(),
        expected,
        actual: question.kind(),
      });
    }
    Ok(question)
  }

  // ── Setters ───────────────────────────────────────────────────────────────

  /// Store a demographic answer. `value` must be one of the question's
  /// option tokens.
  pub fn set_demographic(
    &mut self,
    catalog: &Catalog,
    id: &str,
    value: &str,
  ) -> Result<()> {
    let question =
      Self::expect_kind(catalog, id, QuestionKind::Demographic)?;
    let QuestionSpec::Demographic { options } = &question.spec else {
      unreachable!("kind checked above");
    };
    if !options.iter().any(|o| o == value) {
      return Err(Error::InvalidAnswerValue {
        id:    id.to_owned(),
        value: value.to_owned(),
      });
    }
    self.demographics.insert(id.to_owned(), value.to_owned());
    Ok(())
  }

  /// Store a rating. `value` must be a member of the question's scale.
  ///
  /// An existing N/A flag is left in place; the completion evaluator then
  /// ignores the rating until the flag is cleared. (Clearing is
  /// one-directional: only `set_not_applicable` has a cross-field effect.)
  pub fn set_rating(
    &mut self,
    catalog: &Catalog,
    id: &str,
    value: u8,
  ) -> Result<()> {
    let question = Self::expect_kind(catalog, id, QuestionKind::Rating)?;
    let QuestionSpec::Rating { scale, .. } = &question.spec else {
      unreachable!("kind checked above");
    };
    if !scale.contains(&value) {
      return Err(Error::InvalidAnswerValue {
        id:    id.to_owned(),
        value: value.to_string(),
      });
    }
    self.ratings.insert(id.to_owned(), value);
    Ok(())
  }

  /// Store free-text feedback for a rating question.
  pub fn set_feedback(
    &mut self,
    catalog: &Catalog,
    id: &str,
    text: impl Into<String>,
  ) -> Result<()> {
    Self::expect_kind(catalog, id, QuestionKind::Rating)?;
    self.feedback.insert(id.to_owned(), text.into());
    Ok(())
  }

  /// Set or clear the N/A flag on a rating question.
  ///
  /// Setting the flag atomically clears any stored rating and feedback for
  /// the question — N/A and a numeric rating are mutually exclusive, and
  /// the completion evaluator relies on that.
  pub fn set_not_applicable(
    &mut self,
    catalog: &Catalog,
    id: &str,
    flag: bool,
  ) -> Result<()> {
    let question = Self::expect_kind(catalog, id, QuestionKind::Rating)?;
    let QuestionSpec::Rating {
      allow_not_applicable,
      ..
    } = &question.spec
    else {
      unreachable!("kind checked above");
    };
    if flag && !allow_not_applicable {
      return Err(Error::NotApplicableNotAllowed(id.to_owned()));
    }
    if flag {
      self.not_applicable.insert(id.to_owned());
      self.ratings.remove(id);
      self.feedback.remove(id);
    } else {
      self.not_applicable.remove(id);
    }
    Ok(())
  }

  /// Store a multiselect answer. Every selected token must be one of the
  /// question's options. An empty set is stored and counts as unanswered.
  pub fn set_multiselect(
    &mut self,
    catalog: &Catalog,
    id: &str,
    selected: BTreeSet<String>,
  ) -> Result<()> {
    let question =
      Self::expect_kind(catalog, id, QuestionKind::Multiselect)?;
    let QuestionSpec::Multiselect { options } = &question.spec else {
      unreachable!("kind checked above");
    };
    if let Some(bad) = selected.iter().find(|s| !options.contains(s)) {
      return Err(Error::InvalidAnswerValue {
        id:    id.to_owned(),
        value: bad.clone(),
      });
    }
    self.multiselects.insert(id.to_owned(), selected);
    Ok(())
  }

  /// Store the answer to a standalone text question.
  pub fn set_text(
    &mut self,
    catalog: &Catalog,
    id: &str,
    text: impl Into<String>,
  ) -> Result<()> {
    Self::expect_kind(catalog, id, QuestionKind::Text)?;
    self.texts.insert(id.to_owned(), text.into());
    Ok(())
  }

  pub fn set_collaboration_feedback(&mut self, text: impl Into<String>) {
    self.collaboration_feedback = text.into();
  }

  pub fn set_additional_comments(&mut self, text: impl Into<String>) {
    self.additional_comments = text.into();
  }

  /// Wipe every answer, returning the set to its initial empty state.
  /// Exposed as an explicit operation; there is no ambient global reset.
  pub fn reset(&mut self) { *self = Self::default(); }

  // ── Accessors ─────────────────────────────────────────────────────────────

  pub fn demographic(&self, id: &str) -> Option<&str> {
    self.demographics.get(id).map(String::as_str)
  }

  pub fn rating(&self, id: &str) -> Option<u8> {
    self.ratings.get(id).copied()
  }

  pub fn feedback(&self, id: &str) -> Option<&str> {
    self.feedback.get(id).map(String::as_str)
  }

  pub fn multiselect(&self, id: &str) -> Option<&BTreeSet<String>> {
    self.multiselects.get(id)
  }

  pub fn is_not_applicable(&self, id: &str) -> bool {
    self.not_applicable.contains(id)
  }

  pub fn text(&self, id: &str) -> Option<&str> {
    self.texts.get(id).map(String::as_str)
  }

  pub fn collaboration_feedback(&self) -> &str {
    &self.collaboration_feedback
  }

  pub fn additional_comments(&self) -> &str { &self.additional_comments }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::Question;

  fn catalog() -> Catalog {
    Catalog::new(vec![
      Question::demographic("region", "about-you", [
        "north-america",
        "equipment",
      ]),
      Question::rating("leadership", "work").with_not_applicable(),
      Question::rating("tools", "work"),
      Question::multiselect("channels", "work", ["email", "chat"]),
      Question::text("comments", "wrap-up"),
    ])
    .unwrap()
  }

  #[test]
  fn demographic_rejects_out_of_catalog_value() {
    let catalog = catalog();
    let mut set = ResponseSet::new();
    let err = set
      .set_demographic(&catalog, "region", "mars")
      .unwrap_err();
    assert!(matches!(err, Error::InvalidAnswerValue { .. }));
    assert_eq!(set.demographic("region"), None);
  }

  #[test]
  fn rating_rejects_out_of_scale_value() {
    let catalog = catalog();
    let mut set = ResponseSet::new();
    assert!(set.set_rating(&catalog, "tools", 6).is_err());
    assert!(set.set_rating(&catalog, "tools", 0).is_err());
    set.set_rating(&catalog, "tools", 5).unwrap();
    assert_eq!(set.rating("tools"), Some(5));
  }

  #[test]
  fn unknown_question_and_kind_mismatch() {
    let catalog = catalog();
    let mut set = ResponseSet::new();
    assert!(matches!(
      set.set_rating(&catalog, "nope", 3),
      Err(Error::UnknownQuestion(_))
    ));
    assert!(matches!(
      set.set_text(&catalog, "tools", "hi"),
      Err(Error::KindMismatch { .. })
    ));
  }

  #[test]
  fn not_applicable_clears_rating_and_feedback() {
    let catalog = catalog();
    let mut set = ResponseSet::new();
    set.set_rating(&catalog, "leadership", 2).unwrap();
    set.set_feedback(&catalog, "leadership", "slow reviews").unwrap();

    set.set_not_applicable(&catalog, "leadership", true).unwrap();
    assert!(set.is_not_applicable("leadership"));
    assert_eq!(set.rating("leadership"), None);
    assert_eq!(set.feedback("leadership"), None);
  }

  #[test]
  fn setting_a_rating_does_not_clear_not_applicable() {
    // Intentional asymmetry, preserved from the source behaviour: only the
    // N/A setter has a cross-field effect.
    let catalog = catalog();
    let mut set = ResponseSet::new();
    set.set_not_applicable(&catalog, "leadership", true).unwrap();
    set.set_rating(&catalog, "leadership", 4).unwrap();
    assert!(set.is_not_applicable("leadership"));
    assert_eq!(set.rating("leadership"), Some(4));
  }

  #[test]
  fn not_applicable_rejected_where_not_allowed() {
    let catalog = catalog();
    let mut set = ResponseSet::new();
    assert!(matches!(
      set.set_not_applicable(&catalog, "tools", true),
      Err(Error::NotApplicableNotAllowed(_))
    ));
    // Clearing the flag is always permitted.
    set.set_not_applicable(&catalog, "tools", false).unwrap();
  }

  #[test]
  fn multiselect_rejects_unknown_token() {
    let catalog = catalog();
    let mut set = ResponseSet::new();
    let err = set
      .set_multiselect(
        &catalog,
        "channels",
        ["email".to_owned(), "fax".to_owned()].into(),
      )
      .unwrap_err();
    assert!(matches!(err, Error::InvalidAnswerValue { value, .. } if value == "fax"));
  }

  #[test]
  fn reset_returns_to_empty() {
    let catalog = catalog();
    let mut set = ResponseSet::new();
    set.set_rating(&catalog, "tools", 4).unwrap();
    set.set_collaboration_feedback("good");
    set.reset();
    assert_eq!(set, ResponseSet::default());
  }
}
