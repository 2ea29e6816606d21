//! Bidirectional mapping between demographic UI tokens and the
//! human-readable labels stored by the backend.
//!
//! One static table serves both directions. The forward direction (token →
//! label) falls back to the raw value for untabled tokens, so free-form
//! catalog extensions survive. The reverse direction is strict; the restore
//! path decides how to handle an unmapped label.

/// UI token ↔ backend label pairs.
pub const DEMOGRAPHIC_VALUES: &[(&str, &str)] = &[
  ("north-america", "North America"),
  ("equipment", "Equipment"),
  ("magnetics", "Magnets"),
  ("both", "Both"),
  ("sales-marketing", "Sales/Marketing/Product"),
  ("operations", "Operations/Engineering/Production"),
  ("admin", "Admin/HR/Finance"),
];

/// Forward mapping used at save/submit time. Unmapped tokens pass through
/// unchanged.
pub fn token_to_label(token: &str) -> &str {
  DEMOGRAPHIC_VALUES
    .iter()
    .find(|(t, _)| *t == token)
    .map(|(_, label)| *label)
    .unwrap_or(token)
}

/// Strict reverse mapping used at draft-restore time.
pub fn label_to_token(label: &str) -> Option<&'static str> {
  DEMOGRAPHIC_VALUES
    .iter()
    .find(|(_, l)| *l == label)
    .map(|(t, _)| *t)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_tabled_value_round_trips() {
    for (token, label) in DEMOGRAPHIC_VALUES {
      assert_eq!(token_to_label(token), *label);
      assert_eq!(label_to_token(label), Some(*token));
    }
  }

  #[test]
  fn unmapped_token_passes_through() {
    assert_eq!(token_to_label("antarctica"), "antarctica");
  }

  #[test]
  fn unmapped_label_is_rejected() {
    assert_eq!(label_to_token("Antarctica"), None);
    // Multi-word labels must hit the table, never string surgery.
    assert_eq!(
      label_to_token("Sales/Marketing/Product"),
      Some("sales-marketing")
    );
  }
}
