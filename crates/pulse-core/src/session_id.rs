//! Session id — the client-generated correlation token for one survey
//! attempt.
//!
//! Generated once when the survey view is entered and held for the lifetime
//! of the attempt. It is the unique upsert key for the draft row and, after
//! submission, the token the respondent uses for self-service data access
//! and erasure.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque session token: millisecond timestamp plus a random suffix.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
  /// Generate a fresh token, e.g. `s-1724493600123-9f8a02c1`.
  pub fn generate(now: DateTime<Utc>) -> Self {
    let suffix = Uuid::new_v4().simple().to_string();
    Self(format!("s-{}-{}", now.timestamp_millis(), &suffix[..8]))
  }

  /// Wrap an existing token (e.g. one restored from storage or a URL).
  pub fn new(raw: impl Into<String>) -> Self { Self(raw.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for SessionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn generated_ids_are_distinct() {
    let now = Utc::now();
    assert_ne!(SessionId::generate(now), SessionId::generate(now));
  }

  #[test]
  fn round_trips_as_transparent_string() {
    let id = SessionId::new("s-123-abcd");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"s-123-abcd\"");
    let back: SessionId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
  }
}
