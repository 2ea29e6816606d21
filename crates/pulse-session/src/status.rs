//! Autosave status cycle: `idle → saving → (saved | error) → idle`.
//!
//! `Saved` and `Error` are transient display states; they revert to `Idle`
//! on read once their linger window has elapsed, so no background timer is
//! needed to drive the transition.

use std::time::Duration;

use tokio::time::Instant;

/// How long a successful save is shown before reverting to idle.
pub const SAVED_LINGER: Duration = Duration::from_secs(2);
/// How long a failed save is shown before reverting to idle.
pub const ERROR_LINGER: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveStatus {
  Idle,
  Saving,
  Saved,
  Error,
}

#[derive(Debug)]
pub(crate) struct StatusTracker {
  state:      AutosaveStatus,
  changed_at: Instant,
}

impl StatusTracker {
  pub fn new() -> Self {
    Self {
      state:      AutosaveStatus::Idle,
      changed_at: Instant::now(),
    }
  }

  pub fn set(&mut self, state: AutosaveStatus) {
    self.state = state;
    self.changed_at = Instant::now();
  }

  /// The state a status badge should show right now.
  pub fn current(&self) -> AutosaveStatus {
    let elapsed = self.changed_at.elapsed();
    match self.state {
      AutosaveStatus::Saved if elapsed >= SAVED_LINGER => {
        AutosaveStatus::Idle
      }
      AutosaveStatus::Error if elapsed >= ERROR_LINGER => {
        AutosaveStatus::Idle
      }
      state => state,
    }
  }
}
