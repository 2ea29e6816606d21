//! A cancellable delayed-task deadline.
//!
//! Each call to [`Debouncer::schedule`] replaces any pending deadline, so a
//! burst of edits collapses into a single firing once input pauses for the
//! configured delay. There is never more than one pending deadline.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug)]
pub struct Debouncer {
  delay:    Duration,
  deadline: Option<Instant>,
}

impl Debouncer {
  pub fn new(delay: Duration) -> Self {
    Self {
      delay,
      deadline: None,
    }
  }

  /// Cancel any pending deadline and schedule a fresh one `delay` from now.
  pub fn schedule(&mut self) {
    self.deadline = Some(Instant::now() + self.delay);
  }

  pub fn cancel(&mut self) { self.deadline = None; }

  pub fn is_pending(&self) -> bool { self.deadline.is_some() }

  pub fn deadline(&self) -> Option<Instant> { self.deadline }

  /// If the pending deadline has passed, clear it and return `true`.
  pub fn fire_if_due(&mut self) -> bool {
    match self.deadline {
      Some(deadline) if Instant::now() >= deadline => {
        self.deadline = None;
        true
      }
      _ => false,
    }
  }
}
