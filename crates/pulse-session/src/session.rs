//! [`SurveySession`] — the survey attempt state machine.
//!
//! Control flow: every setter mutates the response set optimistically (the
//! user is never blocked on persistence), re-arms the debounce, and the
//! driver then awaits [`SurveySession::run_autosave`]. Restore runs once at
//! session start, strictly before any edit can have scheduled a save.

use std::{collections::BTreeSet, time::Duration};

use chrono::Utc;
use pulse_core::{
  SessionId,
  answers::ResponseSet,
  catalog::Catalog,
  complete::{Completion, evaluate},
  draft::{DraftContent, DraftRecord},
  store::DraftStore,
};
use tokio::time::{Instant, timeout};
use uuid::Uuid;

use crate::{
  Error,
  debounce::Debouncer,
  status::{AutosaveStatus, StatusTracker},
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Tunables for one session. Defaults match the production values; tests
/// shrink the windows.
#[derive(Debug, Clone)]
pub struct SessionConfig {
  pub language:     String,
  /// Quiet period after the last edit before an autosave fires.
  pub debounce:     Duration,
  /// Upper bound on any persistence call; expiry counts as a failure.
  pub save_timeout: Duration,
}

impl Default for SessionConfig {
  fn default() -> Self {
    Self {
      language:     "en".to_owned(),
      debounce:     Duration::from_secs(1),
      save_timeout: Duration::from_secs(10),
    }
  }
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// What [`SurveySession::start`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
  /// A draft existed and the response set was repopulated from it.
  Restored,
  /// No draft (or the lookup failed); the session starts empty.
  Fresh,
}

/// What one autosave attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
  /// The snapshot matched the last successful save; no write was issued.
  Skipped,
  Saved,
  /// The write failed or timed out. The last-good snapshot is kept, so the
  /// next attempt will not spuriously skip.
  Failed,
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// One survey attempt bound to a [`DraftStore`] backend.
pub struct SurveySession<S> {
  store:         S,
  catalog:       Catalog,
  config:        SessionConfig,
  session_id:    SessionId,
  responses:     ResponseSet,
  language:      String,
  debounce:      Debouncer,
  status:        StatusTracker,
  /// Snapshot captured at the end of the last successful save; the no-op
  /// guard compares against this by structural equality.
  last_saved:    Option<DraftContent>,
  /// Row id learned from the first successful upsert or from restore.
  draft_id:      Option<Uuid>,
  /// Seconds accumulated by earlier sessions, resumed from the draft.
  prior_elapsed: u64,
  started_at:    Instant,
  started:       bool,
  submitted:     bool,
}

impl<S: DraftStore> SurveySession<S> {
  /// A brand-new attempt with a freshly generated session id.
  pub fn new(store: S, catalog: Catalog, config: SessionConfig) -> Self {
    let session_id = SessionId::generate(Utc::now());
    Self::resume(store, catalog, config, session_id)
  }

  /// An attempt bound to an existing session id (e.g. one kept in browser
  /// storage across reloads).
  pub fn resume(
    store: S,
    catalog: Catalog,
    config: SessionConfig,
    session_id: SessionId,
  ) -> Self {
    let language = config.language.clone();
    let debounce = Debouncer::new(config.debounce);
    Self {
      store,
      catalog,
      config,
      session_id,
      responses: ResponseSet::new(),
      language,
      debounce,
      status: StatusTracker::new(),
      last_saved: None,
      draft_id: None,
      prior_elapsed: 0,
      started_at: Instant::now(),
      started: false,
      submitted: false,
    }
  }

  // ── Accessors ─────────────────────────────────────────────────────────────

  pub fn session_id(&self) -> &SessionId { &self.session_id }

  pub fn responses(&self) -> &ResponseSet { &self.responses }

  pub fn catalog(&self) -> &Catalog { &self.catalog }

  pub fn completion(&self) -> Completion {
    evaluate(&self.catalog, &self.responses)
  }

  pub fn status(&self) -> AutosaveStatus { self.status.current() }

  pub fn is_submitted(&self) -> bool { self.submitted }

  /// Total time spent on the survey, including earlier resumed sessions.
  pub fn elapsed_seconds(&self) -> u64 {
    self.prior_elapsed + self.started_at.elapsed().as_secs()
  }

  // ── Restore ───────────────────────────────────────────────────────────────

  /// Query for an existing draft and repopulate the response set from it.
  /// Runs once per session; later calls are no-ops.
  ///
  /// Any failure (lookup error, timeout, malformed row) falls back to an
  /// empty response set — the user simply starts fresh, and the first
  /// autosave will recreate the draft.
  pub async fn start(&mut self) -> RestoreOutcome {
    if self.started {
      return RestoreOutcome::Fresh;
    }
    self.started = true;

    let found = match timeout(
      self.config.save_timeout,
      self.store.find_draft(&self.session_id),
    )
    .await
    {
      Ok(Ok(found)) => found,
      Ok(Err(error)) => {
        tracing::warn!(
          session = %self.session_id,
          %error,
          "draft restore failed; starting fresh"
        );
        return RestoreOutcome::Fresh;
      }
      Err(_) => {
        tracing::warn!(
          session = %self.session_id,
          "draft restore timed out; starting fresh"
        );
        return RestoreOutcome::Fresh;
      }
    };

    let Some(stored) = found else {
      return RestoreOutcome::Fresh;
    };

    let restored = stored.record.content.restore();
    for label in &restored.unmapped_labels {
      tracing::warn!(
        session = %self.session_id,
        label,
        "restored demographic label has no token mapping; kept verbatim"
      );
    }

    self.responses = restored.responses;
    self.language = restored.language;
    self.prior_elapsed = stored.record.elapsed_seconds;
    self.draft_id = Some(stored.id);
    // Restoring counts as the last successful save: an autosave fired
    // before any edit must be a no-op.
    self.last_saved = Some(stored.record.content);

    tracing::info!(session = %self.session_id, "draft restored");
    RestoreOutcome::Restored
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  fn touched(&mut self) { self.debounce.schedule(); }

  pub fn set_demographic(
    &mut self,
    id: &str,
    value: &str,
  ) -> pulse_core::Result<()> {
    self.responses.set_demographic(&self.catalog, id, value)?;
    self.touched();
    Ok(())
  }

  pub fn set_rating(&mut self, id: &str, value: u8) -> pulse_core::Result<()> {
    self.responses.set_rating(&self.catalog, id, value)?;
    self.touched();
    Ok(())
  }

  pub fn set_feedback(
    &mut self,
    id: &str,
    text: impl Into<String>,
  ) -> pulse_core::Result<()> {
    self.responses.set_feedback(&self.catalog, id, text)?;
    self.touched();
    Ok(())
  }

  pub fn set_not_applicable(
    &mut self,
    id: &str,
    flag: bool,
  ) -> pulse_core::Result<()> {
    self.responses.set_not_applicable(&self.catalog, id, flag)?;
    self.touched();
    Ok(())
  }

  pub fn set_multiselect(
    &mut self,
    id: &str,
    selected: BTreeSet<String>,
  ) -> pulse_core::Result<()> {
    self.responses.set_multiselect(&self.catalog, id, selected)?;
    self.touched();
    Ok(())
  }

  pub fn set_text(
    &mut self,
    id: &str,
    text: impl Into<String>,
  ) -> pulse_core::Result<()> {
    self.responses.set_text(&self.catalog, id, text)?;
    self.touched();
    Ok(())
  }

  pub fn set_collaboration_feedback(&mut self, text: impl Into<String>) {
    self.responses.set_collaboration_feedback(text);
    self.touched();
  }

  pub fn set_additional_comments(&mut self, text: impl Into<String>) {
    self.responses.set_additional_comments(text);
    self.touched();
  }

  pub fn set_language(&mut self, language: impl Into<String>) {
    self.language = language.into();
    self.touched();
  }

  /// Wipe every answer and forget the last-saved snapshot. Explicit
  /// test-harness operation; never wired to ambient global state.
  pub fn reset(&mut self) {
    self.responses.reset();
    self.debounce.cancel();
    self.last_saved = None;
  }

  // ── Autosave ──────────────────────────────────────────────────────────────

  fn snapshot(&self) -> DraftContent {
    DraftContent::project(
      self.session_id.clone(),
      &self.language,
      &self.responses,
    )
  }

  /// Wait out the pending debounce window, then attempt a save. Returns
  /// `None` when no save is scheduled.
  ///
  /// Intended to be raced against further input by the caller's event loop;
  /// edits arriving while this is awaited simply re-arm the debounce.
  pub async fn run_autosave(&mut self) -> Option<SaveOutcome> {
    let deadline = self.debounce.deadline()?;
    tokio::time::sleep_until(deadline).await;
    self.debounce.cancel();
    Some(self.autosave().await)
  }

  /// One immediate save attempt, bypassing the debounce window (but not the
  /// no-op guard).
  pub async fn autosave(&mut self) -> SaveOutcome {
    if self.submitted {
      return SaveOutcome::Skipped;
    }

    let content = self.snapshot();
    if self.last_saved.as_ref() == Some(&content) {
      self.debounce.cancel();
      return SaveOutcome::Skipped;
    }

    self.status.set(AutosaveStatus::Saving);
    let record =
      DraftRecord::draft(content.clone(), self.elapsed_seconds(), Utc::now());

    match timeout(self.config.save_timeout, self.store.upsert_draft(record))
      .await
    {
      Ok(Ok(id)) => {
        self.draft_id = Some(id);
        self.last_saved = Some(content);
        self.status.set(AutosaveStatus::Saved);
        SaveOutcome::Saved
      }
      Ok(Err(error)) => {
        // No automatic retry: the next organic edit re-arms the debounce,
        // and the unchanged last-good snapshot guarantees the retry is not
        // skipped as a no-op.
        tracing::warn!(session = %self.session_id, %error, "autosave failed");
        self.status.set(AutosaveStatus::Error);
        SaveOutcome::Failed
      }
      Err(_) => {
        tracing::warn!(session = %self.session_id, "autosave timed out");
        self.status.set(AutosaveStatus::Error);
        SaveOutcome::Failed
      }
    }
  }

  // ── Submit ────────────────────────────────────────────────────────────────

  /// Finalise the survey. Refused client-side unless the completion
  /// evaluator reports complete. Reuses the session's single row: an
  /// existing draft is updated in place (`is_draft` true → false, stamped
  /// with the submission time); otherwise a final row is inserted directly.
  pub async fn submit(&mut self) -> Result<Uuid, Error<S::Error>> {
    if self.submitted {
      return Err(Error::AlreadySubmitted);
    }

    let completion = self.completion();
    if !completion.is_complete {
      return Err(Error::Incomplete(completion.missing));
    }

    self.debounce.cancel();
    let content = self.snapshot();
    let record = DraftRecord::finalized(
      content.clone(),
      self.elapsed_seconds(),
      Utc::now(),
    );

    let existing = match self.draft_id {
      Some(id) => Some(id),
      None => {
        match timeout(
          self.config.save_timeout,
          self.store.find_draft(&self.session_id),
        )
        .await
        {
          Ok(Ok(found)) => found.map(|stored| stored.id),
          Ok(Err(error)) => return Err(Error::Submit(error)),
          Err(_) => return Err(Error::Timeout),
        }
      }
    };

    let response_id = match existing {
      Some(id) => {
        match timeout(
          self.config.save_timeout,
          self.store.update_final(id, record),
        )
        .await
        {
          Ok(Ok(())) => id,
          Ok(Err(error)) => return Err(Error::Submit(error)),
          Err(_) => return Err(Error::Timeout),
        }
      }
      None => {
        match timeout(
          self.config.save_timeout,
          self.store.insert_final(record),
        )
        .await
        {
          Ok(Ok(id)) => id,
          Ok(Err(error)) => return Err(Error::Submit(error)),
          Err(_) => return Err(Error::Timeout),
        }
      }
    };

    self.submitted = true;
    self.last_saved = Some(content);
    self.draft_id = Some(response_id);
    tracing::info!(
      session = %self.session_id,
      response = %response_id,
      "survey submitted"
    );
    Ok(response_id)
  }
}
