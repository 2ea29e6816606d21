//! Protocol tests for `SurveySession` against an in-memory mock store.
//!
//! All timer-driven behaviour runs under paused tokio time, so the debounce
//! and linger windows are exercised deterministically.

use std::{
  collections::BTreeMap,
  sync::{Arc, Mutex},
  time::Duration,
};

use chrono::Utc;
use pulse_core::{
  SessionId,
  answers::ResponseSet,
  catalog::{Catalog, Question},
  draft::{DraftContent, DraftRecord},
  store::{DraftStore, StoredResponse},
};
use thiserror::Error;
use uuid::Uuid;

use crate::{
  AutosaveStatus, Error as SessionError, RestoreOutcome, SaveOutcome,
  SessionConfig, SurveySession,
  status::{ERROR_LINGER, SAVED_LINGER},
};

// ─── Mock store ──────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
#[error("injected store failure")]
struct MockFailure;

#[derive(Default)]
struct MockState {
  rows:         BTreeMap<String, StoredResponse>,
  upserts:      usize,
  inserts:      usize,
  updates:      usize,
  finds:        usize,
  fail_upserts: bool,
  fail_finds:   bool,
  hang_upserts: bool,
}

#[derive(Clone, Default)]
struct MockStore {
  state: Arc<Mutex<MockState>>,
}

impl MockStore {
  fn with<T>(&self, f: impl FnOnce(&mut MockState) -> T) -> T {
    f(&mut self.state.lock().unwrap())
  }

  fn seed_draft(&self, record: DraftRecord) -> Uuid {
    let id = Uuid::new_v4();
    self.with(|st| {
      st.rows.insert(
        record.session_id().as_str().to_owned(),
        StoredResponse { id, record },
      );
    });
    id
  }
}

impl DraftStore for MockStore {
  type Error = MockFailure;

  async fn upsert_draft(
    &self,
    record: DraftRecord,
  ) -> Result<Uuid, MockFailure> {
    let hang = self.with(|st| st.hang_upserts);
    if hang {
      tokio::time::sleep(Duration::from_secs(3600)).await;
    }
    self.with(|st| {
      st.upserts += 1;
      if st.fail_upserts {
        return Err(MockFailure);
      }
      let key = record.session_id().as_str().to_owned();
      let id = st.rows.get(&key).map_or_else(Uuid::new_v4, |s| s.id);
      st.rows.insert(key, StoredResponse { id, record });
      Ok(id)
    })
  }

  async fn find_draft(
    &self,
    session_id: &SessionId,
  ) -> Result<Option<StoredResponse>, MockFailure> {
    self.with(|st| {
      st.finds += 1;
      if st.fail_finds {
        return Err(MockFailure);
      }
      Ok(
        st.rows
          .get(session_id.as_str())
          .filter(|s| s.record.is_draft)
          .cloned(),
      )
    })
  }

  async fn insert_final(
    &self,
    record: DraftRecord,
  ) -> Result<Uuid, MockFailure> {
    self.with(|st| {
      st.inserts += 1;
      let id = Uuid::new_v4();
      st.rows.insert(
        record.session_id().as_str().to_owned(),
        StoredResponse { id, record },
      );
      Ok(id)
    })
  }

  async fn update_final(
    &self,
    response_id: Uuid,
    record: DraftRecord,
  ) -> Result<(), MockFailure> {
    self.with(|st| {
      st.updates += 1;
      let key = st
        .rows
        .iter()
        .find(|(_, s)| s.id == response_id)
        .map(|(k, _)| k.clone())
        .ok_or(MockFailure)?;
      st.rows.insert(key, StoredResponse {
        id: response_id,
        record,
      });
      Ok(())
    })
  }

  async fn find_response(
    &self,
    session_id: &SessionId,
  ) -> Result<Option<StoredResponse>, MockFailure> {
    self.with(|st| Ok(st.rows.get(session_id.as_str()).cloned()))
  }

  async fn delete_session(
    &self,
    session_id: &SessionId,
  ) -> Result<bool, MockFailure> {
    self.with(|st| Ok(st.rows.remove(session_id.as_str()).is_some()))
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn catalog() -> Catalog {
  Catalog::new(vec![
    Question::demographic("region", "about-you", ["north-america"]),
    Question::rating("leadership", "work").with_not_applicable(),
    Question::rating("tools", "work"),
    Question::multiselect("channels", "work", ["email", "chat"]),
    Question::text("highlight", "wrap-up").required(true),
  ])
  .unwrap()
}

fn session(store: MockStore) -> SurveySession<MockStore> {
  SurveySession::new(store, catalog(), SessionConfig::default())
}

fn fill(session: &mut SurveySession<MockStore>) {
  session.set_demographic("region", "north-america").unwrap();
  session.set_rating("leadership", 4).unwrap();
  session.set_rating("tools", 3).unwrap();
  session
    .set_multiselect("channels", ["email".to_owned()].into())
    .unwrap();
  session.set_text("highlight", "the offsite").unwrap();
}

// ─── Debounce & no-op guard ──────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn burst_of_edits_collapses_into_one_save() {
  let store = MockStore::default();
  let mut session = session(store.clone());
  session.start().await;

  // Five rapid edits, each within the one-second quiet window.
  session.set_rating("tools", 1).unwrap();
  tokio::time::advance(Duration::from_millis(200)).await;
  session.set_rating("tools", 2).unwrap();
  tokio::time::advance(Duration::from_millis(200)).await;
  session.set_rating("tools", 3).unwrap();
  tokio::time::advance(Duration::from_millis(200)).await;
  session.set_feedback("tools", "ok now").unwrap();
  tokio::time::advance(Duration::from_millis(200)).await;
  session.set_rating("tools", 4).unwrap();

  assert_eq!(session.run_autosave().await, Some(SaveOutcome::Saved));
  assert_eq!(store.with(|st| st.upserts), 1);

  // Nothing further is scheduled.
  assert_eq!(session.run_autosave().await, None);
}

#[tokio::test(start_paused = true)]
async fn unchanged_snapshot_skips_the_write() {
  let store = MockStore::default();
  let mut session = session(store.clone());
  session.start().await;

  session.set_rating("tools", 5).unwrap();
  assert_eq!(session.autosave().await, SaveOutcome::Saved);

  // Same state, immediate second attempt: at most one network write.
  assert_eq!(session.autosave().await, SaveOutcome::Skipped);
  assert_eq!(store.with(|st| st.upserts), 1);
}

#[tokio::test(start_paused = true)]
async fn autosave_with_no_pending_debounce_is_none() {
  let store = MockStore::default();
  let mut session = session(store);
  session.start().await;
  assert_eq!(session.run_autosave().await, None);
}

// ─── Failure handling ────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn failed_save_keeps_snapshot_so_retry_writes() {
  let store = MockStore::default();
  let mut session = session(store.clone());
  session.start().await;
  store.with(|st| st.fail_upserts = true);

  session.set_rating("tools", 2).unwrap();
  assert_eq!(session.autosave().await, SaveOutcome::Failed);
  assert_eq!(session.status(), AutosaveStatus::Error);

  // No intervening edit: the retry must not be skipped as a no-op.
  store.with(|st| st.fail_upserts = false);
  assert_eq!(session.autosave().await, SaveOutcome::Saved);
  assert_eq!(store.with(|st| st.upserts), 2);
}

#[tokio::test(start_paused = true)]
async fn hung_save_times_out_as_failure() {
  let store = MockStore::default();
  let mut session = session(store.clone());
  session.start().await;
  store.with(|st| st.hang_upserts = true);

  session.set_rating("tools", 2).unwrap();
  assert_eq!(session.autosave().await, SaveOutcome::Failed);
  assert_eq!(session.status(), AutosaveStatus::Error);
}

#[tokio::test(start_paused = true)]
async fn status_badge_reverts_to_idle() {
  let store = MockStore::default();
  let mut session = session(store.clone());
  session.start().await;

  session.set_rating("tools", 4).unwrap();
  session.autosave().await;
  assert_eq!(session.status(), AutosaveStatus::Saved);
  tokio::time::advance(SAVED_LINGER).await;
  assert_eq!(session.status(), AutosaveStatus::Idle);

  store.with(|st| st.fail_upserts = true);
  session.set_rating("tools", 5).unwrap();
  session.autosave().await;
  assert_eq!(session.status(), AutosaveStatus::Error);
  tokio::time::advance(ERROR_LINGER).await;
  assert_eq!(session.status(), AutosaveStatus::Idle);
}

// ─── Restore ─────────────────────────────────────────────────────────────────

fn seeded_content(session_id: &SessionId) -> (DraftContent, ResponseSet) {
  let catalog = catalog();
  let mut responses = ResponseSet::new();
  responses
    .set_demographic(&catalog, "region", "north-america")
    .unwrap();
  responses.set_rating(&catalog, "tools", 2).unwrap();
  responses
    .set_feedback(&catalog, "tools", "too many tools")
    .unwrap();
  responses
    .set_not_applicable(&catalog, "leadership", true)
    .unwrap();
  let content =
    DraftContent::project(session_id.clone(), "de", &responses);
  (content, responses)
}

#[tokio::test(start_paused = true)]
async fn restore_repopulates_the_response_set() {
  let store = MockStore::default();
  let session_id = SessionId::new("s-resume");
  let (content, responses) = seeded_content(&session_id);
  store.seed_draft(DraftRecord::draft(content, 100, Utc::now()));

  let mut session = SurveySession::resume(
    store.clone(),
    catalog(),
    SessionConfig::default(),
    session_id,
  );
  assert_eq!(session.start().await, RestoreOutcome::Restored);
  assert_eq!(session.responses(), &responses);
  assert!(session.responses().is_not_applicable("leadership"));

  // The restored snapshot counts as the last save: no spurious write.
  assert_eq!(session.autosave().await, SaveOutcome::Skipped);
  assert_eq!(store.with(|st| st.upserts), 0);

  // Elapsed time resumes from the draft.
  tokio::time::advance(Duration::from_secs(5)).await;
  assert_eq!(session.elapsed_seconds(), 105);
}

#[tokio::test(start_paused = true)]
async fn restore_failure_falls_back_to_empty() {
  let store = MockStore::default();
  store.with(|st| st.fail_finds = true);

  let mut session = session(store);
  assert_eq!(session.start().await, RestoreOutcome::Fresh);
  assert_eq!(session.responses(), &ResponseSet::new());
}

#[tokio::test(start_paused = true)]
async fn restore_runs_only_once() {
  let store = MockStore::default();
  let mut session = session(store.clone());
  session.start().await;
  session.start().await;
  assert_eq!(store.with(|st| st.finds), 1);
}

// ─── Submit ──────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn incomplete_submit_is_refused_with_breakdown() {
  let store = MockStore::default();
  let mut session = session(store.clone());
  session.start().await;

  fill(&mut session);
  session.set_rating("tools", 1).unwrap();
  session.set_feedback("tools", "  ").unwrap();

  let err = session.submit().await.unwrap_err();
  let SessionError::Incomplete(missing) = err else {
    panic!("expected Incomplete, got {err:?}");
  };
  assert_eq!(missing.feedback_required, vec!["tools".to_owned()]);
  // Nothing was written.
  assert_eq!(store.with(|st| st.inserts + st.updates), 0);
}

#[tokio::test(start_paused = true)]
async fn submit_finalises_the_existing_draft_row() {
  let store = MockStore::default();
  let mut session = session(store.clone());
  session.start().await;

  fill(&mut session);
  assert_eq!(session.autosave().await, SaveOutcome::Saved);

  let response_id = session.submit().await.unwrap();
  assert!(session.is_submitted());

  store.with(|st| {
    assert_eq!(st.updates, 1);
    assert_eq!(st.inserts, 0);
    assert_eq!(st.rows.len(), 1);
    let row = st.rows.values().next().unwrap();
    assert_eq!(row.id, response_id);
    assert!(!row.record.is_draft);
    assert!(row.record.submitted_at.is_some());
  });

  // Autosave never runs again for a finalised session.
  session.set_additional_comments("late thought");
  assert_eq!(session.autosave().await, SaveOutcome::Skipped);

  let err = session.submit().await.unwrap_err();
  assert!(matches!(err, SessionError::AlreadySubmitted));
}

#[tokio::test(start_paused = true)]
async fn submit_inserts_directly_when_no_draft_exists() {
  let store = MockStore::default();
  let mut session = session(store.clone());
  session.start().await;

  // All answers arrive within the debounce window; no autosave ever fires.
  fill(&mut session);
  session.submit().await.unwrap();

  store.with(|st| {
    assert_eq!(st.upserts, 0);
    assert_eq!(st.inserts, 1);
    assert_eq!(st.rows.len(), 1);
    assert!(!st.rows.values().next().unwrap().record.is_draft);
  });
}

// ─── Reset ───────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn reset_clears_answers_and_cancels_pending_save() {
  let store = MockStore::default();
  let mut session = session(store.clone());
  session.start().await;

  fill(&mut session);
  session.reset();

  assert_eq!(session.responses(), &ResponseSet::new());
  assert_eq!(session.run_autosave().await, None);
  assert_eq!(store.with(|st| st.upserts), 0);
}
