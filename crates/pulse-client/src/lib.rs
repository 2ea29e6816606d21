//! Async HTTP client implementing [`DraftStore`] against the pulse-api
//! JSON surface.
//!
//! This is the backend a browser-hosted session would talk to: every
//! persistence call is a bounded network request, and the session protocol
//! on top treats any failure or timeout as a transient save error.

use std::time::Duration;

use pulse_core::{
  SessionId,
  draft::DraftRecord,
  store::{DraftStore, StoredResponse},
};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

/// Upper bound on any single API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ─── Error ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum HttpError {
  #[error("http transport error: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("{method} {path} returned {status}")]
  Status {
    method: &'static str,
    path:   String,
    status: StatusCode,
  },
}

pub type Result<T, E = HttpError> = std::result::Result<T, E>;

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async HTTP draft store for the pulse JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpDraftStore {
  client:   Client,
  base_url: String,
}

#[derive(Debug, Deserialize)]
struct UpsertReply {
  draft_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct CreateReply {
  response_id: Uuid,
}

impl HttpDraftStore {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
    Ok(Self {
      client,
      base_url: base_url.into(),
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.base_url.trim_end_matches('/'), path)
  }

  fn check(
    method: &'static str,
    path: String,
    status: StatusCode,
  ) -> Result<()> {
    if status.is_success() {
      Ok(())
    } else {
      Err(HttpError::Status {
        method,
        path,
        status,
      })
    }
  }
}

impl DraftStore for HttpDraftStore {
  type Error = HttpError;

  /// `PUT /api/drafts/:session_id`
  async fn upsert_draft(&self, record: DraftRecord) -> Result<Uuid> {
    let path = format!("/drafts/{}", record.session_id());
    let resp = self
      .client
      .put(self.url(&path))
      .json(&record)
      .send()
      .await?;
    Self::check("PUT", path, resp.status())?;
    let reply: UpsertReply = resp.json().await?;
    Ok(reply.draft_id)
  }

  /// `GET /api/drafts/:session_id` — 404 maps to `None`.
  async fn find_draft(
    &self,
    session_id: &SessionId,
  ) -> Result<Option<StoredResponse>> {
    let path = format!("/drafts/{session_id}");
    let resp = self.client.get(self.url(&path)).send().await?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    Self::check("GET", path, resp.status())?;
    Ok(Some(resp.json().await?))
  }

  /// `POST /api/responses`
  async fn insert_final(&self, record: DraftRecord) -> Result<Uuid> {
    let path = "/responses".to_owned();
    let resp = self
      .client
      .post(self.url(&path))
      .json(&record)
      .send()
      .await?;
    Self::check("POST", path, resp.status())?;
    let reply: CreateReply = resp.json().await?;
    Ok(reply.response_id)
  }

  /// `PUT /api/responses/:id`
  async fn update_final(
    &self,
    response_id: Uuid,
    record: DraftRecord,
  ) -> Result<()> {
    let path = format!("/responses/{response_id}");
    let resp = self
      .client
      .put(self.url(&path))
      .json(&record)
      .send()
      .await?;
    Self::check("PUT", path, resp.status())
  }

  /// `GET /api/sessions/:session_id` — 404 maps to `None`.
  async fn find_response(
    &self,
    session_id: &SessionId,
  ) -> Result<Option<StoredResponse>> {
    let path = format!("/sessions/{session_id}");
    let resp = self.client.get(self.url(&path)).send().await?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    Self::check("GET", path, resp.status())?;
    Ok(Some(resp.json().await?))
  }

  /// `DELETE /api/sessions/:session_id` — 404 maps to `false`.
  async fn delete_session(&self, session_id: &SessionId) -> Result<bool> {
    let path = format!("/sessions/{session_id}");
    let resp = self.client.delete(self.url(&path)).send().await?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(false);
    }
    Self::check("DELETE", path, resp.status())?;
    Ok(true)
  }
}
