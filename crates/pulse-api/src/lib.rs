//! JSON REST API for the Pulse response store.
//!
//! Exposes an axum [`Router`] backed by any [`pulse_core::store::DraftStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", pulse_api::api_router(store.clone()))
//! ```

pub mod drafts;
pub mod error;
pub mod responses;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use pulse_core::store::DraftStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: DraftStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Autosave drafts, keyed by session id
    .route(
      "/drafts/{session_id}",
      put(drafts::upsert::<S>).get(drafts::get_one::<S>),
    )
    // Final responses
    .route("/responses", post(responses::create::<S>))
    .route("/responses/{id}", put(responses::finalize::<S>))
    // Self-service data access and erasure, keyed by session id
    .route(
      "/sessions/{session_id}",
      get(responses::export::<S>).delete(responses::erase::<S>),
    )
    .with_state(store)
}
