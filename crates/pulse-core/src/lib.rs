//! Core types and trait definitions for the Pulse survey engine.
//!
//! This crate holds the question catalog model, the in-memory response set,
//! the completion evaluator, and the `DraftStore` persistence trait. It is
//! deliberately free of HTTP, database, and runtime dependencies; all other
//! crates depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod answers;
pub mod catalog;
pub mod complete;
pub mod draft;
pub mod error;
pub mod normalize;
pub mod session_id;
pub mod store;

pub use error::{Error, Result};
pub use session_id::SessionId;
