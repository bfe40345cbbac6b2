//! JSON REST API for Bulletin.
//!
//! Exposes an axum [`Router`] backed by a [`ModerationEngine`] over any store
//! implementing both [`ContentStore`] and [`AccountDirectory`]. Requests
//! authenticate with HTTP Basic against the account directory. TLS and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", bulletin_api::api_router(store))
//! ```

pub mod accounts;
pub mod auth;
pub mod content;
pub mod error;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use bulletin_core::{
  ModerationEngine,
  store::{AccountDirectory, ContentStore},
};

pub use error::ApiError;

/// A single store serving both content and accounts.
pub trait Backend: ContentStore + AccountDirectory + 'static {}

impl<T> Backend for T where T: ContentStore + AccountDirectory + 'static {}

/// Router state: the engine over one backend, shared across requests.
pub type SharedEngine<S> = Arc<ModerationEngine<S, S>>;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: S) -> Router<()>
where
  S: Backend + Clone,
{
  let engine = Arc::new(ModerationEngine::new(store.clone(), store));
  router(engine)
}

/// Build the router around an existing engine.
pub fn router<S: Backend>(engine: SharedEngine<S>) -> Router<()> {
  Router::new()
    // Accounts
    .route("/accounts", post(accounts::register::<S>))
    .route("/accounts/me", get(accounts::me))
    .route("/accounts/me/password", put(accounts::change_password::<S>))
    // Content
    .route("/content", get(content::list::<S>).post(content::submit::<S>))
    .route("/content/mine", get(content::mine::<S>))
    .route("/content/{id}/review", get(content::review::<S>))
    .route("/content/{id}/approve", post(content::approve::<S>))
    .route("/content/{id}/delete", post(content::delete::<S>))
    .route("/content/{id}/flag", post(content::flag::<S>))
    .route("/content/{id}/history", get(content::history::<S>))
    .with_state(engine)
}
