//! Error types for `bulletin-core`.

use thiserror::Error;

use crate::{
  account::{AccountId, Role},
  content::{Action, ContentId, ContentStatus},
};

#[derive(Debug, Error)]
pub enum Error {
  /// Missing or malformed input (empty title, body, or flag reason).
  #[error("validation failed: {0}")]
  Validation(String),

  /// The actor is unknown, inactive, or lacks the role the operation needs.
  #[error("account {actor} is not authorized; {required} role required")]
  Unauthorized { actor: AccountId, required: Role },

  #[error("account not found: {0}")]
  AccountNotFound(AccountId),

  #[error("content item not found: {0}")]
  ContentNotFound(ContentId),

  #[error("cannot {action} content item {content_id} while it is {status}")]
  InvalidState {
    content_id: ContentId,
    status:     ContentStatus,
    action:     Action,
  },

  #[error("username already taken: {0}")]
  UsernameTaken(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box a backend error.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
