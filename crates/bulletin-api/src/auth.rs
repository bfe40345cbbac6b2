//! HTTP Basic authentication against the account directory.
//!
//! Credentials are looked up by username and checked against the stored
//! argon2 PHC string. Inactive accounts are refused as if the password were
//! wrong.

use std::sync::LazyLock;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use bulletin_core::{Error as CoreError, account::Account};
use rand_core::OsRng;

use crate::{Backend, SharedEngine, error::ApiError};

/// Shortest password accepted at registration or password change.
pub const MIN_PASSWORD_LEN: usize = 6;

/// The authenticated caller. Present in a handler means the request carried
/// valid credentials for an active account.
#[derive(Debug, Clone)]
pub struct Actor(pub Account);

/// Hash a new password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(ApiError::BadRequest(format!(
      "password must be at least {MIN_PASSWORD_LEN} characters long"
    )));
  }
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Internal(format!("cannot hash password: {e}")))
}

/// Hash checked when the username is unknown, so a miss costs as much as a
/// wrong password.
static DUMMY_HASH: LazyLock<Option<String>> = LazyLock::new(|| {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(b"bulletin-unknown-account", &salt)
    .ok()
    .map(|hash| hash.to_string())
});

/// Run a full argon2 verification whether or not an account was found.
/// Only a found account with a matching password passes.
fn password_matches(password: &str, stored_hash: Option<&str>) -> bool {
  let known = stored_hash.is_some();
  let Some(phc) = stored_hash.or(DUMMY_HASH.as_deref()) else {
    return false;
  };
  let verified = PasswordHash::new(phc).is_ok_and(|parsed| {
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .is_ok()
  });
  known && verified
}

/// Decode `Authorization: Basic …` into `(username, password)`.
fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), ApiError> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthenticated)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthenticated)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthenticated)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthenticated)?;

  let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthenticated)?;
  Ok((username.to_owned(), password.to_owned()))
}

/// Verify credentials directly from headers, for handlers where
/// authentication depends on the query.
pub async fn authenticate<S: Backend>(
  headers: &HeaderMap,
  engine: &SharedEngine<S>,
) -> Result<Account, ApiError> {
  let (username, password) = basic_credentials(headers)?;

  let stored = engine
    .accounts()
    .find_by_username(&username)
    .await
    .map_err(CoreError::store)?;

  let verified = password_matches(
    &password,
    stored.as_ref().map(|s| s.password_hash.as_str()),
  );

  match stored {
    Some(stored) if verified && stored.account.active => Ok(stored.account),
    _ => Err(ApiError::Unauthenticated),
  }
}

impl<S: Backend> FromRequestParts<SharedEngine<S>> for Actor {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    engine: &SharedEngine<S>,
  ) -> Result<Self, Self::Rejection> {
    authenticate(&parts.headers, engine).await.map(Actor)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;

  use axum::http::{HeaderValue, header};
  use bulletin_core::{
    ModerationEngine,
    account::{NewAccount, Role},
    memory::MemoryStore,
  };

  async fn engine_with(username: &str, password: &str) -> SharedEngine<MemoryStore> {
    let store = MemoryStore::new();
    let engine = Arc::new(ModerationEngine::new(store.clone(), store));
    let hash = hash_password(password).unwrap();
    engine
      .register(NewAccount::new(username, hash, Role::User))
      .await
      .unwrap();
    engine
  }

  fn basic(user: &str, pass: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let value = format!("Basic {}", B64.encode(format!("{user}:{pass}")));
    headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&value).unwrap());
    headers
  }

  #[tokio::test]
  async fn correct_credentials() {
    let engine = engine_with("alice", "secret").await;
    let account = authenticate(&basic("alice", "secret"), &engine).await.unwrap();
    assert_eq!(account.username, "alice");
  }

  #[tokio::test]
  async fn wrong_password() {
    let engine = engine_with("alice", "secret").await;
    let err = authenticate(&basic("alice", "wrong!"), &engine).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
  }

  #[tokio::test]
  async fn unknown_user() {
    let engine = engine_with("alice", "secret").await;
    let err = authenticate(&basic("bob", "secret"), &engine).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
  }

  #[tokio::test]
  async fn missing_header() {
    let engine = engine_with("alice", "secret").await;
    let err = authenticate(&HeaderMap::new(), &engine).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
  }

  #[tokio::test]
  async fn invalid_base64() {
    let engine = engine_with("alice", "secret").await;
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic !!!not-base64!!!"));
    let err = authenticate(&headers, &engine).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
  }

  #[tokio::test]
  async fn deactivated_account_is_refused() {
    let engine = engine_with("alice", "secret").await;
    let account = authenticate(&basic("alice", "secret"), &engine).await.unwrap();
    engine.set_account_active(account.account_id, false).await.unwrap();

    let err = authenticate(&basic("alice", "secret"), &engine).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
  }

  #[test]
  fn unknown_account_never_matches() {
    assert!(!password_matches("bulletin-unknown-account", None));
    assert!(!password_matches("secret", None));
    assert!(DUMMY_HASH.is_some());

    let hash = hash_password("secret").unwrap();
    assert!(password_matches("secret", Some(&hash)));
    assert!(!password_matches("wrong!", Some(&hash)));
    assert!(!password_matches("secret", Some("not-a-phc-string")));
  }

  #[test]
  fn short_password_is_rejected() {
    assert!(matches!(hash_password("12345"), Err(ApiError::BadRequest(_))));
    let hash = hash_password("123456").unwrap();
    assert!(hash.starts_with("$argon2"));
  }
}
