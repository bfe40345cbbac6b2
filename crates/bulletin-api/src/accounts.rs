//! Handlers for `/accounts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/accounts` | Body: [`RegisterBody`]; returns 201 + account. Always role `user` |
//! | `GET`  | `/accounts/me` | The authenticated account |
//! | `PUT`  | `/accounts/me/password` | Body: [`PasswordBody`]; the username cannot change |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use bulletin_core::account::{Account, NewAccount, Role};
use serde::Deserialize;

use crate::{
  Backend, SharedEngine,
  auth::{Actor, hash_password},
  error::ApiError,
};

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub username: String,
  pub password: String,
}

/// `POST /accounts`
pub async fn register<S: Backend>(
  State(engine): State<SharedEngine<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError> {
  let hash = hash_password(&body.password)?;
  let account = engine
    .register(NewAccount::new(body.username, hash, Role::User))
    .await?;
  tracing::info!(account_id = %account.account_id, username = %account.username, "account registered");
  Ok((StatusCode::CREATED, Json(account)))
}

// ─── Me ───────────────────────────────────────────────────────────────────────

/// `GET /accounts/me`
pub async fn me(Actor(account): Actor) -> Json<Account> { Json(account) }

// ─── Password ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PasswordBody {
  #[serde(default)]
  pub password: String,
  /// Present only to refuse renames explicitly.
  pub username: Option<String>,
}

/// `PUT /accounts/me/password`
pub async fn change_password<S: Backend>(
  State(engine): State<SharedEngine<S>>,
  Actor(account): Actor,
  Json(body): Json<PasswordBody>,
) -> Result<Json<Account>, ApiError> {
  if body.username.is_some() {
    return Err(ApiError::BadRequest("username cannot be changed".into()));
  }
  let hash = hash_password(&body.password)?;
  let account = engine.change_password(account.account_id, hash).await?;
  tracing::info!(account_id = %account.account_id, "password changed");
  Ok(Json(account))
}
