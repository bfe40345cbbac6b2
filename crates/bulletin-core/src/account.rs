//! Accounts: the identities that submit content, flag it, and moderate it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

/// Usernames are trimmed, then must fall within this many characters.
pub const USERNAME_LEN: std::ops::RangeInclusive<usize> = 2..=50;

// ─── Identity ────────────────────────────────────────────────────────────────

/// Opaque account identifier.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AccountId(pub Uuid);

impl AccountId {
  pub fn new() -> Self { Self(Uuid::new_v4()) }
}

impl Default for AccountId {
  fn default() -> Self { Self::new() }
}

impl fmt::Display for AccountId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// What an account is allowed to do.
///
/// `Moderator` is reserved: it is stored and round-tripped, but grants
/// nothing beyond `User`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  #[default]
  User,
  Moderator,
  Admin,
}

impl Role {
  pub fn is_admin(self) -> bool { matches!(self, Self::Admin) }
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
  pub account_id: AccountId,
  pub username:   String,
  pub role:       Role,
  /// Deactivated accounts can neither authenticate nor moderate.
  pub active:     bool,
  pub created_at: DateTime<Utc>,
}

/// An account together with its argon2 PHC string. Only the directory and
/// the authentication layer ever see this type.
#[derive(Debug, Clone)]
pub struct StoredAccount {
  pub account:       Account,
  pub password_hash: String,
}

/// Input to [`crate::store::AccountDirectory::register`].
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub username:      String,
  pub password_hash: String,
  pub role:          Role,
}

impl NewAccount {
  pub fn new(username: impl Into<String>, password_hash: impl Into<String>, role: Role) -> Self {
    Self {
      username: username.into().trim().to_owned(),
      password_hash: password_hash.into(),
      role,
    }
  }

  pub fn validate(&self) -> Result<()> {
    let len = self.username.chars().count();
    if !USERNAME_LEN.contains(&len) {
      return Err(Error::Validation(format!(
        "username must be between {} and {} characters",
        USERNAME_LEN.start(),
        USERNAME_LEN.end()
      )));
    }
    // Basic credentials split at the first colon.
    if self.username.contains(':') {
      return Err(Error::Validation("username must not contain ':'".into()));
    }
    if self.password_hash.is_empty() {
      return Err(Error::Validation("password hash is required".into()));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn username_is_trimmed() {
    let input = NewAccount::new("  alice  ", "$argon2id$stub", Role::User);
    assert_eq!(input.username, "alice");
    assert!(input.validate().is_ok());
  }

  #[test]
  fn username_length_bounds() {
    assert!(NewAccount::new("a", "h", Role::User).validate().is_err());
    assert!(NewAccount::new("ab", "h", Role::User).validate().is_ok());
    assert!(NewAccount::new("x".repeat(51), "h", Role::User).validate().is_err());
  }

  #[test]
  fn username_with_colon_is_rejected() {
    let err = NewAccount::new("ann:lee", "h", Role::User).validate().unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
  }

  #[test]
  fn role_text_forms_agree() {
    assert_eq!(Role::Admin.as_ref(), "admin");
    assert_eq!("moderator".parse::<Role>().unwrap(), Role::Moderator);
    assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    assert!(!Role::Moderator.is_admin());
  }
}
