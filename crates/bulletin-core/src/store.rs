//! The `ContentStore` and `AccountDirectory` traits.
//!
//! Both are implemented by storage backends ([`crate::memory::MemoryStore`],
//! `bulletin-store-sqlite`). The moderation engine and the API layer depend on
//! these abstractions, never on a concrete backend.

use std::future::Future;

use crate::{
  account::{Account, AccountId, NewAccount, Role, StoredAccount},
  content::{ContentId, ContentItem, ContentStatus, Draft, StatusChange, Transition},
};

// ─── Content ─────────────────────────────────────────────────────────────────

/// Abstraction over where content items live.
///
/// Items are never physically removed. The only way to change an item after
/// insertion is [`ContentStore::transition`], which must be atomic per item.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ContentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new `pending` item. The id and `created_at` are assigned by
  /// the store; ids increase monotonically.
  fn insert(
    &self,
    draft: Draft,
  ) -> impl Future<Output = Result<ContentItem, Self::Error>> + Send + '_;

  /// Retrieve an item by id. Returns `None` if not found.
  fn get(
    &self,
    id: ContentId,
  ) -> impl Future<Output = Result<Option<ContentItem>, Self::Error>> + Send + '_;

  /// Compare-and-swap on status.
  ///
  /// If the item exists and its status is still `expected`, apply `change`,
  /// append the matching [`Transition`], and return the updated item, all as
  /// one atomic step. Returns `None` if the item is missing or its status no
  /// longer matches; nothing is written in that case.
  fn transition(
    &self,
    id: ContentId,
    expected: ContentStatus,
    change: StatusChange,
  ) -> impl Future<Output = Result<Option<ContentItem>, Self::Error>> + Send + '_;

  /// All items whose status is one of `statuses`, in id order.
  fn list_by_status<'a>(
    &'a self,
    statuses: &'a [ContentStatus],
  ) -> impl Future<Output = Result<Vec<ContentItem>, Self::Error>> + Send + 'a;

  /// All items submitted by `author`, any status, in id order.
  fn list_by_author(
    &self,
    author: AccountId,
  ) -> impl Future<Output = Result<Vec<ContentItem>, Self::Error>> + Send + '_;

  /// The audit trail for an item, oldest first. Empty for unknown ids.
  fn history(
    &self,
    id: ContentId,
  ) -> impl Future<Output = Result<Vec<Transition>, Self::Error>> + Send + '_;
}

// ─── Accounts ────────────────────────────────────────────────────────────────

/// Capability lookup for accounts, independent of storage technology.
pub trait AccountDirectory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create an account. Returns `None` if the username is already taken.
  fn register(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  /// Retrieve an account by id. Returns `None` if not found.
  fn get_account(
    &self,
    id: AccountId,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  /// Retrieve an account and its password hash by username, for
  /// authentication.
  fn find_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<StoredAccount>, Self::Error>> + Send + 'a;

  /// Activate or deactivate an account. Returns `None` if not found.
  fn set_active(
    &self,
    id: AccountId,
    active: bool,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  /// Replace the stored password hash. Returns `None` if not found.
  fn set_password_hash<'a>(
    &'a self,
    id: AccountId,
    password_hash: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  /// The role of an active account; `None` for unknown or inactive ids.
  fn role_of(
    &self,
    id: AccountId,
  ) -> impl Future<Output = Result<Option<Role>, Self::Error>> + Send + '_ {
    async move {
      Ok(
        self
          .get_account(id)
          .await?
          .filter(|a| a.active)
          .map(|a| a.role),
      )
    }
  }
}
