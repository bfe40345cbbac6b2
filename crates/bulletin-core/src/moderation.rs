//! The moderation engine, the sole mutation path for content items.
//!
//! Every operation is one check-then-mutate step: authorize the actor,
//! validate input, load the item, check the state machine, then hand the
//! change to [`ContentStore::transition`], which compares the status again
//! atomically. Nothing is retried; a lost race surfaces as
//! [`Error::InvalidState`] carrying the status that won.

use crate::{
  Error, Result,
  account::{Account, AccountId, NewAccount, Role},
  content::{Action, ContentId, ContentItem, ContentStatus, Draft, StatusChange, Transition},
  store::{AccountDirectory, ContentStore},
};

/// Statuses shown in the admin review queue.
pub const REVIEW_QUEUE: [ContentStatus; 2] = [ContentStatus::Pending, ContentStatus::Flagged];

const PUBLISHED: [ContentStatus; 1] = [ContentStatus::Approved];

/// Enforces who may move a content item between statuses.
pub struct ModerationEngine<C, D> {
  content:  C,
  accounts: D,
}

impl<C, D> ModerationEngine<C, D>
where
  C: ContentStore,
  D: AccountDirectory,
{
  pub fn new(content: C, accounts: D) -> Self { Self { content, accounts } }

  pub fn content(&self) -> &C { &self.content }

  pub fn accounts(&self) -> &D { &self.accounts }

  // ── Accounts ──────────────────────────────────────────────────────────────

  /// Create an account after validating it.
  pub async fn register(&self, input: NewAccount) -> Result<Account> {
    input.validate()?;
    let username = input.username.clone();
    self
      .accounts
      .register(input)
      .await
      .map_err(Error::store)?
      .ok_or(Error::UsernameTaken(username))
  }

  /// Operator-level switch; deactivated accounts keep their content.
  pub async fn set_account_active(&self, id: AccountId, active: bool) -> Result<Account> {
    self
      .accounts
      .set_active(id, active)
      .await
      .map_err(Error::store)?
      .ok_or(Error::AccountNotFound(id))
  }

  /// Replace the actor's own password hash. Usernames never change.
  pub async fn change_password(&self, actor: AccountId, password_hash: String) -> Result<Account> {
    self.require_active(actor).await?;
    if password_hash.is_empty() {
      return Err(Error::Validation("password hash is required".into()));
    }
    self
      .accounts
      .set_password_hash(actor, &password_hash)
      .await
      .map_err(Error::store)?
      .ok_or(Error::AccountNotFound(actor))
  }

  // ── Content operations ────────────────────────────────────────────────────

  /// Submit a new item for review. Any active account may submit.
  pub async fn submit(
    &self,
    author: AccountId,
    title: String,
    body: String,
    source: Option<String>,
  ) -> Result<ContentItem> {
    self.require_active(author).await?;
    let draft = Draft::new(author, title, body, source)?;
    self.content.insert(draft).await.map_err(Error::store)
  }

  /// Read an item for inspection before a decision. Admin only.
  pub async fn review(&self, actor: AccountId, id: ContentId) -> Result<ContentItem> {
    self.require_admin(actor).await?;
    self.load(id).await
  }

  /// Publish a pending item, or clear a flag on a flagged one. Admin only.
  pub async fn approve(&self, actor: AccountId, id: ContentId) -> Result<ContentItem> {
    self.require_admin(actor).await?;
    self.apply(id, Action::Approve, StatusChange::approve(actor)).await
  }

  /// Soft-delete an item. Admin only; the record is kept for audit.
  pub async fn delete(&self, actor: AccountId, id: ContentId) -> Result<ContentItem> {
    self.require_admin(actor).await?;
    self.apply(id, Action::Delete, StatusChange::delete(actor)).await
  }

  /// Send an approved item back for re-review. Any active account may flag.
  pub async fn flag(
    &self,
    actor: AccountId,
    id: ContentId,
    reason: String,
  ) -> Result<ContentItem> {
    self.require_active(actor).await?;
    if reason.trim().is_empty() {
      return Err(Error::Validation("flag reason is required".into()));
    }
    self.apply(id, Action::Flag, StatusChange::flag(actor, reason)).await
  }

  /// The admin review queue: pending and flagged items in submission order.
  pub async fn list_pending_and_flagged(&self, actor: AccountId) -> Result<Vec<ContentItem>> {
    self.require_admin(actor).await?;
    self
      .content
      .list_by_status(&REVIEW_QUEUE)
      .await
      .map_err(Error::store)
  }

  /// Published items. Public.
  pub async fn list_approved(&self) -> Result<Vec<ContentItem>> {
    self
      .content
      .list_by_status(&PUBLISHED)
      .await
      .map_err(Error::store)
  }

  /// The actor's own submissions in every status.
  pub async fn list_by_author(&self, actor: AccountId) -> Result<Vec<ContentItem>> {
    self.require_active(actor).await?;
    self
      .content
      .list_by_author(actor)
      .await
      .map_err(Error::store)
  }

  /// The audit trail of an item. Admin only.
  pub async fn history(&self, actor: AccountId, id: ContentId) -> Result<Vec<Transition>> {
    self.require_admin(actor).await?;
    self.load(id).await?;
    self.content.history(id).await.map_err(Error::store)
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  async fn require_admin(&self, actor: AccountId) -> Result<()> {
    match self.accounts.role_of(actor).await.map_err(Error::store)? {
      Some(role) if role.is_admin() => Ok(()),
      _ => Err(Error::Unauthorized { actor, required: Role::Admin }),
    }
  }

  async fn require_active(&self, actor: AccountId) -> Result<Account> {
    let account = self
      .accounts
      .get_account(actor)
      .await
      .map_err(Error::store)?
      .ok_or(Error::AccountNotFound(actor))?;
    if !account.active {
      return Err(Error::Unauthorized { actor, required: Role::User });
    }
    Ok(account)
  }

  async fn load(&self, id: ContentId) -> Result<ContentItem> {
    self
      .content
      .get(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ContentNotFound(id))
  }

  async fn apply(
    &self,
    id: ContentId,
    action: Action,
    change: StatusChange,
  ) -> Result<ContentItem> {
    let item = self.load(id).await?;
    let invalid = |status| Error::InvalidState { content_id: id, status, action };

    if item.status.after(action) != Some(change.to()) {
      return Err(invalid(item.status));
    }

    match self
      .content
      .transition(id, item.status, change)
      .await
      .map_err(Error::store)?
    {
      Some(updated) => Ok(updated),
      // Another writer moved the item between our read and the swap.
      None => Err(invalid(self.load(id).await?.status)),
    }
  }
}
