//! [`MemoryStore`], an in-process backend implementing both storage traits.
//!
//! Backed by [`DashMap`], so per-item writes are serialised by the shard lock
//! held for the whole compare-and-swap in [`ContentStore::transition`].
//! Nothing survives a restart; used by tests and the server's `--in-memory`
//! mode.

use std::{
  convert::Infallible,
  sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
  },
};

use chrono::Utc;
use dashmap::{DashMap, mapref::entry::Entry};

use crate::{
  account::{Account, AccountId, NewAccount, StoredAccount},
  content::{ContentId, ContentItem, ContentStatus, Draft, StatusChange, Transition},
  store::{AccountDirectory, ContentStore},
};

/// All clones share the same maps.
#[derive(Clone, Default)]
pub struct MemoryStore {
  inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
  last_id:   AtomicU64,
  items:     DashMap<ContentId, ContentItem>,
  history:   DashMap<ContentId, Vec<Transition>>,
  accounts:  DashMap<AccountId, StoredAccount>,
  usernames: DashMap<String, AccountId>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn collect_sorted(&self, keep: impl Fn(&ContentItem) -> bool) -> Vec<ContentItem> {
    let mut items: Vec<ContentItem> = self
      .inner
      .items
      .iter()
      .filter(|entry| keep(entry.value()))
      .map(|entry| entry.value().clone())
      .collect();
    items.sort_by_key(|item| item.content_id);
    items
  }
}

// ─── ContentStore impl ───────────────────────────────────────────────────────

impl ContentStore for MemoryStore {
  type Error = Infallible;

  async fn insert(&self, draft: Draft) -> Result<ContentItem, Infallible> {
    let id = ContentId(self.inner.last_id.fetch_add(1, Ordering::SeqCst) + 1);
    let item = ContentItem::from_draft(id, draft, Utc::now());
    self.inner.history.insert(id, Vec::new());
    self.inner.items.insert(id, item.clone());
    Ok(item)
  }

  async fn get(&self, id: ContentId) -> Result<Option<ContentItem>, Infallible> {
    Ok(self.inner.items.get(&id).map(|entry| entry.value().clone()))
  }

  async fn transition(
    &self,
    id: ContentId,
    expected: ContentStatus,
    change: StatusChange,
  ) -> Result<Option<ContentItem>, Infallible> {
    let Some(mut entry) = self.inner.items.get_mut(&id) else {
      return Ok(None);
    };
    if entry.status != expected {
      return Ok(None);
    }

    let transition = entry.apply(&change, Utc::now());
    self.inner.history.entry(id).or_default().push(transition);
    Ok(Some(entry.value().clone()))
  }

  async fn list_by_status(
    &self,
    statuses: &[ContentStatus],
  ) -> Result<Vec<ContentItem>, Infallible> {
    Ok(self.collect_sorted(|item| statuses.contains(&item.status)))
  }

  async fn list_by_author(&self, author: AccountId) -> Result<Vec<ContentItem>, Infallible> {
    Ok(self.collect_sorted(|item| item.author == author))
  }

  async fn history(&self, id: ContentId) -> Result<Vec<Transition>, Infallible> {
    Ok(
      self
        .inner
        .history
        .get(&id)
        .map(|entry| entry.value().clone())
        .unwrap_or_default(),
    )
  }
}

// ─── AccountDirectory impl ───────────────────────────────────────────────────

impl AccountDirectory for MemoryStore {
  type Error = Infallible;

  async fn register(&self, input: NewAccount) -> Result<Option<Account>, Infallible> {
    match self.inner.usernames.entry(input.username.clone()) {
      Entry::Occupied(_) => Ok(None),
      Entry::Vacant(slot) => {
        let account = Account {
          account_id: AccountId::new(),
          username:   input.username,
          role:       input.role,
          active:     true,
          created_at: Utc::now(),
        };
        self.inner.accounts.insert(account.account_id, StoredAccount {
          account:       account.clone(),
          password_hash: input.password_hash,
        });
        slot.insert(account.account_id);
        Ok(Some(account))
      }
    }
  }

  async fn get_account(&self, id: AccountId) -> Result<Option<Account>, Infallible> {
    Ok(self.inner.accounts.get(&id).map(|entry| entry.account.clone()))
  }

  async fn find_by_username(&self, username: &str) -> Result<Option<StoredAccount>, Infallible> {
    let Some(id) = self.inner.usernames.get(username).map(|entry| *entry.value()) else {
      return Ok(None);
    };
    Ok(self.inner.accounts.get(&id).map(|entry| entry.value().clone()))
  }

  async fn set_active(&self, id: AccountId, active: bool) -> Result<Option<Account>, Infallible> {
    Ok(self.inner.accounts.get_mut(&id).map(|mut entry| {
      entry.account.active = active;
      entry.account.clone()
    }))
  }

  async fn set_password_hash(
    &self,
    id: AccountId,
    password_hash: &str,
  ) -> Result<Option<Account>, Infallible> {
    Ok(self.inner.accounts.get_mut(&id).map(|mut entry| {
      entry.password_hash = password_hash.to_owned();
      entry.account.clone()
    }))
  }
}
