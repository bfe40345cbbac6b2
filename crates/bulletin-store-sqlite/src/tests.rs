//! Integration tests for `SqliteStore` against an in-memory database.

use bulletin_core::{
  Error as CoreError, ModerationEngine,
  account::{AccountId, NewAccount, Role},
  content::{ContentId, ContentStatus, Draft, StatusChange},
  store::{AccountDirectory, ContentStore},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn account(s: &SqliteStore, name: &str, role: Role) -> AccountId {
  s.register(NewAccount::new(name, "$argon2id$v=19$stub", role))
    .await
    .unwrap()
    .expect("fresh username")
    .account_id
}

fn draft(author: AccountId, title: &str) -> Draft {
  Draft::new(author, title, "Body text.", None).unwrap()
}

// ─── Accounts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_and_lookup_account() {
  let s = store().await;
  let id = account(&s, "alice", Role::Admin).await;

  let fetched = s.get_account(id).await.unwrap().unwrap();
  assert_eq!(fetched.username, "alice");
  assert_eq!(fetched.role, Role::Admin);
  assert!(fetched.active);

  let stored = s.find_by_username("alice").await.unwrap().unwrap();
  assert_eq!(stored.account, fetched);
  assert_eq!(stored.password_hash, "$argon2id$v=19$stub");

  assert_eq!(s.role_of(id).await.unwrap(), Some(Role::Admin));
}

#[tokio::test]
async fn duplicate_username_returns_none() {
  let s = store().await;
  account(&s, "alice", Role::User).await;
  let again = s
    .register(NewAccount::new("alice", "$argon2id$other", Role::Admin))
    .await
    .unwrap();
  assert!(again.is_none());
}

#[tokio::test]
async fn missing_account_lookups_return_none() {
  let s = store().await;
  assert!(s.get_account(AccountId::new()).await.unwrap().is_none());
  assert!(s.find_by_username("nobody").await.unwrap().is_none());
  assert!(s.set_active(AccountId::new(), false).await.unwrap().is_none());
}

#[tokio::test]
async fn deactivated_account_has_no_role() {
  let s = store().await;
  let id = account(&s, "alice", Role::Admin).await;

  let updated = s.set_active(id, false).await.unwrap().unwrap();
  assert!(!updated.active);
  assert_eq!(s.role_of(id).await.unwrap(), None);

  s.set_active(id, true).await.unwrap();
  assert_eq!(s.role_of(id).await.unwrap(), Some(Role::Admin));
}

#[tokio::test]
async fn set_password_hash_replaces_stored_hash() {
  let s = store().await;
  let id = account(&s, "alice", Role::User).await;

  let updated = s.set_password_hash(id, "$argon2id$fresh").await.unwrap().unwrap();
  assert_eq!(updated.account_id, id);

  let stored = s.find_by_username("alice").await.unwrap().unwrap();
  assert_eq!(stored.password_hash, "$argon2id$fresh");
  assert!(s.set_password_hash(AccountId::new(), "$x").await.unwrap().is_none());
}

// ─── Content ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_assigns_ids_from_one() {
  let s = store().await;
  let author = account(&s, "alice", Role::User).await;

  let first = s.insert(draft(author, "First")).await.unwrap();
  let second = s.insert(draft(author, "Second")).await.unwrap();
  assert_eq!(first.content_id, ContentId(1));
  assert_eq!(second.content_id, ContentId(2));
  assert_eq!(first.status, ContentStatus::Pending);
}

#[tokio::test]
async fn insert_and_get_roundtrip() {
  let s = store().await;
  let author = account(&s, "alice", Role::User).await;

  let input = Draft::new(author, "Title", "Body", Some("Wire".into())).unwrap();
  let item = s.insert(input).await.unwrap();

  let fetched = s.get(item.content_id).await.unwrap().unwrap();
  assert_eq!(fetched, item);
  assert_eq!(fetched.source, "Wire");
  assert!(fetched.flag_reason.is_none());
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get(ContentId(404)).await.unwrap().is_none());
}

#[tokio::test]
async fn ids_beyond_rowid_range_are_missing() {
  let s = store().await;
  let admin = account(&s, "root", Role::Admin).await;
  let huge = ContentId(u64::MAX);

  assert!(s.get(huge).await.unwrap().is_none());
  assert!(s.history(huge).await.unwrap().is_empty());
  let result = s
    .transition(huge, ContentStatus::Pending, StatusChange::approve(admin))
    .await
    .unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn transition_applies_when_status_matches() {
  let s = store().await;
  let author = account(&s, "alice", Role::User).await;
  let admin = account(&s, "root", Role::Admin).await;
  let item = s.insert(draft(author, "Story")).await.unwrap();

  let approved = s
    .transition(item.content_id, ContentStatus::Pending, StatusChange::approve(admin))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(approved.status, ContentStatus::Approved);

  let flagged = s
    .transition(
      item.content_id,
      ContentStatus::Approved,
      StatusChange::flag(author, "misleading"),
    )
    .await
    .unwrap()
    .unwrap();
  assert_eq!(flagged.status, ContentStatus::Flagged);
  assert_eq!(flagged.flag_reason.as_deref(), Some("misleading"));

  let cleared = s
    .transition(item.content_id, ContentStatus::Flagged, StatusChange::approve(admin))
    .await
    .unwrap()
    .unwrap();
  assert!(cleared.flag_reason.is_none());
}

#[tokio::test]
async fn transition_with_stale_status_changes_nothing() {
  let s = store().await;
  let author = account(&s, "alice", Role::User).await;
  let admin = account(&s, "root", Role::Admin).await;
  let item = s.insert(draft(author, "Story")).await.unwrap();

  let result = s
    .transition(item.content_id, ContentStatus::Approved, StatusChange::delete(admin))
    .await
    .unwrap();
  assert!(result.is_none());

  let fetched = s.get(item.content_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, ContentStatus::Pending);
  assert!(s.history(item.content_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn transition_on_missing_item_returns_none() {
  let s = store().await;
  let admin = account(&s, "root", Role::Admin).await;
  let result = s
    .transition(ContentId(9), ContentStatus::Pending, StatusChange::approve(admin))
    .await
    .unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn list_by_status_filters_and_orders() {
  let s = store().await;
  let author = account(&s, "alice", Role::User).await;
  let admin = account(&s, "root", Role::Admin).await;

  let a = s.insert(draft(author, "A")).await.unwrap();
  let b = s.insert(draft(author, "B")).await.unwrap();
  let c = s.insert(draft(author, "C")).await.unwrap();
  s.transition(b.content_id, ContentStatus::Pending, StatusChange::approve(admin))
    .await
    .unwrap();
  s.transition(c.content_id, ContentStatus::Pending, StatusChange::delete(admin))
    .await
    .unwrap();

  let queue = s
    .list_by_status(&[ContentStatus::Pending, ContentStatus::Flagged])
    .await
    .unwrap();
  assert_eq!(queue.iter().map(|i| i.content_id).collect::<Vec<_>>(), vec![a.content_id]);

  let published = s.list_by_status(&[ContentStatus::Approved]).await.unwrap();
  assert_eq!(published.len(), 1);
  assert_eq!(published[0].content_id, b.content_id);

  assert!(s.list_by_status(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_by_author_only_returns_own_items() {
  let s = store().await;
  let alice = account(&s, "alice", Role::User).await;
  let bob = account(&s, "bob", Role::User).await;

  s.insert(draft(alice, "A1")).await.unwrap();
  s.insert(draft(bob, "B1")).await.unwrap();
  s.insert(draft(alice, "A2")).await.unwrap();

  let mine = s.list_by_author(alice).await.unwrap();
  let titles: Vec<_> = mine.iter().map(|i| i.title.as_str()).collect();
  assert_eq!(titles, ["A1", "A2"]);
}

#[tokio::test]
async fn history_is_append_only_and_ordered() {
  let s = store().await;
  let author = account(&s, "alice", Role::User).await;
  let admin = account(&s, "root", Role::Admin).await;
  let item = s.insert(draft(author, "Story")).await.unwrap();
  let id = item.content_id;

  s.transition(id, ContentStatus::Pending, StatusChange::approve(admin))
    .await
    .unwrap();
  s.transition(id, ContentStatus::Approved, StatusChange::flag(author, "old news"))
    .await
    .unwrap();
  s.transition(id, ContentStatus::Flagged, StatusChange::delete(admin))
    .await
    .unwrap();

  let history = s.history(id).await.unwrap();
  let path: Vec<_> = history.iter().map(|t| (t.from, t.to)).collect();
  assert_eq!(path, vec![
    (ContentStatus::Pending, ContentStatus::Approved),
    (ContentStatus::Approved, ContentStatus::Flagged),
    (ContentStatus::Flagged, ContentStatus::Deleted),
  ]);
  assert_eq!(history[1].actor, author);
  assert_eq!(history[1].reason.as_deref(), Some("old news"));
  assert!(history[2].reason.is_none());
}

// ─── Through the engine ──────────────────────────────────────────────────────

#[tokio::test]
async fn engine_runs_over_sqlite() {
  let s = store().await;
  let engine = ModerationEngine::new(s.clone(), s);
  let user = engine
    .register(NewAccount::new("john_doe", "$argon2id$stub", Role::User))
    .await
    .unwrap()
    .account_id;
  let admin = engine
    .register(NewAccount::new("admin_user", "$argon2id$stub", Role::Admin))
    .await
    .unwrap()
    .account_id;

  let item = engine
    .submit(user, "Breaking News".into(), "A major event occurred today.".into(), None)
    .await
    .unwrap();
  engine.approve(admin, item.content_id).await.unwrap();
  engine
    .flag(user, item.content_id, "misleading headline".into())
    .await
    .unwrap();

  let err = engine.delete(user, item.content_id).await.unwrap_err();
  assert!(matches!(err, CoreError::Unauthorized { .. }));

  let deleted = engine.delete(admin, item.content_id).await.unwrap();
  assert_eq!(deleted.status, ContentStatus::Deleted);
  assert!(deleted.flag_reason.is_none());

  let err = engine.approve(admin, item.content_id).await.unwrap_err();
  assert!(matches!(err, CoreError::InvalidState { status: ContentStatus::Deleted, .. }));
  assert_eq!(engine.history(admin, item.content_id).await.unwrap().len(), 3);
}
