//! [`SqliteStore`]: the SQLite implementation of [`ContentStore`] and
//! [`AccountDirectory`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};
use uuid::Uuid;

use bulletin_core::{
  account::{Account, AccountId, NewAccount, StoredAccount},
  content::{ContentId, ContentItem, ContentStatus, Draft, StatusChange, Transition},
  store::{AccountDirectory, ContentStore},
};

use crate::{
  Result,
  encode::{
    ACCOUNT_COLUMNS, CONTENT_COLUMNS, RawAccount, RawContent, RawTransition,
    TRANSITION_COLUMNS, decode_content_id, encode_content_id, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Bulletin store backed by a single SQLite file.
///
/// Clones share one connection thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a private in-memory database.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a `SELECT CONTENT_COLUMNS FROM content <tail>` with `params`.
  async fn query_content(
    &self,
    tail: String,
    params: Vec<Value>,
  ) -> Result<Vec<ContentItem>> {
    let raws: Vec<RawContent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!("SELECT {CONTENT_COLUMNS} FROM content {tail}"))?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), RawContent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContent::into_item).collect()
  }

  async fn account_where(
    &self,
    column: &'static str,
    value: String,
  ) -> Result<Option<StoredAccount>> {
    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {column} = ?1"),
              rusqlite::params![value],
              RawAccount::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAccount::into_stored).transpose()
  }
}

// ─── ContentStore impl ───────────────────────────────────────────────────────

impl ContentStore for SqliteStore {
  type Error = crate::Error;

  async fn insert(&self, draft: Draft) -> Result<ContentItem> {
    let created_at = Utc::now();

    let title      = draft.title.clone();
    let body       = draft.body.clone();
    let author_str = encode_uuid(draft.author.0);
    let source     = draft.source.clone();
    let status_str = ContentStatus::Pending.as_ref().to_owned();
    let at_str     = encode_dt(created_at);

    let rowid = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO content (title, body, author, source, status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![title, body, author_str, source, status_str, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(ContentItem::from_draft(decode_content_id(rowid)?, draft, created_at))
  }

  async fn get(&self, id: ContentId) -> Result<Option<ContentItem>> {
    let Some(id_val) = encode_content_id(id) else {
      return Ok(None);
    };
    let items = self
      .query_content("WHERE content_id = ?1".to_owned(), vec![Value::Integer(id_val)])
      .await?;
    Ok(items.into_iter().next())
  }

  async fn transition(
    &self,
    id:       ContentId,
    expected: ContentStatus,
    change:   StatusChange,
  ) -> Result<Option<ContentItem>> {
    let Some(id_val) = encode_content_id(id) else {
      return Ok(None);
    };
    let expected_str  = expected.as_ref().to_owned();
    let to_str        = change.to().as_ref().to_owned();
    let reason        = change.flag_reason().map(str::to_owned);
    let actor_str     = encode_uuid(change.actor().0);
    let transition_id = encode_uuid(Uuid::new_v4());
    let at_str        = encode_dt(Utc::now());

    let raw: Option<RawContent> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let changed = tx.execute(
          "UPDATE content SET status = ?1, flag_reason = ?2
           WHERE content_id = ?3 AND status = ?4",
          rusqlite::params![to_str, reason, id_val, expected_str],
        )?;
        if changed == 0 {
          // Missing, or someone else moved it first. Dropping `tx` rolls back.
          return Ok(None);
        }

        tx.execute(
          "INSERT INTO transitions (
             transition_id, content_id, actor, from_status, to_status, reason, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            transition_id,
            id_val,
            actor_str,
            expected_str,
            to_str,
            reason,
            at_str,
          ],
        )?;

        let raw = tx.query_row(
          &format!("SELECT {CONTENT_COLUMNS} FROM content WHERE content_id = ?1"),
          rusqlite::params![id_val],
          RawContent::from_row,
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawContent::into_item).transpose()
  }

  async fn list_by_status(&self, statuses: &[ContentStatus]) -> Result<Vec<ContentItem>> {
    if statuses.is_empty() {
      return Ok(Vec::new());
    }

    let placeholders = (1..=statuses.len())
      .map(|n| format!("?{n}"))
      .collect::<Vec<_>>()
      .join(", ");
    let params = statuses
      .iter()
      .map(|s| Value::Text(s.as_ref().to_owned()))
      .collect();

    self
      .query_content(
        format!("WHERE status IN ({placeholders}) ORDER BY content_id"),
        params,
      )
      .await
  }

  async fn list_by_author(&self, author: AccountId) -> Result<Vec<ContentItem>> {
    self
      .query_content(
        "WHERE author = ?1 ORDER BY content_id".to_owned(),
        vec![Value::Text(encode_uuid(author.0))],
      )
      .await
  }

  async fn history(&self, id: ContentId) -> Result<Vec<Transition>> {
    let Some(id_val) = encode_content_id(id) else {
      return Ok(Vec::new());
    };

    let raws: Vec<RawTransition> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {TRANSITION_COLUMNS} FROM transitions
           WHERE content_id = ?1
           ORDER BY rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_val], RawTransition::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTransition::into_transition).collect()
  }
}

// ─── AccountDirectory impl ───────────────────────────────────────────────────

impl AccountDirectory for SqliteStore {
  type Error = crate::Error;

  async fn register(&self, input: NewAccount) -> Result<Option<Account>> {
    let account = Account {
      account_id: AccountId::new(),
      username:   input.username,
      role:       input.role,
      active:     true,
      created_at: Utc::now(),
    };

    let id_str   = encode_uuid(account.account_id.0);
    let username = account.username.clone();
    let hash     = input.password_hash;
    let role_str = account.role.as_ref().to_owned();
    let at_str   = encode_dt(account.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let taken = conn
          .query_row(
            "SELECT 1 FROM accounts WHERE username = ?1",
            rusqlite::params![username],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(false);
        }

        conn.execute(
          "INSERT INTO accounts (account_id, username, password_hash, role, active, created_at)
           VALUES (?1, ?2, ?3, ?4, 1, ?5)",
          rusqlite::params![id_str, username, hash, role_str, at_str],
        )?;
        Ok(true)
      })
      .await?;

    Ok(inserted.then_some(account))
  }

  async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
    Ok(
      self
        .account_where("account_id", encode_uuid(id.0))
        .await?
        .map(|stored| stored.account),
    )
  }

  async fn find_by_username(&self, username: &str) -> Result<Option<StoredAccount>> {
    self.account_where("username", username.to_owned()).await
  }

  async fn set_active(&self, id: AccountId, active: bool) -> Result<Option<Account>> {
    let id_str = encode_uuid(id.0);

    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE accounts SET active = ?1 WHERE account_id = ?2",
          rusqlite::params![active, id_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_id = ?1"),
              rusqlite::params![id_str],
              RawAccount::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }

  async fn set_password_hash(
    &self,
    id: AccountId,
    password_hash: &str,
  ) -> Result<Option<Account>> {
    let id_str = encode_uuid(id.0);
    let hash   = password_hash.to_owned();

    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE accounts SET password_hash = ?1 WHERE account_id = ?2",
          rusqlite::params![hash, id_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_id = ?1"),
              rusqlite::params![id_str],
              RawAccount::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }
}
