//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs are hyphenated lowercase strings,
//! and enums use their lowercase names. Content ids are SQLite rowids.

use chrono::{DateTime, Utc};
use bulletin_core::{
  account::{Account, AccountId, Role, StoredAccount},
  content::{ContentId, ContentItem, ContentStatus, Transition},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// `None` above `i64::MAX`; no rowid can hold such an id.
pub fn encode_content_id(id: ContentId) -> Option<i64> { i64::try_from(id.0).ok() }

pub fn decode_content_id(raw: i64) -> Result<ContentId> {
  u64::try_from(raw)
    .map(ContentId)
    .map_err(|_| Error::Decode { column: "content_id", value: raw.to_string() })
}

pub fn decode_status(column: &'static str, s: &str) -> Result<ContentStatus> {
  s.parse()
    .map_err(|_| Error::Decode { column, value: s.to_owned() })
}

pub fn decode_role(s: &str) -> Result<Role> {
  s.parse()
    .map_err(|_| Error::Decode { column: "role", value: s.to_owned() })
}

// ─── Column lists ────────────────────────────────────────────────────────────

pub const CONTENT_COLUMNS: &str =
  "content_id, title, body, author, source, status, flag_reason, created_at";

pub const ACCOUNT_COLUMNS: &str =
  "account_id, username, password_hash, role, active, created_at";

pub const TRANSITION_COLUMNS: &str =
  "transition_id, content_id, actor, from_status, to_status, reason, recorded_at";

// ─── Raw row types ───────────────────────────────────────────────────────────

/// A `content` row as read from SQLite, before decoding.
pub struct RawContent {
  pub content_id:  i64,
  pub title:       String,
  pub body:        String,
  pub author:      String,
  pub source:      String,
  pub status:      String,
  pub flag_reason: Option<String>,
  pub created_at:  String,
}

impl RawContent {
  /// Row mapper for queries selecting [`CONTENT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      content_id:  row.get(0)?,
      title:       row.get(1)?,
      body:        row.get(2)?,
      author:      row.get(3)?,
      source:      row.get(4)?,
      status:      row.get(5)?,
      flag_reason: row.get(6)?,
      created_at:  row.get(7)?,
    })
  }

  pub fn into_item(self) -> Result<ContentItem> {
    Ok(ContentItem {
      content_id:  decode_content_id(self.content_id)?,
      title:       self.title,
      body:        self.body,
      author:      AccountId(decode_uuid(&self.author)?),
      source:      self.source,
      status:      decode_status("status", &self.status)?,
      flag_reason: self.flag_reason,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// An `accounts` row as read from SQLite, before decoding.
pub struct RawAccount {
  pub account_id:    String,
  pub username:      String,
  pub password_hash: String,
  pub role:          String,
  pub active:        bool,
  pub created_at:    String,
}

impl RawAccount {
  /// Row mapper for queries selecting [`ACCOUNT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      account_id:    row.get(0)?,
      username:      row.get(1)?,
      password_hash: row.get(2)?,
      role:          row.get(3)?,
      active:        row.get(4)?,
      created_at:    row.get(5)?,
    })
  }

  pub fn into_stored(self) -> Result<StoredAccount> {
    Ok(StoredAccount {
      account:       Account {
        account_id: AccountId(decode_uuid(&self.account_id)?),
        username:   self.username,
        role:       decode_role(&self.role)?,
        active:     self.active,
        created_at: decode_dt(&self.created_at)?,
      },
      password_hash: self.password_hash,
    })
  }

  pub fn into_account(self) -> Result<Account> { Ok(self.into_stored()?.account) }
}

/// A `transitions` row as read from SQLite, before decoding.
pub struct RawTransition {
  pub transition_id: String,
  pub content_id:    i64,
  pub actor:         String,
  pub from_status:   String,
  pub to_status:     String,
  pub reason:        Option<String>,
  pub recorded_at:   String,
}

impl RawTransition {
  /// Row mapper for queries selecting [`TRANSITION_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      transition_id: row.get(0)?,
      content_id:    row.get(1)?,
      actor:         row.get(2)?,
      from_status:   row.get(3)?,
      to_status:     row.get(4)?,
      reason:        row.get(5)?,
      recorded_at:   row.get(6)?,
    })
  }

  pub fn into_transition(self) -> Result<Transition> {
    Ok(Transition {
      transition_id: decode_uuid(&self.transition_id)?,
      content_id:    decode_content_id(self.content_id)?,
      actor:         AccountId(decode_uuid(&self.actor)?),
      from:          decode_status("from_status", &self.from_status)?,
      to:            decode_status("to_status", &self.to_status)?,
      reason:        self.reason,
      recorded_at:   decode_dt(&self.recorded_at)?,
    })
  }
}
